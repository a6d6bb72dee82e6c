//! Topology snapshot handed to rendering collaborators.

use std::collections::HashMap;
use std::fmt;

use petgraph::graph::{DiGraph, NodeIndex};
use pp_core::{LsaKind, NodeId};

/// What a node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Router,
    Network,
    Summary,
    /// Placeholder for a reference nothing declared.
    Ghost,
}

impl NodeKind {
    pub const ALL: [NodeKind; 4] = [Self::Router, Self::Network, Self::Summary, Self::Ghost];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Router => "Router",
            Self::Network => "Network",
            Self::Summary => "Summary",
            Self::Ghost => "Ghost",
        }
    }

    /// Colour class used by renderers.
    pub const fn color(self) -> &'static str {
        match self {
            Self::Router => "lightblue",
            Self::Network => "lightgreen",
            Self::Summary => "orange",
            Self::Ghost => "red",
        }
    }
}

impl From<LsaKind> for NodeKind {
    fn from(kind: LsaKind) -> Self {
        match kind {
            LsaKind::Router => Self::Router,
            LsaKind::Network => Self::Network,
            LsaKind::Summary => Self::Summary,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
    pub id: NodeId,
    pub kind: NodeKind,
    /// Two-line display label: kind, then id.
    pub label: String,
}

impl GraphNode {
    pub fn new(id: NodeId, kind: NodeKind) -> Self {
        let label = format!("{}\n{}", kind.as_str(), id);
        Self { id, kind, label }
    }

    pub fn color(&self) -> &'static str {
        self.kind.color()
    }
}

/// Directed edge between two registered nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GraphEdge {
    pub from: NodeId,
    pub to: NodeId,
}

/// A validated, immutable node/edge set.
///
/// Nodes are kept in registration order, edges in synthesis order. Parallel
/// edges between the same pair are kept as-is.
#[derive(Debug, Clone, Default)]
pub struct Topology {
    pub(crate) nodes: Vec<GraphNode>,
    pub(crate) edges: Vec<GraphEdge>,
    pub(crate) index: HashMap<NodeId, usize>,
}

impl Topology {
    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    /// Look a node up by id.
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn count_of(&self, kind: NodeKind) -> usize {
        self.nodes.iter().filter(|n| n.kind == kind).count()
    }

    pub fn ghost_count(&self) -> usize {
        self.count_of(NodeKind::Ghost)
    }

    /// Edges leaving `id`, in synthesis order.
    pub fn outgoing<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a GraphEdge> + 'a {
        self.edges.iter().filter(move |e| e.from.as_str() == id)
    }

    /// Edges arriving at `id`, in synthesis order.
    pub fn incoming<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a GraphEdge> + 'a {
        self.edges.iter().filter(move |e| e.to.as_str() == id)
    }

    /// Copy into a petgraph `DiGraph` for layout or analysis.
    ///
    /// Node indices follow registration order.
    pub fn to_petgraph(&self) -> DiGraph<GraphNode, ()> {
        let mut graph = DiGraph::with_capacity(self.nodes.len(), self.edges.len());
        for node in &self.nodes {
            graph.add_node(node.clone());
        }
        for edge in &self.edges {
            // Both endpoints are guaranteed by validation.
            if let (Some(&from), Some(&to)) = (self.index.get(&edge.from), self.index.get(&edge.to)) {
                graph.add_edge(NodeIndex::new(from), NodeIndex::new(to), ());
            }
        }
        graph
    }
}
