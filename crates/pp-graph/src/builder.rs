//! Incremental topology builder.

use std::collections::HashMap;

use pp_core::{GhostSequence, LsaDatabase, NodeId, PpResult};
use tracing::{debug, info};

use crate::graph::{GraphEdge, GraphNode, NodeKind, Topology};
use crate::validate;

/// Builder for one topology.
///
/// Every reference passed to [`get_or_create`](Self::get_or_create) resolves
/// to a node; anything not registered before gets a ghost. The ghost sequence
/// lives and dies with the builder, so ordinals restart at 1 for each run.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
    /// Reference text -> node id it resolves to.
    node_map: HashMap<String, NodeId>,
    ghosts: GhostSequence,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a declared record.
    ///
    /// An empty id gets a fresh ghost. An id that is already registered keeps
    /// its first registration. Returns the node id used.
    pub fn register_primary(&mut self, id: &str, kind: NodeKind) -> PpResult<NodeId> {
        if id.is_empty() {
            return self.synthesize_ghost();
        }
        if let Some(existing) = self.node_map.get(id) {
            return Ok(existing.clone());
        }
        let node_id = NodeId::from(id);
        self.insert(node_id.clone(), kind);
        Ok(node_id)
    }

    /// Resolve a reference, creating a ghost when nothing answers to it.
    ///
    /// The reference is not registered, so a repeated missing id gets a
    /// fresh ghost each time.
    pub fn get_or_create(&mut self, reference: &str) -> PpResult<NodeId> {
        if let Some(existing) = self.node_map.get(reference) {
            return Ok(existing.clone());
        }
        let ghost = self.synthesize_ghost()?;
        debug!("Unresolved reference {reference:?} -> {ghost}");
        Ok(ghost)
    }

    /// Add a directed edge. Parallel edges are kept.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId) {
        self.edges.push(GraphEdge { from, to });
    }

    /// Ghosts handed out so far.
    pub fn ghost_count(&self) -> u32 {
        self.ghosts.issued()
    }

    /// Register every record of `db` and synthesize its edges.
    ///
    /// Nodes first (routers, networks, summaries), then edges:
    /// - router -> each link target
    /// - each attached router -> network
    /// - advertising router -> summary prefix
    pub fn add_database(&mut self, db: &LsaDatabase) -> PpResult<()> {
        let routers = db
            .routers
            .iter()
            .map(|r| self.register_primary(&r.router_id, NodeKind::Router))
            .collect::<PpResult<Vec<_>>>()?;
        let networks = db
            .networks
            .iter()
            .map(|n| self.register_primary(&n.network_id, NodeKind::Network))
            .collect::<PpResult<Vec<_>>>()?;
        let summaries = db
            .summaries
            .iter()
            .map(|s| self.register_primary(&s.prefix, NodeKind::Summary))
            .collect::<PpResult<Vec<_>>>()?;

        for (router, rid) in db.routers.iter().zip(routers) {
            for link in &router.links {
                let target = self.get_or_create(&link.link_id)?;
                self.add_edge(rid.clone(), target);
            }
        }

        for (network, nid) in db.networks.iter().zip(networks) {
            for attached in &network.attached_routers {
                let source = self.get_or_create(attached)?;
                self.add_edge(source, nid.clone());
            }
        }

        for (summary, sid) in db.summaries.iter().zip(summaries) {
            let source = self.get_or_create(&summary.adv_router)?;
            self.add_edge(source, sid);
        }

        Ok(())
    }

    /// Validate and freeze into an immutable `Topology`.
    pub fn build(self) -> PpResult<Topology> {
        let index = validate::validate_topology(&self.nodes, &self.edges)?;
        info!(
            "Built topology: {} nodes ({} ghosts), {} edges",
            self.nodes.len(),
            self.ghosts.issued(),
            self.edges.len()
        );
        Ok(Topology {
            nodes: self.nodes,
            edges: self.edges,
            index,
        })
    }

    fn synthesize_ghost(&mut self) -> PpResult<NodeId> {
        // A declared record may already carry a ghost-shaped id; skip past it.
        let ghost = loop {
            let candidate = self.ghosts.next_id()?;
            if !self.node_map.contains_key(candidate.as_str()) {
                break candidate;
            }
        };
        self.insert(ghost.clone(), NodeKind::Ghost);
        Ok(ghost)
    }

    fn insert(&mut self, id: NodeId, kind: NodeKind) {
        self.node_map.insert(id.as_str().to_string(), id.clone());
        self.nodes.push(GraphNode::new(id, kind));
    }
}

/// Build the topology of one database with a fresh builder.
pub fn build_topology(db: &LsaDatabase) -> PpResult<Topology> {
    let mut builder = GraphBuilder::new();
    builder.add_database(db)?;
    builder.build()
}
