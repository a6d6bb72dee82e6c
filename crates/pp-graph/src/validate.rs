//! Topology validation logic.

use std::collections::HashMap;

use pp_core::NodeId;

use crate::error::GraphError;
use crate::graph::{GraphEdge, GraphNode, NodeKind};

/// Check the structural invariants of a node/edge set and return the
/// id -> position index.
///
/// - node ids are unique
/// - every edge endpoint is a registered node
/// - ghost ordinals strictly increase in registration order
pub(crate) fn validate_topology(
    nodes: &[GraphNode],
    edges: &[GraphEdge],
) -> Result<HashMap<NodeId, usize>, GraphError> {
    let mut index = HashMap::with_capacity(nodes.len());
    let mut last_ghost: Option<(&NodeId, u32)> = None;

    for (i, node) in nodes.iter().enumerate() {
        if index.insert(node.id.clone(), i).is_some() {
            return Err(GraphError::DuplicateNode {
                id: node.id.clone(),
            });
        }

        if node.kind != NodeKind::Ghost {
            continue;
        }
        let ordinal = node.id.ghost_ordinal().unwrap_or(0);
        if let Some((previous, prev_ordinal)) = last_ghost
            && ordinal <= prev_ordinal
        {
            return Err(GraphError::GhostOrder {
                previous: previous.clone(),
                found: node.id.clone(),
            });
        }
        last_ghost = Some((&node.id, ordinal));
    }

    for edge in edges {
        if !index.contains_key(&edge.from) || !index.contains_key(&edge.to) {
            return Err(GraphError::DanglingEdge {
                from: edge.from.clone(),
                to: edge.to.clone(),
            });
        }
    }

    Ok(index)
}
