//! Graph-specific error types.

use pp_core::{NodeId, PpError};

/// Topology construction and validation errors.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// Two nodes were registered under the same id.
    #[error("Node {id} is registered twice")]
    DuplicateNode { id: NodeId },

    /// An edge endpoint does not resolve to a registered node.
    #[error("Edge {from} -> {to} refers to a missing node")]
    DanglingEdge { from: NodeId, to: NodeId },

    /// Ghost ordinals do not increase in registration order.
    #[error("Ghost {found} registered after {previous}")]
    GhostOrder { previous: NodeId, found: NodeId },
}

impl From<GraphError> for PpError {
    fn from(err: GraphError) -> Self {
        PpError::Invariant {
            what: err.to_string(),
        }
    }
}
