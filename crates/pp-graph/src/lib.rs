//! pp-graph: topology layer for pathprobe.
//!
//! Provides:
//! - Node/edge snapshot handed to renderers (`Topology`)
//! - Incremental builder with ghost synthesis for unresolved references
//! - Structural validation of the finished node/edge set
//!
//! # Example
//!
//! ```
//! use pp_graph::{GraphBuilder, NodeKind};
//!
//! let mut builder = GraphBuilder::new();
//! let r1 = builder.register_primary("10.0.0.1", NodeKind::Router).unwrap();
//! let target = builder.get_or_create("10.0.0.2").unwrap();
//! builder.add_edge(r1, target);
//! let topology = builder.build().unwrap();
//!
//! assert_eq!(topology.nodes().len(), 2);
//! assert_eq!(topology.ghost_count(), 1);
//! ```

pub mod builder;
pub mod error;
pub mod graph;
pub(crate) mod validate;

pub use builder::{GraphBuilder, build_topology};
pub use error::GraphError;
pub use graph::{GraphEdge, GraphNode, NodeKind, Topology};
