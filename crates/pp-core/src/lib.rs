//! pp-core: shared foundation for pathprobe.
//!
//! Contains:
//! - lsa (canonical link-state records + malformed-record log)
//! - ids (node identifiers and the per-run ghost sequence)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod lsa;

// Re-exports: nice ergonomics for downstream crates
pub use error::{PpError, PpResult};
pub use ids::*;
pub use lsa::*;
