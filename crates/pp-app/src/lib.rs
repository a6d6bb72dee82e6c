//! Pipeline service layer for pathprobe.
//!
//! Ties the crates together for front-ends: reads a dump, segments and
//! extracts records, builds the topology, optionally exports the canonical
//! document, and reports progress and a run summary along the way.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod progress;
pub mod summary;

// Re-export key types for convenience
pub use config::{MalformedPolicy, PipelineConfig};
pub use error::{AppError, AppResult};
pub use pipeline::{
    DecisionHook, RunRequest, RunResponse, reingest, run_file, run_file_with, run_text,
};
pub use progress::{RunProgressEvent, RunStage};
pub use summary::RunSummary;
