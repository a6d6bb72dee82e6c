//! Error types for the pp-app service layer.

use std::path::PathBuf;

use pp_core::{MalformedRecord, PpError};
use pp_schema::SchemaError;

use crate::pipeline::RunResponse;

/// Application error type wrapping the backend crates.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The input file does not exist. Nothing was parsed.
    #[error("Input not found: {}", path.display())]
    InputNotFound { path: PathBuf },

    #[error("Failed to read input file: {}", path.display())]
    InputRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write output file: {}", path.display())]
    OutputWrite { path: PathBuf, source: SchemaError },

    #[error("Document error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Graph error: {0}")]
    Graph(#[from] PpError),

    /// The decision hook stopped the run. `partial` holds everything
    /// gathered up to that point.
    #[error(
        "Run aborted at malformed {} record (lines {:?}): {}",
        record.lsa_type,
        record.lines,
        record.reason
    )]
    Aborted {
        record: MalformedRecord,
        partial: Box<RunResponse>,
    },

    #[error("Invalid configuration in {}: {message}", path.display())]
    Config { path: PathBuf, message: String },
}

/// Result type for pp-app operations.
pub type AppResult<T> = Result<T, AppError>;
