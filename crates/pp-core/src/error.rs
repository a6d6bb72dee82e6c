use thiserror::Error;

pub type PpResult<T> = Result<T, PpError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PpError {
    #[error("Invariant violated: {what}")]
    Invariant { what: String },
}
