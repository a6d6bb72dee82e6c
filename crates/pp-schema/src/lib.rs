//! pp-schema: serialized document format, envelope normalization and validation.

pub mod normalize;
pub mod schema;
pub mod validate;

pub use normalize::{EnvelopeVariant, detect_variant, normalize, normalize_value};
pub use schema::*;
pub use validate::{ValidationError, validate_database};

use pp_core::LsaDatabase;
use std::path::Path;

pub type SchemaResult<T> = Result<T, SchemaError>;

#[derive(thiserror::Error, Debug)]
pub enum SchemaError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Normalization error: {what}")]
    Normalization { what: String },

    #[error("Unsupported document format: {path}")]
    UnsupportedFormat { path: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parse document text in any known envelope.
pub fn from_str(content: &str, format: DocumentFormat) -> SchemaResult<LsaDatabase> {
    let raw: serde_json::Value = match format {
        DocumentFormat::Json => serde_json::from_str(content)?,
        DocumentFormat::Yaml => serde_yaml::from_str(content)?,
    };
    let db = normalize(&raw)?;
    validate_database(&db)?;
    Ok(db)
}

/// Render the canonical document.
pub fn to_string(db: &LsaDatabase, format: DocumentFormat) -> SchemaResult<String> {
    validate_database(db)?;
    let doc = LsaDocument::from(db);
    Ok(match format {
        DocumentFormat::Json => serde_json::to_string_pretty(&doc)?,
        DocumentFormat::Yaml => serde_yaml::to_string(&doc)?,
    })
}

pub fn load_yaml(path: &Path) -> SchemaResult<LsaDatabase> {
    let content = std::fs::read_to_string(path)?;
    from_str(&content, DocumentFormat::Yaml)
}

pub fn save_yaml(path: &Path, db: &LsaDatabase) -> SchemaResult<()> {
    let content = to_string(db, DocumentFormat::Yaml)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &Path) -> SchemaResult<LsaDatabase> {
    let content = std::fs::read_to_string(path)?;
    from_str(&content, DocumentFormat::Json)
}

pub fn save_json(path: &Path, db: &LsaDatabase) -> SchemaResult<()> {
    let content = to_string(db, DocumentFormat::Json)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Load a document, picking the format from the extension.
pub fn load(path: &Path) -> SchemaResult<LsaDatabase> {
    match format_of(path)? {
        DocumentFormat::Json => load_json(path),
        DocumentFormat::Yaml => load_yaml(path),
    }
}

/// Save a document, picking the format from the extension.
pub fn save(path: &Path, db: &LsaDatabase) -> SchemaResult<()> {
    match format_of(path)? {
        DocumentFormat::Json => save_json(path, db),
        DocumentFormat::Yaml => save_yaml(path, db),
    }
}

fn format_of(path: &Path) -> SchemaResult<DocumentFormat> {
    DocumentFormat::from_path(path).ok_or_else(|| SchemaError::UnsupportedFormat {
        path: path.display().to_string(),
    })
}
