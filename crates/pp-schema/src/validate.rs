//! Document validation logic.
//!
//! Identifiers may legitimately be empty (the graph stage gives such records
//! a ghost node) and may repeat across areas, so validation only checks the
//! malformed-record log and the link metrics.

use pp_core::{LsaDatabase, MalformedRecord};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Malformed {lsa_type} record has no line numbers")]
    EmptyLineRange { lsa_type: String },

    #[error("Malformed {lsa_type} record lines are not ascending: {lines:?}")]
    UnorderedLines { lsa_type: String, lines: Vec<usize> },

    #[error("Malformed {lsa_type} record at line {line} has no reason")]
    MissingReason { lsa_type: String, line: usize },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

pub fn validate_database(db: &LsaDatabase) -> Result<(), ValidationError> {
    for record in &db.skipped {
        validate_malformed(record)?;
    }

    for router in &db.routers {
        for link in &router.links {
            if link.link_id.trim().is_empty() {
                return Err(ValidationError::InvalidValue {
                    field: format!("router {} link_id", router.router_id),
                    value: format!("{:?}", link.link_id),
                    reason: "link identifier is blank".to_string(),
                });
            }
        }
    }

    Ok(())
}

fn validate_malformed(record: &MalformedRecord) -> Result<(), ValidationError> {
    let lsa_type = record.lsa_type.to_string();
    let Some(first) = record.first_line() else {
        return Err(ValidationError::EmptyLineRange { lsa_type });
    };

    if record.lines.windows(2).any(|w| w[0] >= w[1]) || first == 0 {
        return Err(ValidationError::UnorderedLines {
            lsa_type,
            lines: record.lines.clone(),
        });
    }

    if record.reason.trim().is_empty() {
        return Err(ValidationError::MissingReason {
            lsa_type,
            line: first,
        });
    }

    Ok(())
}
