//! Serialized document definitions.

use pp_core::{LsaDatabase, MalformedRecord, NetworkLsa, RouterLsa, SummaryLsa};
use serde::{Deserialize, Serialize};

/// The document written by a run: one array per record type plus the
/// malformed-record log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct LsaDocument {
    #[serde(default)]
    pub router_lsas: Vec<RouterLsa>,
    #[serde(default)]
    pub network_lsas: Vec<NetworkLsa>,
    #[serde(default)]
    pub summary_lsas: Vec<SummaryLsa>,
    #[serde(default)]
    pub skipped_lsas: Vec<MalformedRecord>,
}

impl From<LsaDatabase> for LsaDocument {
    fn from(db: LsaDatabase) -> Self {
        Self {
            router_lsas: db.routers,
            network_lsas: db.networks,
            summary_lsas: db.summaries,
            skipped_lsas: db.skipped,
        }
    }
}

impl From<&LsaDatabase> for LsaDocument {
    fn from(db: &LsaDatabase) -> Self {
        Self::from(db.clone())
    }
}

impl From<LsaDocument> for LsaDatabase {
    fn from(doc: LsaDocument) -> Self {
        Self {
            routers: doc.router_lsas,
            networks: doc.network_lsas,
            summaries: doc.summary_lsas,
            skipped: doc.skipped_lsas,
        }
    }
}

/// Serialized file format, chosen from the path extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// `.json` -> Json, `.yaml`/`.yml` -> Yaml, case-insensitive.
    pub fn from_path(path: &std::path::Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("json") {
            Some(Self::Json)
        } else if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") {
            Some(Self::Yaml)
        } else {
            None
        }
    }
}
