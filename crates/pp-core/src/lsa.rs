//! Canonical link-state records.
//!
//! Records are produced once by the extractor (or by normalizing a stored
//! document) and are not mutated afterwards.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Area assigned when a block carries no `Area <n>` marker.
pub const DEFAULT_AREA_ID: &str = "0";

/// Reason recorded for a Router block without a `Router with ID` line.
pub const REASON_MISSING_ROUTER_ID: &str = "Missing router ID";

/// Reason recorded for a Network/Summary row with too few tokens.
pub const REASON_INSUFFICIENT_COLUMNS: &str = "Insufficient columns";

/// The three record types found in a database dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LsaKind {
    Router,
    Network,
    Summary,
}

impl LsaKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Router => "Router",
            Self::Network => "Network",
            Self::Summary => "Summary",
        }
    }

    /// Case-insensitive lookup (`"router"`, `"ROUTER"` and `"Router"` all match).
    pub fn from_name(name: &str) -> Option<Self> {
        [Self::Router, Self::Network, Self::Summary]
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for LsaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One link of a router record.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LinkRef {
    pub link_id: String,
    pub metric: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RouterLsa {
    pub router_id: String,
    pub area_id: String,
    pub links: Vec<LinkRef>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NetworkLsa {
    pub network_id: String,
    pub attached_routers: Vec<String>,
    pub area_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SummaryLsa {
    pub adv_router: String,
    /// Advertised prefix; older producers call this `link` or `link_id`.
    pub prefix: String,
    pub metric: u32,
    pub area_id: String,
}

/// A block or row that failed extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MalformedRecord {
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub lsa_type: LsaKind,
    /// 1-based input line numbers of the offending range.
    pub lines: Vec<usize>,
    pub reason: String,
    /// Trimmed text of `lines`, when known.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Vec::is_empty")
    )]
    pub excerpt: Vec<String>,
}

impl MalformedRecord {
    pub fn new(lsa_type: LsaKind, lines: Vec<usize>, reason: impl Into<String>) -> Self {
        Self {
            lsa_type,
            lines,
            reason: reason.into(),
            excerpt: Vec::new(),
        }
    }

    pub fn with_excerpt(mut self, excerpt: Vec<String>) -> Self {
        self.excerpt = excerpt;
        self
    }

    pub fn first_line(&self) -> Option<usize> {
        self.lines.first().copied()
    }

    pub fn last_line(&self) -> Option<usize> {
        self.lines.last().copied()
    }
}

/// Every record of one pipeline run, in canonical shape.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LsaDatabase {
    #[cfg_attr(feature = "serde", serde(default))]
    pub routers: Vec<RouterLsa>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub networks: Vec<NetworkLsa>,
    #[cfg_attr(feature = "serde", serde(default, rename = "summary"))]
    pub summaries: Vec<SummaryLsa>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub skipped: Vec<MalformedRecord>,
}

impl LsaDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of well-formed records (malformed entries excluded).
    pub fn record_count(&self) -> usize {
        self.routers.len() + self.networks.len() + self.summaries.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    pub fn is_empty(&self) -> bool {
        self.record_count() == 0 && self.skipped.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_lookup_ignores_case() {
        assert_eq!(LsaKind::from_name("router"), Some(LsaKind::Router));
        assert_eq!(LsaKind::from_name(" NETWORK "), Some(LsaKind::Network));
        assert_eq!(LsaKind::from_name("Summary"), Some(LsaKind::Summary));
        assert_eq!(LsaKind::from_name("external"), None);
    }

    #[test]
    fn database_counts() {
        let mut db = LsaDatabase::new();
        assert!(db.is_empty());

        db.routers.push(RouterLsa {
            router_id: "1.1.1.1".into(),
            area_id: DEFAULT_AREA_ID.into(),
            links: vec![],
        });
        db.skipped.push(MalformedRecord::new(
            LsaKind::Network,
            vec![4],
            REASON_INSUFFICIENT_COLUMNS,
        ));

        assert_eq!(db.record_count(), 1);
        assert_eq!(db.skipped_count(), 1);
        assert!(!db.is_empty());
    }

    #[test]
    fn malformed_line_bounds() {
        let record = MalformedRecord::new(LsaKind::Router, vec![3, 4, 5], REASON_MISSING_ROUTER_ID);
        assert_eq!(record.first_line(), Some(3));
        assert_eq!(record.last_line(), Some(5));
        assert!(record.excerpt.is_empty());
    }
}
