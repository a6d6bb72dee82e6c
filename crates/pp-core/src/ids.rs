use core::borrow::Borrow;
use core::fmt;
use core::num::NonZeroU32;

use crate::error::{PpError, PpResult};

/// Prefix shared by every synthesized placeholder node id.
pub const GHOST_PREFIX: &str = "vNode";

/// Identifier of a node in the topology graph.
///
/// Declared records keep their router/network token verbatim; ghosts are
/// rendered as `vNode<n>`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Ordinal of a ghost id (`vNode7` -> 7). `None` for anything else.
    pub fn ghost_ordinal(&self) -> Option<u32> {
        self.0
            .strip_prefix(GHOST_PREFIX)?
            .parse::<u32>()
            .ok()
            .filter(|n| *n > 0)
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Monotonic source of ghost ids, scoped to a single pipeline run.
///
/// - starts at 1
/// - never hands out the same ordinal twice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GhostSequence {
    next: NonZeroU32,
}

impl Default for GhostSequence {
    fn default() -> Self {
        Self::new()
    }
}

impl GhostSequence {
    pub const fn new() -> Self {
        Self {
            next: NonZeroU32::MIN,
        }
    }

    /// Ordinal the next ghost will receive.
    pub fn peek(&self) -> u32 {
        self.next.get()
    }

    /// Number of ghosts handed out so far.
    pub fn issued(&self) -> u32 {
        self.next.get() - 1
    }

    /// Allocate the next ghost id and advance the counter.
    pub fn next_id(&mut self) -> PpResult<NodeId> {
        let current = self.next;
        self.next = current.checked_add(1).ok_or_else(|| PpError::Invariant {
            what: "ghost sequence exhausted".to_string(),
        })?;
        Ok(NodeId(format!("{GHOST_PREFIX}{current}")))
    }
}
