//! Malformed-record decision hook.
//!
//! The extractor reports every malformed record through a caller-supplied
//! `FnMut(&MalformedRecord) -> Decision`. Interactive front-ends prompt the
//! operator from inside the closure; headless runs use one of the fixed
//! policies below.

use pp_core::MalformedRecord;

/// What to do after a malformed record was reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Decision {
    /// Log it and keep going with the next line or block.
    #[default]
    Continue,
    /// Stop extraction now; records gathered so far are kept.
    Abort,
}

impl Decision {
    pub const fn is_abort(self) -> bool {
        matches!(self, Self::Abort)
    }
}

/// Headless policy: skip every malformed record.
pub fn skip_all(_: &MalformedRecord) -> Decision {
    Decision::Continue
}

/// Headless policy: stop at the first malformed record.
pub fn abort_on_first(_: &MalformedRecord) -> Decision {
    Decision::Abort
}
