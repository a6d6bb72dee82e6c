//! pp-parser: text dump -> canonical link-state records.
//!
//! Provides:
//! - A state-aware block segmenter (`segment`)
//! - Per-type record extraction with malformed-input recovery (`extract`)
//! - The malformed-record decision hook (`decide`)
//!
//! # Example
//!
//! ```
//! use pp_parser::parse;
//!
//! let outcome = parse("OSPF Router with ID (10.0.0.1)\nRouter Link States (Area 0)\n10.0.0.2 64");
//! assert_eq!(outcome.database.routers.len(), 1);
//! assert!(!outcome.aborted());
//! ```

#![forbid(unsafe_code)]

pub mod decide;
pub mod extract;
pub mod segment;

use pp_core::{LsaDatabase, MalformedRecord};
use tracing::info;

pub use decide::{Decision, abort_on_first, skip_all};
pub use extract::{ExtractConfig, PLACEHOLDER_SUMMARY_METRIC, RecordExtractor};
pub use segment::{Block, BlockSegmenter, Line, SegmentState, classify_header, segment};

/// Result of one parse pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOutcome {
    pub database: LsaDatabase,
    /// The record the decision hook stopped on; `database` is then partial.
    pub aborted_by: Option<MalformedRecord>,
    /// Blocks handed to the extractor.
    pub blocks: usize,
    /// Non-blank lines seen before the first recognised header.
    pub discarded_lines: usize,
}

impl ParseOutcome {
    pub fn aborted(&self) -> bool {
        self.aborted_by.is_some()
    }
}

/// Parse with default settings, skipping every malformed record.
#[must_use]
pub fn parse(input: &str) -> ParseOutcome {
    parse_with(input, &ExtractConfig::default(), &mut skip_all)
}

/// Parse in a single pass, extracting each block as soon as it is flushed.
///
/// On an `Abort` decision no further lines are segmented and no further
/// blocks are extracted.
pub fn parse_with(
    input: &str,
    config: &ExtractConfig,
    decide: &mut dyn FnMut(&MalformedRecord) -> Decision,
) -> ParseOutcome {
    let mut segmenter = BlockSegmenter::new();
    let mut extractor = RecordExtractor::new(config.clone());
    let mut blocks = 0;

    for (index, line) in input.lines().enumerate() {
        let Some(block) = segmenter.push(index + 1, line) else {
            continue;
        };
        blocks += 1;
        if extractor.extract(&block, decide).is_abort() {
            break;
        }
    }

    if !extractor.is_aborted()
        && let Some(block) = segmenter.finish()
    {
        blocks += 1;
        extractor.extract(&block, decide);
    }

    let aborted_by = extractor.aborted_by().cloned();
    let discarded_lines = segmenter.discarded_lines();
    let database = extractor.into_database();

    info!(
        "Parsed {} router, {} network, {} summary LSAs ({} skipped){}",
        database.routers.len(),
        database.networks.len(),
        database.summaries.len(),
        database.skipped.len(),
        if aborted_by.is_some() { ", aborted" } else { "" }
    );

    ParseOutcome {
        database,
        aborted_by,
        blocks,
        discarded_lines,
    }
}
