//! Block segmentation.
//!
//! Splits raw dump lines into contiguous, typed blocks. Header detection is
//! state-dependent: a bare `Link ID` line opens a Network block everywhere
//! except inside a Router block, where it is the column header of the link
//! table. `Router Link States` inside a Router block is the area sub-header
//! of the `OSPF Router with ID` block already open.
//!
//! Section headers carrying `(Area <n>)` set the area of every block opened
//! after them until the next such header, including blocks opened by a bare
//! `Link ID` column label.

use std::sync::LazyLock;

use pp_core::LsaKind;
use regex::Regex;
use tracing::debug;

static AREA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\barea\s+(\d+(?:\.\d+){0,3})\b").expect("valid area pattern")
});

/// Area id named by an `Area <n>` mention (`0`, `51`, `0.0.0.1`).
pub fn area_of(line: &str) -> Option<String> {
    AREA_RE
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Segmenter state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SegmentState {
    #[default]
    None,
    Router,
    Network,
    Summary,
}

impl SegmentState {
    pub const fn kind(self) -> Option<LsaKind> {
        match self {
            Self::None => None,
            Self::Router => Some(LsaKind::Router),
            Self::Network => Some(LsaKind::Network),
            Self::Summary => Some(LsaKind::Summary),
        }
    }

    const fn from_kind(kind: LsaKind) -> Self {
        match kind {
            LsaKind::Router => Self::Router,
            LsaKind::Network => Self::Network,
            LsaKind::Summary => Self::Summary,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Guard {
    Always,
    OutsideRouter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Match {
    Contains,
    Prefix,
}

struct HeaderRule {
    pattern: &'static str,
    target: LsaKind,
    matching: Match,
    guard: Guard,
}

/// Header table, checked in order. Lowercase patterns, matched against the
/// lowercased trimmed line. Summary comes first: `summary net link states`
/// also contains `net link states`.
const HEADER_RULES: &[HeaderRule] = &[
    HeaderRule {
        pattern: "summary net link states",
        target: LsaKind::Summary,
        matching: Match::Contains,
        guard: Guard::Always,
    },
    HeaderRule {
        pattern: "summary net lsas",
        target: LsaKind::Summary,
        matching: Match::Contains,
        guard: Guard::Always,
    },
    HeaderRule {
        pattern: "ospf router with id",
        target: LsaKind::Router,
        matching: Match::Contains,
        guard: Guard::Always,
    },
    HeaderRule {
        pattern: "router link states",
        target: LsaKind::Router,
        matching: Match::Contains,
        guard: Guard::OutsideRouter,
    },
    HeaderRule {
        pattern: "network link states",
        target: LsaKind::Network,
        matching: Match::Contains,
        guard: Guard::Always,
    },
    HeaderRule {
        pattern: "net link states",
        target: LsaKind::Network,
        matching: Match::Contains,
        guard: Guard::Always,
    },
    HeaderRule {
        pattern: "network lsas",
        target: LsaKind::Network,
        matching: Match::Contains,
        guard: Guard::Always,
    },
    HeaderRule {
        pattern: "link id",
        target: LsaKind::Network,
        matching: Match::Prefix,
        guard: Guard::OutsideRouter,
    },
];

/// Column labels that can appear inside a block body.
const COLUMN_HEADERS: &[&str] = &["link id", "link connected"];

impl HeaderRule {
    fn matches(&self, lower: &str) -> bool {
        match self.matching {
            Match::Contains => lower.contains(self.pattern),
            Match::Prefix => lower.starts_with(self.pattern),
        }
    }

    fn applies_in(&self, state: SegmentState) -> bool {
        match self.guard {
            Guard::Always => true,
            Guard::OutsideRouter => state != SegmentState::Router,
        }
    }
}

/// Block type a line opens when seen in `state`, if it is a header there.
#[must_use]
pub fn classify_header(state: SegmentState, line: &str) -> Option<LsaKind> {
    let lower = line.trim().to_ascii_lowercase();
    HEADER_RULES
        .iter()
        .find(|rule| rule.applies_in(state) && rule.matches(&lower))
        .map(|rule| rule.target)
}

/// True for any section header or column label, regardless of state.
#[must_use]
pub fn is_header_text(line: &str) -> bool {
    let lower = line.trim().to_ascii_lowercase();
    HEADER_RULES.iter().any(|rule| rule.matches(&lower))
        || COLUMN_HEADERS.iter().any(|label| lower.contains(label))
}

fn is_column_label(line: &str) -> bool {
    let lower = line.trim().to_ascii_lowercase();
    COLUMN_HEADERS.iter().any(|label| lower.starts_with(label))
}

/// One non-blank input line, trimmed, with its 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub number: usize,
    pub text: String,
}

/// A maximal run of lines belonging to one record type.
///
/// The first line is always the header that opened the block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: LsaKind,
    pub lines: Vec<Line>,
    /// Area of the enclosing section, when a section header named one.
    pub area: Option<String>,
}

impl Block {
    pub fn start_line(&self) -> usize {
        self.lines.first().map_or(0, |l| l.number)
    }

    pub fn end_line(&self) -> usize {
        self.lines.last().map_or(0, |l| l.number)
    }

    pub fn header(&self) -> Option<&Line> {
        self.lines.first()
    }

    /// Lines after the header.
    pub fn body(&self) -> &[Line] {
        self.lines.get(1..).unwrap_or(&[])
    }

    pub fn line_numbers(&self) -> Vec<usize> {
        self.lines.iter().map(|l| l.number).collect()
    }

    pub fn texts(&self) -> Vec<String> {
        self.lines.iter().map(|l| l.text.clone()).collect()
    }
}

/// Streaming segmenter: feed lines in order, collect flushed blocks.
#[derive(Debug, Default)]
pub struct BlockSegmenter {
    state: SegmentState,
    current: Vec<Line>,
    current_area: Option<String>,
    section_area: Option<String>,
    discarded: usize,
}

impl BlockSegmenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SegmentState {
        self.state
    }

    /// Non-blank lines dropped because no header had been seen yet.
    pub fn discarded_lines(&self) -> usize {
        self.discarded
    }

    /// Feed one raw line. Returns the prior block when this line opens a new one.
    pub fn push(&mut self, number: usize, raw: &str) -> Option<Block> {
        let text = raw.trim();
        if text.is_empty() {
            return None;
        }

        let line = Line {
            number,
            text: text.to_string(),
        };

        match classify_header(self.state, text) {
            Some(kind) => {
                let flushed = self.flush();
                self.state = SegmentState::from_kind(kind);
                // A column label stays in the section it labels.
                if !is_column_label(text) {
                    self.section_area = area_of(text);
                }
                self.current_area = self.section_area.clone();
                self.current.push(line);
                flushed
            }
            None if self.state == SegmentState::None => {
                self.discarded += 1;
                None
            }
            None => {
                self.current.push(line);
                None
            }
        }
    }

    /// Flush whatever block is still open.
    pub fn finish(&mut self) -> Option<Block> {
        let block = self.flush();
        self.state = SegmentState::None;
        self.section_area = None;
        block
    }

    fn flush(&mut self) -> Option<Block> {
        let kind = self.state.kind()?;
        if self.current.is_empty() {
            return None;
        }
        let block = Block {
            kind,
            lines: std::mem::take(&mut self.current),
            area: self.current_area.take(),
        };
        debug!(
            "Flushed {} block, lines {}-{}",
            block.kind,
            block.start_line(),
            block.end_line()
        );
        Some(block)
    }
}

/// Segment a whole dump at once.
#[must_use]
pub fn segment(input: &str) -> Vec<Block> {
    let mut segmenter = BlockSegmenter::new();
    let mut blocks: Vec<Block> = input
        .lines()
        .enumerate()
        .filter_map(|(index, line)| segmenter.push(index + 1, line))
        .collect();
    blocks.extend(segmenter.finish());
    blocks
}
