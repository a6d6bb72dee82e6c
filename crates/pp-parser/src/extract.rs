//! Per-block record extraction.

use std::sync::LazyLock;

use pp_core::{
    DEFAULT_AREA_ID, LinkRef, LsaDatabase, LsaKind, MalformedRecord, NetworkLsa,
    REASON_INSUFFICIENT_COLUMNS, REASON_MISSING_ROUTER_ID, RouterLsa, SummaryLsa,
};
use regex::Regex;
use tracing::{debug, warn};

use crate::decide::Decision;
use crate::segment::{Block, Line, area_of, is_header_text};

/// Metric recorded for a Summary row with no integer column.
///
/// Inherited from earlier producers. The value has no protocol meaning and
/// should not be read as a real cost.
pub const PLACEHOLDER_SUMMARY_METRIC: u32 = 20;

static ROUTER_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)router\s+with\s+id\s*\(?\s*(\d+(?:\.\d+)*)\b")
        .expect("valid router id pattern")
});

/// Tunables for extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractConfig {
    pub default_area_id: String,
    pub summary_placeholder_metric: u32,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            default_area_id: DEFAULT_AREA_ID.to_string(),
            summary_placeholder_metric: PLACEHOLDER_SUMMARY_METRIC,
        }
    }
}

/// Turns flushed blocks into canonical records.
///
/// Once a decision hook answers [`Decision::Abort`], every later call is a
/// no-op and the database is frozen at what was gathered so far.
#[derive(Debug, Default)]
pub struct RecordExtractor {
    config: ExtractConfig,
    database: LsaDatabase,
    aborted_by: Option<MalformedRecord>,
}

impl RecordExtractor {
    pub fn new(config: ExtractConfig) -> Self {
        Self {
            config,
            database: LsaDatabase::default(),
            aborted_by: None,
        }
    }

    pub fn database(&self) -> &LsaDatabase {
        &self.database
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted_by.is_some()
    }

    /// The malformed record whose decision stopped extraction.
    pub fn aborted_by(&self) -> Option<&MalformedRecord> {
        self.aborted_by.as_ref()
    }

    pub fn into_database(self) -> LsaDatabase {
        self.database
    }

    /// Extract one block. Returns `Abort` if extraction is (now) halted.
    pub fn extract(
        &mut self,
        block: &Block,
        decide: &mut dyn FnMut(&MalformedRecord) -> Decision,
    ) -> Decision {
        if self.is_aborted() {
            return Decision::Abort;
        }

        debug!(
            "Processing {} block, lines {}-{}",
            block.kind,
            block.start_line(),
            block.end_line()
        );

        match block.kind {
            LsaKind::Router => self.extract_router(block, decide),
            LsaKind::Network => self.extract_rows(block, 2, decide, |row, tokens, area| {
                Parsed::Network(NetworkLsa {
                    network_id: tokens[0].to_string(),
                    attached_routers: vec![tokens[1].to_string()],
                    area_id: area.to_string(),
                })
                .tag(row)
            }),
            LsaKind::Summary => {
                let placeholder = self.config.summary_placeholder_metric;
                self.extract_rows(block, 3, decide, move |row, tokens, area| {
                    let metric = tokens[2..]
                        .iter()
                        .find_map(|t| parse_metric(t))
                        .unwrap_or(placeholder);
                    Parsed::Summary(SummaryLsa {
                        adv_router: tokens[1].to_string(),
                        prefix: tokens[0].to_string(),
                        metric,
                        area_id: area.to_string(),
                    })
                    .tag(row)
                })
            }
        }
    }

    fn extract_router(
        &mut self,
        block: &Block,
        decide: &mut dyn FnMut(&MalformedRecord) -> Decision,
    ) -> Decision {
        let router_id = block
            .lines
            .iter()
            .find_map(|line| capture(&ROUTER_ID_RE, &line.text));

        let Some(router_id) = router_id else {
            let record = MalformedRecord::new(
                LsaKind::Router,
                block.line_numbers(),
                REASON_MISSING_ROUTER_ID,
            )
            .with_excerpt(block.texts());
            return self.report(record, decide);
        };

        let area_id = block
            .lines
            .iter()
            .find_map(|line| area_of(&line.text))
            .or_else(|| block.area.clone())
            .unwrap_or_else(|| self.config.default_area_id.clone());

        let links: Vec<LinkRef> = block
            .lines
            .iter()
            .filter(|line| !is_header_text(&line.text))
            .filter_map(|line| {
                let tokens: Vec<&str> = line.text.split_whitespace().collect();
                if tokens.len() < 2 {
                    return None;
                }
                let metric = tokens.last().and_then(|t| parse_metric(t)).unwrap_or(0);
                Some(LinkRef {
                    link_id: tokens[0].to_string(),
                    metric,
                })
            })
            .collect();

        debug!("Parsed Router LSA {router_id}, {} links", links.len());
        self.database.routers.push(RouterLsa {
            router_id,
            area_id,
            links,
        });
        Decision::Continue
    }

    /// Row-per-record blocks: the header line is skipped and each remaining
    /// line fails or succeeds on its own.
    fn extract_rows<F>(
        &mut self,
        block: &Block,
        min_tokens: usize,
        decide: &mut dyn FnMut(&MalformedRecord) -> Decision,
        build: F,
    ) -> Decision
    where
        F: Fn(&Line, &[&str], &str) -> Parsed,
    {
        let area_id = block
            .area
            .clone()
            .unwrap_or_else(|| self.config.default_area_id.clone());

        for row in block.body() {
            let tokens: Vec<&str> = row.text.split_whitespace().collect();
            if tokens.len() < min_tokens {
                let record = MalformedRecord::new(
                    block.kind,
                    vec![row.number],
                    REASON_INSUFFICIENT_COLUMNS,
                )
                .with_excerpt(vec![row.text.clone()]);
                if self.report(record, decide).is_abort() {
                    return Decision::Abort;
                }
                continue;
            }

            match build(row, &tokens, &area_id) {
                Parsed::Network(lsa) => self.database.networks.push(lsa),
                Parsed::Summary(lsa) => self.database.summaries.push(lsa),
            }
        }

        Decision::Continue
    }

    fn report(
        &mut self,
        record: MalformedRecord,
        decide: &mut dyn FnMut(&MalformedRecord) -> Decision,
    ) -> Decision {
        warn!(
            "Skipping malformed {} LSA (lines {:?}): {}",
            record.lsa_type, record.lines, record.reason
        );
        let decision = decide(&record);
        if decision.is_abort() {
            warn!("Extraction aborted at line {:?}", record.first_line());
            self.aborted_by = Some(record.clone());
        }
        self.database.skipped.push(record);
        decision
    }
}

enum Parsed {
    Network(NetworkLsa),
    Summary(SummaryLsa),
}

impl Parsed {
    fn tag(self, row: &Line) -> Self {
        match &self {
            Parsed::Network(lsa) => debug!(
                "Line {}: Network LSA {}, attached {:?}",
                row.number, lsa.network_id, lsa.attached_routers
            ),
            Parsed::Summary(lsa) => debug!(
                "Line {}: Summary LSA {}, adv router {}, metric {}",
                row.number, lsa.prefix, lsa.adv_router, lsa.metric
            ),
        }
        self
    }
}

fn capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim_end_matches('.').to_string())
        .filter(|s| !s.is_empty())
}

/// Purely numeric token -> metric. Signs, hex and overflow are rejected.
fn parse_metric(token: &str) -> Option<u32> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decide::{abort_on_first, skip_all};
    use crate::segment::segment;

    fn run(input: &str) -> LsaDatabase {
        let mut extractor = RecordExtractor::new(ExtractConfig::default());
        for block in segment(input) {
            extractor.extract(&block, &mut skip_all);
        }
        extractor.into_database()
    }

    #[test]
    fn router_with_parenthesized_id() {
        let db = run("OSPF Router with ID (10.0.0.1)\nRouter Link States (Area 0)\n10.0.0.2 64");
        assert_eq!(
            db.routers,
            vec![RouterLsa {
                router_id: "10.0.0.1".into(),
                area_id: "0".into(),
                links: vec![LinkRef {
                    link_id: "10.0.0.2".into(),
                    metric: 64,
                }],
            }]
        );
        assert!(db.skipped.is_empty());
    }

    #[test]
    fn router_with_trailing_id_and_dotted_area() {
        let db = run("OSPF Router with ID 1.1.1.1\nRouter Link States (Area 0.0.0.1)\n2.2.2.2 cost");
        assert_eq!(db.routers[0].router_id, "1.1.1.1");
        assert_eq!(db.routers[0].area_id, "0.0.0.1");
        assert_eq!(db.routers[0].links[0].metric, 0);
    }

    #[test]
    fn router_column_headers_are_not_links() {
        let db = run("OSPF Router with ID (1.1.1.1) (Process ID 1)\n\
                      Router Link States (Area 0)\n\
                      Link ID  ADV Router  Age  Seq#  Checksum  Link count\n\
                      1.1.1.1  1.1.1.1  100  0x80000002  0x00A1B2  2\n\
                      single");
        let links = &db.routers[0].links;
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].link_id, "1.1.1.1");
        assert_eq!(links[0].metric, 2);
    }

    #[test]
    fn router_area_defaults_from_config() {
        let mut extractor = RecordExtractor::new(ExtractConfig {
            default_area_id: "unknown".into(),
            ..ExtractConfig::default()
        });
        for block in segment("OSPF Router with ID (1.1.1.1)\n2.2.2.2 5") {
            extractor.extract(&block, &mut skip_all);
        }
        assert_eq!(extractor.database().routers[0].area_id, "unknown");
    }

    #[test]
    fn router_without_id_is_dropped_whole() {
        let db = run("Router Link States (Area 0)\n2.2.2.2 10\n3.3.3.3 20");
        assert!(db.routers.is_empty());
        assert_eq!(db.skipped.len(), 1);
        let skipped = &db.skipped[0];
        assert_eq!(skipped.lsa_type, LsaKind::Router);
        assert_eq!(skipped.reason, REASON_MISSING_ROUTER_ID);
        assert_eq!(skipped.lines, vec![1, 2, 3]);
        assert_eq!(skipped.excerpt.len(), 3);
    }

    #[test]
    fn network_single_token_row_is_malformed() {
        let db = run("Net Link States (Area 0)\n10.0.0.0");
        assert!(db.networks.is_empty());
        assert_eq!(db.skipped.len(), 1);
        assert_eq!(db.skipped[0].lsa_type, LsaKind::Network);
        assert_eq!(db.skipped[0].reason, REASON_INSUFFICIENT_COLUMNS);
        assert_eq!(db.skipped[0].lines, vec![2]);
    }

    #[test]
    fn network_failure_is_per_line() {
        let db = run("Network LSAs (Area 3)\n10.0.0.0 1.1.1.1\nbroken\n10.0.1.0 2.2.2.2 extra");
        assert_eq!(db.networks.len(), 2);
        assert_eq!(db.skipped.len(), 1);
        assert_eq!(db.networks[1].network_id, "10.0.1.0");
        assert_eq!(db.networks[1].attached_routers, vec!["2.2.2.2".to_string()]);
        assert_eq!(db.networks[1].area_id, "3");
    }

    #[test]
    fn summary_metric_is_first_integer_after_adv_router() {
        let db = run("Summary Net Link States (Area 1)\n10.1.0.0 1.1.1.1 0x80000001 45 7");
        assert_eq!(
            db.summaries,
            vec![SummaryLsa {
                adv_router: "1.1.1.1".into(),
                prefix: "10.1.0.0".into(),
                metric: 45,
                area_id: "1".into(),
            }]
        );
    }

    #[test]
    fn summary_without_integer_uses_placeholder() {
        let db = run("Summary Net LSAs\n10.1.0.0 1.1.1.1 n/a");
        assert_eq!(db.summaries[0].metric, PLACEHOLDER_SUMMARY_METRIC);
        assert_eq!(db.summaries[0].area_id, DEFAULT_AREA_ID);
    }

    #[test]
    fn summary_needs_three_columns() {
        let db = run("Summary Net LSAs\n10.1.0.0 1.1.1.1");
        assert!(db.summaries.is_empty());
        assert_eq!(db.skipped[0].lsa_type, LsaKind::Summary);
        assert_eq!(db.skipped[0].reason, REASON_INSUFFICIENT_COLUMNS);
    }

    #[test]
    fn abort_halts_mid_block_and_keeps_earlier_records() {
        let mut extractor = RecordExtractor::new(ExtractConfig::default());
        let blocks = segment("Network LSAs\n10.0.0.0 1.1.1.1\nbad\n10.0.2.0 3.3.3.3");
        assert_eq!(extractor.extract(&blocks[0], &mut abort_on_first), Decision::Abort);
        assert!(extractor.is_aborted());
        assert_eq!(extractor.aborted_by().and_then(|r| r.first_line()), Some(3));

        let db = extractor.database();
        assert_eq!(db.networks.len(), 1);
        assert_eq!(db.skipped.len(), 1);
    }

    #[test]
    fn aborted_extractor_ignores_later_blocks() {
        let mut extractor = RecordExtractor::new(ExtractConfig::default());
        let blocks = segment("Router Link States\n1.1.1.1 1\nOSPF Router with ID (2.2.2.2)\n3.3.3.3 4");
        assert_eq!(blocks.len(), 2);
        assert!(extractor.extract(&blocks[0], &mut abort_on_first).is_abort());
        assert!(extractor.extract(&blocks[1], &mut skip_all).is_abort());
        assert!(extractor.database().routers.is_empty());
    }

    #[test]
    fn router_id_must_be_numeric() {
        let db = run("OSPF Router with ID (abc)\nRouter Link States (Area 0)\n2.2.2.2 10");
        assert!(db.routers.is_empty());
        assert_eq!(db.skipped.len(), 1);
        assert_eq!(db.skipped[0].reason, REASON_MISSING_ROUTER_ID);
    }

    #[test]
    fn area_border_router_text_is_not_an_area() {
        let db = run("OSPF Router with ID (1.1.1.1) (Process ID 1)\nArea Border Router\n2.2.2.2 10");
        let router = &db.routers[0];
        assert_eq!(router.area_id, DEFAULT_AREA_ID);
        assert!(router.links.iter().any(|link| link.link_id == "2.2.2.2" && link.metric == 10));
    }

    #[test]
    fn rows_after_column_label_keep_section_area() {
        let db = run("Net Link States (Area 1)\n\nLink ID  ADV Router  Age\n10.0.0.2  2.2.2.2  100");
        assert_eq!(db.networks.len(), 1);
        assert_eq!(db.networks[0].area_id, "1");

        let db = run("Summary Net Link States (Area 2)\nLink ID  ADV Router\n10.1.0.0  1.1.1.1  30");
        assert_eq!(db.networks.len(), 1);
        assert_eq!(db.networks[0].area_id, "2");
    }

    #[test]
    fn metric_parsing_rejects_non_digits() {
        assert_eq!(parse_metric("64"), Some(64));
        assert_eq!(parse_metric("+5"), None);
        assert_eq!(parse_metric("0x10"), None);
        assert_eq!(parse_metric("99999999999"), None);
        assert_eq!(parse_metric(""), None);
    }
}
