//! Integration tests for pp-parser against realistic database dumps.

use pp_core::{LsaKind, REASON_INSUFFICIENT_COLUMNS, REASON_MISSING_ROUTER_ID};
use pp_parser::{Decision, ExtractConfig, parse, parse_with};

const DUMP: &str = "
R1# show ip ospf database

            OSPF Router with ID (1.1.1.1) (Process ID 1)

                Router Link States (Area 0)

Link ID         ADV Router      Age         Seq#       Checksum Link count
2.2.2.2         2.2.2.2         812         0x80000004 0x00B3C1 3
3.3.3.3         3.3.3.3         799         0x80000002 0x004A2F 2

                Net Link States (Area 0)

10.0.12.2       2.2.2.2         812         0x80000001 0x0091AA
10.0.13.3

                Summary Net Link States (Area 0)

10.1.0.0        1.1.1.1         400         0x80000001 0x00C0DE
10.2.0.0
";

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

#[test]
fn parses_every_block_type() {
    init_tracing();
    let outcome = parse(DUMP);

    assert!(!outcome.aborted());
    assert_eq!(outcome.blocks, 3);
    assert_eq!(outcome.discarded_lines, 1);

    let db = &outcome.database;
    assert_eq!(db.routers.len(), 1);
    assert_eq!(db.routers[0].router_id, "1.1.1.1");
    assert_eq!(db.routers[0].area_id, "0");
    let link_ids: Vec<&str> = db.routers[0]
        .links
        .iter()
        .map(|l| l.link_id.as_str())
        .collect();
    assert_eq!(link_ids, vec!["2.2.2.2", "3.3.3.3"]);
    assert_eq!(db.routers[0].links[0].metric, 3);

    assert_eq!(db.networks.len(), 1);
    assert_eq!(db.networks[0].network_id, "10.0.12.2");
    assert_eq!(db.networks[0].attached_routers, vec!["2.2.2.2".to_string()]);

    assert_eq!(db.summaries.len(), 1);
    assert_eq!(db.summaries[0].prefix, "10.1.0.0");
    assert_eq!(db.summaries[0].adv_router, "1.1.1.1");
    assert_eq!(db.summaries[0].metric, 400);

    assert_eq!(db.skipped.len(), 2);
    assert!(
        db.skipped
            .iter()
            .all(|s| s.reason == REASON_INSUFFICIENT_COLUMNS)
    );
    assert_eq!(db.skipped[0].lsa_type, LsaKind::Network);
    assert_eq!(db.skipped[1].lsa_type, LsaKind::Summary);
}

#[test]
fn missing_router_id_adds_exactly_one_malformed_record() {
    let with_id = parse("OSPF Router with ID (1.1.1.1)\n2.2.2.2 1");
    let without_id = parse("Router Link States (Area 0)\n2.2.2.2 1\n3.3.3.3 2");

    assert_eq!(with_id.database.skipped.len(), 0);
    assert_eq!(without_id.database.skipped.len(), 1);
    assert_eq!(without_id.database.skipped[0].reason, REASON_MISSING_ROUTER_ID);
    assert!(without_id.database.routers.is_empty());
}

#[test]
fn hook_sees_every_malformed_record_in_order() {
    let mut seen = Vec::new();
    let outcome = parse_with(DUMP, &ExtractConfig::default(), &mut |record| {
        seen.push((record.lsa_type, record.lines.clone()));
        Decision::Continue
    });

    assert!(!outcome.aborted());
    assert_eq!(
        seen,
        vec![(LsaKind::Network, vec![15]), (LsaKind::Summary, vec![20])]
    );
}

#[test]
fn abort_keeps_records_gathered_before_it() {
    let outcome = parse_with(DUMP, &ExtractConfig::default(), &mut |_| Decision::Abort);

    assert!(outcome.aborted());
    assert_eq!(
        outcome.aborted_by.as_ref().map(|r| r.lines.clone()),
        Some(vec![15])
    );
    let db = &outcome.database;
    assert_eq!(db.routers.len(), 1);
    assert_eq!(db.networks.len(), 1);
    assert!(db.summaries.is_empty(), "summary block must not be processed");
    assert_eq!(db.skipped.len(), 1);
    assert_eq!(outcome.blocks, 2);
}

#[test]
fn placeholder_metric_is_configurable() {
    let config = ExtractConfig {
        summary_placeholder_metric: 1,
        ..ExtractConfig::default()
    };
    let outcome = parse_with(
        "Summary Net LSAs\n10.9.0.0 9.9.9.9 none",
        &config,
        &mut pp_parser::skip_all,
    );
    assert_eq!(outcome.database.summaries[0].metric, 1);
}

#[test]
fn empty_input_yields_empty_database() {
    let outcome = parse("");
    assert!(outcome.database.is_empty());
    assert_eq!(outcome.blocks, 0);
    assert!(!outcome.aborted());
}

#[test]
fn column_labels_under_area_headers_keep_the_area() {
    let dump = "
                Net Link States (Area 1)

Link ID         ADV Router      Age         Seq#       Checksum
10.0.12.2       2.2.2.2         812         0x80000001 0x0091AA

                Summary Net Link States (Area 2)

Link ID         ADV Router      Age         Seq#       Checksum
10.1.0.0        1.1.1.1         400         0x80000001 0x00C0DE
";
    let outcome = parse(dump);

    let areas: Vec<&str> = outcome
        .database
        .networks
        .iter()
        .map(|n| n.area_id.as_str())
        .collect();
    assert_eq!(areas, vec!["1", "2"]);
    assert!(outcome.database.skipped.is_empty());
}

#[test]
fn area_border_router_line_does_not_set_area() {
    let outcome = parse("OSPF Router with ID (1.1.1.1) (Process ID 1)\nArea Border Router\n2.2.2.2 10");
    assert_eq!(outcome.database.routers[0].area_id, "0");
}
