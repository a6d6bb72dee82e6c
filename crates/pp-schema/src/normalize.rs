//! Envelope normalization.
//!
//! Stored documents come in more than one shape. Older producers wrote
//! `{router_lsas, network_lsas, summary_lsas}` with per-record field names
//! that drifted between releases (`router` vs `router_id`, `attached` vs
//! `attached_routers`, ...). The canonical shape is
//! `{routers, networks, summary, skipped}` with the field names of
//! `pp_core::lsa`.
//!
//! Every variant goes through the same alias tables: canonical field ->
//! accepted source keys, first present key wins. A new producer variant is a
//! table edit. Keys not named in a table are ignored.
//!
//! In a canonical document every non-null value counts as present, so empty
//! strings survive a second pass unchanged. Producer documents treat `""` and
//! `[]` as absent and fall through to the next alias. Area fields always keep
//! an explicit `""`.

use pp_core::{DEFAULT_AREA_ID, LsaDatabase, LsaKind};
use serde_json::{Map, Value};
use tracing::debug;

use crate::SchemaError;

/// How a source value is coerced into its canonical form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    /// String; numbers are stringified; absent -> "".
    Text,
    /// Like `Text`, absent -> the default area.
    Area,
    /// Non-negative integer; numeric strings accepted; absent -> 0.
    Metric,
    /// List of strings; a scalar becomes a one-element list; absent -> [].
    TextList,
    /// Like `TextList`, but omitted from the output when empty.
    OptionalTextList,
    /// List of line numbers; a scalar becomes a one-element list.
    LineList,
    /// Record type name, case-insensitive.
    Kind,
    /// Router links (objects, strings or numbers).
    Links,
}

/// When a source value counts as present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Presence {
    /// Anything but null, "" and [].
    Truthy,
    /// Anything but null.
    Defined,
}

impl Presence {
    fn accepts(self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null) => false,
            (Self::Truthy, Value::String(s)) => !s.is_empty(),
            (Self::Truthy, Value::Array(a)) => !a.is_empty(),
            _ => true,
        }
    }
}

struct FieldRule {
    canonical: &'static str,
    sources: &'static [&'static str],
    shape: Shape,
}

const fn rule(canonical: &'static str, sources: &'static [&'static str], shape: Shape) -> FieldRule {
    FieldRule {
        canonical,
        sources,
        shape,
    }
}

struct EnvelopeRule {
    canonical: &'static str,
    sources: &'static [&'static str],
    fields: &'static [FieldRule],
}

const ROUTER_FIELDS: &[FieldRule] = &[
    rule("router_id", &["router_id", "router", "id"], Shape::Text),
    rule("area_id", &["area_id", "area"], Shape::Area),
    rule("links", &["links"], Shape::Links),
];

const LINK_ID_SOURCES: &[&str] = &["link_id", "link"];

const LINK_FIELDS: &[FieldRule] = &[
    rule("link_id", LINK_ID_SOURCES, Shape::Text),
    rule("metric", &["metric", "cost"], Shape::Metric),
];

const NETWORK_FIELDS: &[FieldRule] = &[
    rule("network_id", &["network_id", "network"], Shape::Text),
    rule("attached_routers", &["attached_routers", "attached"], Shape::TextList),
    rule("area_id", &["area_id", "area"], Shape::Area),
];

const SUMMARY_FIELDS: &[FieldRule] = &[
    rule("prefix", &["link_id", "link", "prefix", "adv_router"], Shape::Text),
    rule("adv_router", &["adv_router", "adv", "advertising_router"], Shape::Text),
    rule("metric", &["metric", "cost"], Shape::Metric),
    rule("area_id", &["area_id", "area"], Shape::Area),
];

const SKIPPED_FIELDS: &[FieldRule] = &[
    rule("type", &["type", "lsa_type"], Shape::Kind),
    rule("lines", &["lines"], Shape::LineList),
    rule("reason", &["reason"], Shape::Text),
    rule("excerpt", &["excerpt"], Shape::OptionalTextList),
];

const ENVELOPE: &[EnvelopeRule] = &[
    EnvelopeRule {
        canonical: "routers",
        sources: &["router_lsas", "routers"],
        fields: ROUTER_FIELDS,
    },
    EnvelopeRule {
        canonical: "networks",
        sources: &["network_lsas", "networks"],
        fields: NETWORK_FIELDS,
    },
    EnvelopeRule {
        canonical: "summary",
        sources: &["summary_lsas", "summary", "summaries"],
        fields: SUMMARY_FIELDS,
    },
    EnvelopeRule {
        canonical: "skipped",
        sources: &["skipped_lsas", "skipped"],
        fields: SKIPPED_FIELDS,
    },
];

/// Known document shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeVariant {
    /// `{router_lsas, network_lsas, summary_lsas[, skipped_lsas]}`
    Producer,
    /// `{routers, networks, summary[, skipped]}`
    Canonical,
}

/// Which envelope a document uses, if any known key is present.
pub fn detect_variant(doc: &Value) -> Option<EnvelopeVariant> {
    let object = doc.as_object()?;
    let has_any = |keys: &[&str]| keys.iter().any(|k| object.contains_key(*k));
    if has_any(&["router_lsas", "network_lsas", "summary_lsas", "skipped_lsas"]) {
        Some(EnvelopeVariant::Producer)
    } else if has_any(&["routers", "networks", "summary", "skipped"]) {
        Some(EnvelopeVariant::Canonical)
    } else {
        None
    }
}

/// Normalize any known envelope into the canonical shape, as a JSON value.
///
/// Idempotent: a canonical document comes back structurally equal.
pub fn normalize_value(doc: &Value) -> Result<Value, SchemaError> {
    let object = doc.as_object().ok_or_else(|| SchemaError::Normalization {
        what: "document root is not an object".to_string(),
    })?;

    let variant = detect_variant(doc);
    debug!("Normalizing document ({variant:?})");
    let presence = match variant {
        Some(EnvelopeVariant::Canonical) => Presence::Defined,
        _ => Presence::Truthy,
    };

    let mut out = Map::new();
    for envelope in ENVELOPE {
        let records = match first_present(object, envelope.sources, Presence::Truthy) {
            None => Vec::new(),
            Some((key, Value::Array(items))) => items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    normalize_record(item, envelope.fields, presence, &format!("{key}[{i}]"))
                })
                .collect::<Result<Vec<_>, _>>()?,
            Some((key, other)) => {
                return Err(SchemaError::Normalization {
                    what: format!("{key}: expected an array, found {}", type_name(other)),
                });
            }
        };
        out.insert(envelope.canonical.to_string(), Value::Array(records));
    }

    Ok(Value::Object(out))
}

/// Normalize any known envelope straight into typed records.
pub fn normalize(doc: &Value) -> Result<LsaDatabase, SchemaError> {
    let canonical = normalize_value(doc)?;
    Ok(serde_json::from_value(canonical)?)
}

fn normalize_record(
    item: &Value,
    fields: &[FieldRule],
    presence: Presence,
    path: &str,
) -> Result<Value, SchemaError> {
    let object = item.as_object().ok_or_else(|| SchemaError::Normalization {
        what: format!("{path}: expected an object, found {}", type_name(item)),
    })?;

    let mut out = Map::new();
    for field in fields {
        let source = match field.shape {
            Shape::Area => first_present(object, field.sources, Presence::Defined),
            _ => first_present(object, field.sources, presence),
        };
        let field_path = format!("{path}.{}", field.canonical);
        let value = match field.shape {
            Shape::Text => Value::String(coerce_text(source, &field_path)?.unwrap_or_default()),
            Shape::Area => Value::String(
                coerce_text(source, &field_path)?.unwrap_or_else(|| DEFAULT_AREA_ID.to_string()),
            ),
            Shape::Metric => Value::from(coerce_metric(source, &field_path)?),
            Shape::TextList => Value::from(coerce_text_list(source, &field_path)?),
            Shape::OptionalTextList => {
                let list = coerce_text_list(source, &field_path)?;
                if list.is_empty() {
                    continue;
                }
                Value::from(list)
            }
            Shape::LineList => Value::from(coerce_line_list(source, &field_path)?),
            Shape::Kind => Value::String(coerce_kind(source, &field_path)?),
            Shape::Links => Value::Array(coerce_links(source, presence, &field_path)?),
        };
        out.insert(field.canonical.to_string(), value);
    }

    Ok(Value::Object(out))
}

/// First source key holding a value `presence` accepts.
fn first_present<'a>(
    object: &'a Map<String, Value>,
    sources: &[&'static str],
    presence: Presence,
) -> Option<(&'static str, &'a Value)> {
    sources.iter().find_map(|key| {
        let value = object.get(*key)?;
        presence.accepts(value).then_some((*key, value))
    })
}

fn coerce_text(
    source: Option<(&str, &Value)>,
    path: &str,
) -> Result<Option<String>, SchemaError> {
    match source {
        None => Ok(None),
        Some((_, value)) => scalar_text(value)
            .map(Some)
            .ok_or_else(|| mismatch(path, "a string", value)),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn coerce_metric(source: Option<(&str, &Value)>, path: &str) -> Result<u32, SchemaError> {
    let Some((_, value)) = source else {
        return Ok(0);
    };
    let parsed = match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) if s.bytes().all(|b| b.is_ascii_digit()) => s.parse().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| mismatch(path, "a non-negative integer", value))
}

fn coerce_text_list(
    source: Option<(&str, &Value)>,
    path: &str,
) -> Result<Vec<String>, SchemaError> {
    let Some((_, value)) = source else {
        return Ok(Vec::new());
    };
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| scalar_text(item).ok_or_else(|| mismatch(path, "a list of strings", item)))
            .collect(),
        other => scalar_text(other)
            .map(|s| vec![s])
            .ok_or_else(|| mismatch(path, "a string or list of strings", other)),
    }
}

fn coerce_line_list(
    source: Option<(&str, &Value)>,
    path: &str,
) -> Result<Vec<u64>, SchemaError> {
    let Some((_, value)) = source else {
        return Ok(Vec::new());
    };
    let items: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };
    items
        .into_iter()
        .map(|item| {
            item.as_u64()
                .ok_or_else(|| mismatch(path, "a list of line numbers", item))
        })
        .collect()
}

fn coerce_kind(source: Option<(&str, &Value)>, path: &str) -> Result<String, SchemaError> {
    let name = coerce_text(source, path)?.unwrap_or_default();
    LsaKind::from_name(&name)
        .map(|kind| kind.as_str().to_string())
        .ok_or_else(|| SchemaError::Normalization {
            what: format!("{path}: unknown record type {name:?}"),
        })
}

fn coerce_links(
    source: Option<(&str, &Value)>,
    presence: Presence,
    path: &str,
) -> Result<Vec<Value>, SchemaError> {
    let Some((_, value)) = source else {
        return Ok(Vec::new());
    };
    let items: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            let item_path = format!("{path}[{i}]");
            match item {
                Value::Object(fields) => {
                    let mut link = normalize_record(item, LINK_FIELDS, presence, &item_path)?;
                    // No identifier key: the raw link text stands in for it.
                    if first_present(fields, LINK_ID_SOURCES, presence).is_none() {
                        link["link_id"] = Value::String(item.to_string());
                    }
                    Ok(link)
                }
                other => {
                    let link_id = scalar_text(other)
                        .ok_or_else(|| mismatch(&item_path, "a link object or string", other))?;
                    Ok(serde_json::json!({ "link_id": link_id, "metric": 0 }))
                }
            }
        })
        .collect()
}

fn mismatch(path: &str, expected: &str, found: &Value) -> SchemaError {
    SchemaError::Normalization {
        what: format!("{path}: expected {expected}, found {}", type_name(found)),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pp_core::{LinkRef, MalformedRecord, NetworkLsa, RouterLsa, SummaryLsa};
    use proptest::prelude::*;
    use serde_json::json;

    fn sample_database() -> LsaDatabase {
        LsaDatabase {
            routers: vec![RouterLsa {
                router_id: "1.1.1.1".into(),
                area_id: "0".into(),
                links: vec![LinkRef {
                    link_id: "2.2.2.2".into(),
                    metric: 10,
                }],
            }],
            networks: vec![NetworkLsa {
                network_id: "10.0.0.2".into(),
                attached_routers: vec!["2.2.2.2".into()],
                area_id: "0".into(),
            }],
            summaries: vec![SummaryLsa {
                adv_router: "1.1.1.1".into(),
                prefix: "10.1.0.0".into(),
                metric: 20,
                area_id: "1".into(),
            }],
            skipped: vec![
                MalformedRecord::new(LsaKind::Network, vec![7], "Insufficient columns")
                    .with_excerpt(vec!["10.0.0.0".into()]),
            ],
        }
    }

    #[test]
    fn canonical_document_is_unchanged() {
        let canonical = serde_json::to_value(sample_database()).unwrap();
        assert_eq!(detect_variant(&canonical), Some(EnvelopeVariant::Canonical));
        assert_eq!(normalize_value(&canonical).unwrap(), canonical);
    }

    #[test]
    fn producer_aliases_are_resolved() {
        let doc = json!({
            "router_lsas": [
                {"router": "1.1.1.1", "links": ["Link connected to: a Stub Network", {"link": "3.3.3.3", "metric": "5"}]}
            ],
            "network_lsas": [
                {"network": "10.0.0.2", "attached": "2.2.2.2"},
                {"network_id": "10.0.0.3"}
            ],
            "summary_lsas": [
                {"link_id": "10.1.0.0", "adv": "1.1.1.1", "metric": 20},
                {"adv_router": "4.4.4.4"}
            ]
        });
        assert_eq!(detect_variant(&doc), Some(EnvelopeVariant::Producer));

        let db = normalize(&doc).unwrap();
        assert_eq!(db.routers[0].router_id, "1.1.1.1");
        assert_eq!(db.routers[0].area_id, DEFAULT_AREA_ID);
        assert_eq!(db.routers[0].links[0].link_id, "Link connected to: a Stub Network");
        assert_eq!(db.routers[0].links[1].link_id, "3.3.3.3");
        assert_eq!(db.routers[0].links[1].metric, 5);

        assert_eq!(db.networks[0].attached_routers, vec!["2.2.2.2".to_string()]);
        assert!(db.networks[1].attached_routers.is_empty());

        assert_eq!(db.summaries[0].prefix, "10.1.0.0");
        assert_eq!(db.summaries[0].adv_router, "1.1.1.1");
        // adv_router doubles as the prefix when nothing else names it
        assert_eq!(db.summaries[1].prefix, "4.4.4.4");
        assert!(db.skipped.is_empty());
    }

    #[test]
    fn first_alias_wins_and_empty_values_fall_through() {
        let doc = json!({
            "router_lsas": [{"router_id": "", "router": "9.9.9.9", "id": "ignored"}]
        });
        let db = normalize(&doc).unwrap();
        assert_eq!(db.routers[0].router_id, "9.9.9.9");
    }

    #[test]
    fn canonical_empty_values_are_kept() {
        let doc = json!({
            "routers": [{"router_id": "", "area_id": "", "links": [{"link_id": "", "metric": 0}]}],
            "summary": [{"adv_router": "1.1.1.1", "prefix": "", "metric": 0, "area_id": ""}]
        });
        let db = normalize(&doc).unwrap();
        assert_eq!(db.routers[0].area_id, "");
        assert_eq!(db.routers[0].links[0].link_id, "");
        assert_eq!(db.summaries[0].prefix, "");
        assert_eq!(db.summaries[0].area_id, "");
    }

    #[test]
    fn explicit_empty_area_is_not_defaulted() {
        let doc = json!({
            "network_lsas": [{"network_id": "10.0.0.1", "area_id": ""}, {"network_id": "10.0.0.2"}]
        });
        let db = normalize(&doc).unwrap();
        assert_eq!(db.networks[0].area_id, "");
        assert_eq!(db.networks[1].area_id, DEFAULT_AREA_ID);
    }

    #[test]
    fn missing_identifier_becomes_empty() {
        let db = normalize(&json!({"routers": [{"links": []}]})).unwrap();
        assert_eq!(db.routers[0].router_id, "");
    }

    #[test]
    fn link_object_without_identifier_is_stringified() {
        let db = normalize(&json!({"routers": [{"router_id": "1.1.1.1", "links": [{"kind": "stub"}]}]}))
            .unwrap();
        assert_eq!(db.routers[0].links[0].link_id, r#"{"kind":"stub"}"#);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let doc = json!({
            "generator": "v1.11",
            "network_lsas": [{"network_id": "10.0.0.1", "attached": ["1.1.1.1"], "age": 812}]
        });
        let db = normalize(&doc).unwrap();
        assert_eq!(db.networks.len(), 1);
    }

    #[test]
    fn skipped_entries_are_normalized() {
        let doc = json!({
            "skipped_lsas": [{"type": "router", "lines": [3, 4], "reason": "Missing router ID"}]
        });
        let db = normalize(&doc).unwrap();
        assert_eq!(db.skipped[0].lsa_type, LsaKind::Router);
        assert_eq!(db.skipped[0].lines, vec![3, 4]);
    }

    #[test]
    fn wrong_shapes_are_errors() {
        assert!(normalize_value(&json!([])).is_err());
        assert!(normalize_value(&json!({"router_lsas": {"router_id": "1"}})).is_err());
        assert!(normalize_value(&json!({"router_lsas": [{"router_id": {"a": 1}}]})).is_err());
        assert!(normalize_value(&json!({"summary_lsas": [{"metric": -1}]})).is_err());
        assert!(normalize_value(&json!({"skipped_lsas": [{"type": "external"}]})).is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn canonical_input_is_a_fixed_point(
            router_id in "[0-9.]{0,7}",
            area_id in "[0-9.]{0,7}",
            link_id in "[0-9.]{0,7}",
            prefix in "[0-9.]{0,7}",
            attached in prop::collection::vec("[0-9.]{0,7}", 0..3),
            metric in 0u32..100_000,
        ) {
            let db = LsaDatabase {
                routers: vec![RouterLsa {
                    router_id: router_id.clone(),
                    area_id: area_id.clone(),
                    links: vec![LinkRef { link_id, metric }],
                }],
                networks: vec![NetworkLsa {
                    network_id: router_id.clone(),
                    attached_routers: attached,
                    area_id: area_id.clone(),
                }],
                summaries: vec![SummaryLsa {
                    adv_router: router_id,
                    prefix,
                    metric,
                    area_id,
                }],
                skipped: vec![],
            };
            let canonical = serde_json::to_value(&db).unwrap();
            prop_assert_eq!(&normalize_value(&canonical).unwrap(), &canonical);
            prop_assert_eq!(normalize(&canonical).unwrap(), db);
        }

        #[test]
        fn normalization_is_idempotent(
            router_id in "[0-9.]{0,15}",
            metric in 0u32..100_000,
            attached in prop::collection::vec("[0-9.]{1,15}", 0..4),
        ) {
            let doc = json!({
                "router_lsas": [{"router": router_id, "links": [{"link": "x", "cost": metric}]}],
                "network_lsas": [{"network": "n", "attached": attached}],
            });
            let once = normalize_value(&doc).unwrap();
            let twice = normalize_value(&once).unwrap();
            prop_assert_eq!(once, twice);
        }
    }
}
