//! Turning dictionary JSON into identifier expressions.
//!
//! Each concept carries a `sources` object keyed by dataset. Every value is a
//! list of source items; an item contributes its `ids` (scalar or list), or
//! else its `regex`, or else its `val_var`. Anything else contributes nothing.

use clif_model::expression::TERM_SEPARATOR;
use clif_model::{ConceptEntry, IdentifierExpression, IdentifierTerm, SourceDataset};
use serde_json::{Map, Value};
use tracing::trace;

const SOURCES_KEY: &str = "sources";
const CONCEPTS_KEY: &str = "concepts";
const IDS_KEY: &str = "ids";
const REGEX_KEY: &str = "regex";
const VAL_VAR_KEY: &str = "val_var";

/// Build a concept entry from its JSON definition. The error string names
/// the offending field.
pub(crate) fn parse_concept(name: &str, value: &Value) -> Result<ConceptEntry, String> {
    let Value::Object(object) = value else {
        return Err(format!("expected an object, found {}", json_kind(value)));
    };

    let mut entry = ConceptEntry::new(name);
    entry.description = optional_string(object, "description")?;
    entry.category = optional_string(object, "category")?;

    match (object.get(SOURCES_KEY), object.get(CONCEPTS_KEY)) {
        (Some(sources), _) => {
            let Value::Object(sources) = sources else {
                return Err(format!(
                    "`sources` must be an object, found {}",
                    json_kind(sources)
                ));
            };
            for (key, items) in sources {
                let Some(dataset) = SourceDataset::from_source_key(key) else {
                    trace!(concept = name, source = %key, "ignoring unsupported source");
                    continue;
                };
                let expression =
                    expression_from_items(items).map_err(|reason| format!("{key}: {reason}"))?;
                entry.insert_source(dataset, expression);
            }
        }
        (None, Some(_)) => entry.derived = true,
        (None, None) => return Err("neither `sources` nor `concepts` present".to_string()),
    }

    Ok(entry)
}

/// Collect the terms of one dataset's source items, in item order.
pub fn expression_from_items(items: &Value) -> Result<IdentifierExpression, String> {
    let Value::Array(items) = items else {
        return Err(format!(
            "source items must be an array, found {}",
            json_kind(items)
        ));
    };
    let mut expression = IdentifierExpression::empty();
    for (idx, item) in items.iter().enumerate() {
        let Value::Object(item) = item else {
            return Err(format!("item {idx} must be an object"));
        };
        for term in item_terms(item).map_err(|reason| format!("item {idx}: {reason}"))? {
            expression.push(term);
        }
    }
    Ok(expression)
}

fn item_terms(item: &Map<String, Value>) -> Result<Vec<IdentifierTerm>, String> {
    if let Some(ids) = item.get(IDS_KEY).filter(|v| !v.is_null()) {
        let ids = match ids {
            Value::Array(values) => values.iter().map(id_text).collect::<Result<Vec<_>, _>>()?,
            scalar => vec![id_text(scalar)?],
        };
        let mut terms = Vec::with_capacity(ids.len());
        for id in ids {
            if id.is_empty() {
                trace!("ignoring empty id");
                continue;
            }
            terms.push(IdentifierTerm::Id(id));
        }
        return Ok(terms);
    }
    if let Some(pattern) = item.get(REGEX_KEY).filter(|v| !v.is_null()) {
        let Value::String(pattern) = pattern else {
            return Err(format!("`regex` must be a string, found {}", json_kind(pattern)));
        };
        return Ok(vec![IdentifierTerm::Pattern(pattern.clone())]);
    }
    if let Some(column) = item.get(VAL_VAR_KEY).filter(|v| !v.is_null()) {
        let Value::String(column) = column else {
            return Err(format!("`val_var` must be a string, found {}", json_kind(column)));
        };
        return Ok(vec![IdentifierTerm::Column(column.clone())]);
    }
    Ok(Vec::new())
}

/// Identifiers keep their JSON spelling: `211`, `"A12"`, `1.5`. String ids
/// are taken verbatim and must not contain the list separator.
fn id_text(value: &Value) -> Result<String, String> {
    match value {
        Value::Number(number) => Ok(number.to_string()),
        Value::String(text) if text.contains(TERM_SEPARATOR) => {
            Err(format!("id {text:?} contains the list separator"))
        }
        Value::String(text) => Ok(text.clone()),
        other => Err(format!("`ids` entries must be numbers or strings, found {}", json_kind(other))),
    }
}

fn optional_string(object: &Map<String, Value>, key: &str) -> Result<Option<String>, String> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.clone()).filter(|t| !t.trim().is_empty())),
        // Upstream dictionaries occasionally carry structured descriptions.
        Some(_) => Ok(None),
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
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
    use serde_json::json;

    use super::*;

    #[test]
    fn ids_take_precedence_over_regex() {
        let items = json!([{ "ids": [211, 220045], "regex": "ignored", "table": "chartevents" }]);
        let expression = expression_from_items(&items).unwrap();
        assert_eq!(expression.render(), "211; 220045");
    }

    #[test]
    fn scalar_ids_and_strings() {
        let items = json!([{ "ids": 711 }, { "ids": "A12" }]);
        assert_eq!(expression_from_items(&items).unwrap().render(), "711; A12");
    }

    #[test]
    fn string_ids_are_verbatim() {
        let items = json!([{ "ids": [" c ", "", "A12"] }]);
        let expression = expression_from_items(&items).unwrap();
        assert_eq!(expression.ids().collect::<Vec<_>>(), vec![" c ", "A12"]);
    }

    #[test]
    fn id_with_list_separator_is_rejected() {
        let items = json!([{ "ids": 1 }, { "ids": ["a; b", "c"] }]);
        let err = expression_from_items(&items).unwrap_err();
        assert!(err.starts_with("item 1:"), "{err}");
        assert!(err.contains("list separator"), "{err}");
    }

    #[test]
    fn regex_and_val_var_are_tagged() {
        let items = json!([
            { "regex": "^heart rate$", "table": "nursecharting" },
            { "val_var": "heartrate", "table": "vitalperiodic" },
            { "table": "vitalaperiodic" }
        ]);
        assert_eq!(
            expression_from_items(&items).unwrap().render(),
            "regex:^heart rate$; col:heartrate"
        );
    }

    #[test]
    fn wrong_types_are_reported() {
        assert!(expression_from_items(&json!({ "ids": 1 })).is_err());
        assert!(expression_from_items(&json!([{ "ids": [true] }])).is_err());
        assert!(expression_from_items(&json!([{ "regex": 4 }])).is_err());
        assert!(expression_from_items(&json!(["chartevents"])).is_err());
    }

    #[test]
    fn recursive_concepts_are_derived() {
        let value = json!({ "concepts": ["sbp", "dbp"], "description": "mean arterial pressure" });
        let entry = parse_concept("map_derived", &value).unwrap();
        assert!(entry.derived);
        assert_eq!(entry.dataset_count(), 0);
        assert_eq!(entry.description.as_deref(), Some("mean arterial pressure"));
    }

    #[test]
    fn unknown_sources_are_ignored() {
        let value = json!({ "sources": { "mimic_demo": [{ "ids": 1 }], "sic": [{ "ids": 711 }] } });
        let entry = parse_concept("hr", &value).unwrap();
        assert_eq!(entry.dataset_count(), 1);
        assert_eq!(entry.expression(SourceDataset::Sic).unwrap().render(), "711");
    }

    #[test]
    fn missing_sources_is_malformed() {
        let err = parse_concept("x", &json!({ "unit": "mg" })).unwrap_err();
        assert!(err.contains("sources"), "{err}");
    }
}
