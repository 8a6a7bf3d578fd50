//! In-memory concept dictionary.

use std::collections::BTreeMap;
use std::path::Path;

use clif_model::ConceptEntry;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{MapError, Result};
use crate::extract::{json_kind, parse_concept};

/// Concepts keyed by name, plus the concepts that failed to parse.
///
/// Malformed concepts are kept aside instead of failing the load: only a
/// lookup of such a concept is an error.
#[derive(Debug, Clone, Default)]
pub struct ConceptDictionary {
    entries: BTreeMap<String, ConceptEntry>,
    malformed: BTreeMap<String, String>,
}

impl ConceptDictionary {
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| MapError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let value: Value = serde_json::from_str(&text).map_err(|source| MapError::InvalidJson {
            origin: path.display().to_string(),
            source,
        })?;
        let dictionary = Self::from_value(&value)?;
        info!(
            path = %path.display(),
            concepts = dictionary.len(),
            malformed = dictionary.malformed.len(),
            "loaded concept dictionary"
        );
        Ok(dictionary)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text).map_err(|source| MapError::InvalidJson {
            origin: "<inline>".to_string(),
            source,
        })?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self> {
        let Value::Object(concepts) = value else {
            return Err(MapError::InvalidRoot {
                found: json_kind(value),
            });
        };

        let mut dictionary = Self::default();
        for (name, definition) in concepts {
            match parse_concept(name, definition) {
                Ok(entry) => {
                    dictionary.entries.insert(name.clone(), entry);
                }
                Err(reason) => {
                    debug!(concept = %name, reason = %reason, "malformed concept");
                    dictionary.malformed.insert(name.clone(), reason);
                }
            }
        }
        if !dictionary.malformed.is_empty() {
            warn!(
                count = dictionary.malformed.len(),
                "concept dictionary contains malformed concepts"
            );
        }
        Ok(dictionary)
    }

    /// Look up a concept. Absent concepts are `Ok(None)`; malformed ones fail.
    pub fn resolve(&self, name: &str) -> Result<Option<&ConceptEntry>> {
        if let Some(reason) = self.malformed.get(name) {
            return Err(MapError::MalformedDictionary {
                concept: name.to_string(),
                reason: reason.clone(),
            });
        }
        Ok(self.entries.get(name))
    }

    pub fn get(&self, name: &str) -> Option<&ConceptEntry> {
        self.entries.get(name)
    }

    pub fn insert(&mut self, entry: ConceptEntry) {
        self.malformed.remove(&entry.name);
        self.entries.insert(entry.name.clone(), entry);
    }

    /// Names of malformed concepts with the reason each was rejected.
    pub fn malformed(&self) -> impl Iterator<Item = (&str, &str)> {
        self.malformed
            .iter()
            .map(|(name, reason)| (name.as_str(), reason.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn concepts(&self) -> impl Iterator<Item = &ConceptEntry> {
        self.entries.values()
    }
}

impl FromIterator<ConceptEntry> for ConceptDictionary {
    fn from_iter<I: IntoIterator<Item = ConceptEntry>>(iter: I) -> Self {
        let mut dictionary = Self::default();
        for entry in iter {
            dictionary.insert(entry);
        }
        dictionary
    }
}

#[cfg(test)]
mod tests {
    use clif_model::SourceDataset;

    use super::*;

    const DICT: &str = r#"{
        "hr": {
            "description": "heart rate",
            "category": "vitals",
            "sources": {
                "sic": [{ "ids": 711, "table": "data_float_h" }],
                "hirid": [{ "ids": 200, "table": "observations" }]
            }
        },
        "broken": { "sources": { "mimic": "chartevents" } },
        "map": { "concepts": ["sbp", "dbp"] }
    }"#;

    #[test]
    fn loads_entries_and_tracks_malformed() {
        let dictionary = ConceptDictionary::from_json_str(DICT).unwrap();
        assert_eq!(dictionary.len(), 2);
        let hr = dictionary.resolve("hr").unwrap().unwrap();
        assert_eq!(hr.expression(SourceDataset::Sic).unwrap().render(), "711");
        assert_eq!(hr.expression(SourceDataset::Hirid).unwrap().render(), "200");
        assert!(hr.expression(SourceDataset::Mimic).is_none());
        assert_eq!(dictionary.malformed().count(), 1);
    }

    #[test]
    fn resolving_malformed_concept_fails() {
        let dictionary = ConceptDictionary::from_json_str(DICT).unwrap();
        match dictionary.resolve("broken") {
            Err(MapError::MalformedDictionary { concept, reason }) => {
                assert_eq!(concept, "broken");
                assert!(reason.starts_with("mimic:"), "{reason}");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn absent_concept_is_not_an_error() {
        let dictionary = ConceptDictionary::from_json_str(DICT).unwrap();
        assert!(dictionary.resolve("ldh").unwrap().is_none());
    }

    #[test]
    fn root_must_be_an_object() {
        let err = ConceptDictionary::from_json_str("[1, 2]").unwrap_err();
        assert!(matches!(err, MapError::InvalidRoot { found: "an array" }));
    }

    #[test]
    fn invalid_json_is_reported() {
        let err = ConceptDictionary::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, MapError::InvalidJson { .. }));
    }
}
