//! CLIF category to concept-dictionary crosswalk.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::category::normalize_category_key;
use crate::error::{ModelError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrosswalkEntry {
    pub category: String,
    /// `None` marks a category that is intentionally left unmapped.
    pub concept: Option<String>,
    pub notes: Option<String>,
}

impl CrosswalkEntry {
    pub fn linked(category: impl Into<String>, concept: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            concept: Some(concept.into()),
            notes: None,
        }
    }

    pub fn unmapped(category: impl Into<String>, notes: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            concept: None,
            notes: Some(notes.into()),
        }
    }
}

/// Lookup from category name (case-insensitive) to concept name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crosswalk {
    entries: BTreeMap<String, CrosswalkEntry>,
}

impl Crosswalk {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = CrosswalkEntry>,
    {
        let mut crosswalk = Self::new();
        for entry in entries {
            crosswalk.insert(entry)?;
        }
        Ok(crosswalk)
    }

    pub fn insert(&mut self, entry: CrosswalkEntry) -> Result<()> {
        let key = normalize_category_key(&entry.category);
        if self.entries.contains_key(&key) {
            return Err(ModelError::DuplicateCrosswalkEntry(entry.category));
        }
        self.entries.insert(key, entry);
        Ok(())
    }

    pub fn entry(&self, category: &str) -> Option<&CrosswalkEntry> {
        self.entries.get(&normalize_category_key(category))
    }

    /// Concept linked to a category, if any.
    pub fn concept_for(&self, category: &str) -> Option<&str> {
        self.entry(category).and_then(|entry| entry.concept.as_deref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries ordered by normalized category name.
    pub fn iter(&self) -> impl Iterator<Item = &CrosswalkEntry> {
        self.entries.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_ignores_case_and_whitespace() {
        let crosswalk = Crosswalk::from_entries([
            CrosswalkEntry::linked("heart_rate", "hr"),
            CrosswalkEntry::unmapped("propofol", "sedatives not tracked by rate"),
        ])
        .unwrap();
        assert_eq!(crosswalk.concept_for(" Heart_Rate"), Some("hr"));
        assert_eq!(crosswalk.concept_for("propofol"), None);
        assert!(crosswalk.entry("propofol").is_some());
        assert!(crosswalk.entry("sbp").is_none());
    }

    #[test]
    fn rejects_duplicate_categories() {
        let err = Crosswalk::from_entries([
            CrosswalkEntry::linked("glucose_serum", "glu"),
            CrosswalkEntry::linked("GLUCOSE_SERUM", "glu"),
        ])
        .unwrap_err();
        assert_eq!(err, ModelError::DuplicateCrosswalkEntry("GLUCOSE_SERUM".to_string()));
    }
}
