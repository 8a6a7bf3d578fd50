use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::dataset::SourceDataset;
use crate::expression::IdentifierExpression;

/// One concept of the upstream concept dictionary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptEntry {
    pub name: String,
    pub description: Option<String>,
    /// Upstream grouping (e.g. "vitals", "chemistry").
    pub category: Option<String>,
    /// True for concepts derived from other concepts; they carry no
    /// per-dataset identifiers of their own.
    pub derived: bool,
    /// Non-empty expressions only; an absent dataset means "no mapping".
    pub sources: BTreeMap<SourceDataset, IdentifierExpression>,
}

impl ConceptEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Attach an expression for a dataset. Empty expressions are dropped.
    #[must_use]
    pub fn with_source(mut self, dataset: SourceDataset, expression: IdentifierExpression) -> Self {
        self.insert_source(dataset, expression);
        self
    }

    pub fn insert_source(&mut self, dataset: SourceDataset, expression: IdentifierExpression) {
        if expression.is_empty() {
            self.sources.remove(&dataset);
        } else {
            self.sources.insert(dataset, expression);
        }
    }

    pub fn expression(&self, dataset: SourceDataset) -> Option<&IdentifierExpression> {
        self.sources.get(&dataset)
    }

    /// Number of datasets with at least one identifier term.
    pub fn dataset_count(&self) -> usize {
        self.sources.len()
    }
}
