//! Per-dataset lookup from source identifiers to CLIF categories.
//!
//! An ETL step reading one dataset needs the reverse direction of the mapping
//! tables: given an item id, a label or a column name, which category does it
//! feed? Exact ids and column names are matched literally after trimming;
//! labels are matched against the `regex:` patterns, ignoring case.

use std::collections::BTreeMap;

use clif_model::{ClinicalDomain, IdentifierTerm, MappingTable, SourceDataset};
use regex::{Regex, RegexBuilder};
use serde::Serialize;
use tracing::warn;

/// How a source value matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Id,
    Column,
    Pattern,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct IndexTarget {
    pub domain: ClinicalDomain,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexHit {
    pub value: String,
    pub kind: MatchKind,
    pub target: IndexTarget,
}

#[derive(Debug)]
struct PatternEntry {
    source: String,
    regex: Regex,
    target: IndexTarget,
}

#[derive(Debug)]
pub struct SourceIndex {
    dataset: SourceDataset,
    ids: BTreeMap<String, Vec<IndexTarget>>,
    columns: BTreeMap<String, Vec<IndexTarget>>,
    patterns: Vec<PatternEntry>,
}

impl SourceIndex {
    pub fn new(dataset: SourceDataset) -> Self {
        Self {
            dataset,
            ids: BTreeMap::new(),
            columns: BTreeMap::new(),
            patterns: Vec::new(),
        }
    }

    pub fn from_tables<'a, I>(dataset: SourceDataset, tables: I) -> Self
    where
        I: IntoIterator<Item = &'a MappingTable>,
    {
        let mut index = Self::new(dataset);
        for table in tables {
            index.add_table(table);
        }
        index
    }

    pub fn add_table(&mut self, table: &MappingTable) {
        for row in &table.rows {
            let Some(expression) = row.identifier(self.dataset) else {
                continue;
            };
            let target = IndexTarget {
                domain: table.domain,
                category: row.category.name.clone(),
            };
            for term in expression.terms() {
                match term {
                    IdentifierTerm::Id(id) => push_target(&mut self.ids, id.trim(), &target),
                    IdentifierTerm::Column(column) => {
                        push_target(&mut self.columns, column.trim(), &target);
                    }
                    IdentifierTerm::Pattern(pattern) => {
                        match RegexBuilder::new(pattern).case_insensitive(true).build() {
                            Ok(regex) => self.patterns.push(PatternEntry {
                                source: pattern.clone(),
                                regex,
                                target: target.clone(),
                            }),
                            Err(err) => warn!(
                                dataset = %self.dataset,
                                category = %target.category,
                                pattern = %pattern,
                                error = %err,
                                "skipping invalid pattern"
                            ),
                        }
                    }
                }
            }
        }
    }

    pub fn dataset(&self) -> SourceDataset {
        self.dataset
    }

    /// Every way `value` maps to a category: exact ids, then columns, then
    /// patterns (in table order).
    pub fn lookup(&self, value: &str) -> Vec<IndexHit> {
        let value = value.trim();
        let mut hits = Vec::new();
        for (kind, map) in [(MatchKind::Id, &self.ids), (MatchKind::Column, &self.columns)] {
            if let Some(targets) = map.get(value) {
                hits.extend(targets.iter().map(|target| IndexHit {
                    value: value.to_string(),
                    kind,
                    target: target.clone(),
                }));
            }
        }
        hits.extend(
            self.patterns
                .iter()
                .filter(|entry| entry.regex.is_match(value))
                .map(|entry| IndexHit {
                    value: entry.source.clone(),
                    kind: MatchKind::Pattern,
                    target: entry.target.clone(),
                }),
        );
        hits
    }

    /// Exact identifiers with their categories, sorted by identifier.
    pub fn ids(&self) -> impl Iterator<Item = (&str, &[IndexTarget])> {
        self.ids.iter().map(|(id, targets)| (id.as_str(), targets.as_slice()))
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &[IndexTarget])> {
        self.columns
            .iter()
            .map(|(column, targets)| (column.as_str(), targets.as_slice()))
    }

    pub fn patterns(&self) -> impl Iterator<Item = (&str, &IndexTarget)> {
        self.patterns
            .iter()
            .map(|entry| (entry.source.as_str(), &entry.target))
    }

    pub fn len(&self) -> usize {
        self.ids.len() + self.columns.len() + self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn push_target(map: &mut BTreeMap<String, Vec<IndexTarget>>, key: &str, target: &IndexTarget) {
    if key.is_empty() {
        return;
    }
    let targets = map.entry(key.to_string()).or_default();
    if !targets.contains(target) {
        targets.push(target.clone());
    }
}

#[cfg(test)]
mod tests {
    use clif_model::{Category, IdentifierExpression, MappingRow};

    use super::*;

    fn table() -> MappingTable {
        let mut table = MappingTable::new(ClinicalDomain::Vitals, Vec::new());
        let mut hr = MappingRow::unmapped(Category::new("heart_rate", "Heart rate").unwrap(), None);
        hr.identifiers.insert(
            SourceDataset::Eicu,
            IdentifierExpression::parse("col:heartrate; regex:^heart rate$; regex:(unclosed"),
        );
        hr.identifiers
            .insert(SourceDataset::Sic, IdentifierExpression::parse("711; 712"));
        table.rows.push(hr);
        table
    }

    #[test]
    fn exact_ids_resolve() {
        let index = SourceIndex::from_tables(SourceDataset::Sic, [&table()]);
        let hits = index.lookup(" 712 ");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].kind, MatchKind::Id);
        assert_eq!(hits[0].target.category, "heart_rate");
        assert!(index.lookup("7").is_empty());
    }

    #[test]
    fn patterns_ignore_case_and_invalid_ones_are_skipped() {
        let index = SourceIndex::from_tables(SourceDataset::Eicu, [&table()]);
        assert_eq!(index.patterns().count(), 1);
        let hits = index.lookup("Heart Rate");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].kind, MatchKind::Pattern);
        assert_eq!(hits[0].value, "^heart rate$");
    }

    #[test]
    fn columns_resolve() {
        let index = SourceIndex::from_tables(SourceDataset::Eicu, [&table()]);
        let hits = index.lookup("heartrate");
        assert_eq!(hits[0].kind, MatchKind::Column);
    }
}
