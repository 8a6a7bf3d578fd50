//! Output rows of the mapping tables.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::category::{Category, definition_cell, normalize_category_key};
use crate::coverage::DomainCoverage;
use crate::dataset::SourceDataset;
use crate::domain::ClinicalDomain;
use crate::expression::IdentifierExpression;

/// Column carrying the resolved concept name.
pub const CONCEPT_COLUMN: &str = "ricu_concept";

/// True for the concept and dataset columns the builder appends. A
/// definition table that already carries them must not repeat them.
pub fn is_output_column(name: &str) -> bool {
    name == CONCEPT_COLUMN
        || SourceDataset::ALL
            .iter()
            .any(|dataset| dataset.column_name() == name)
}

/// One category with its resolved identifiers for every dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingRow {
    pub category: Category,
    /// Concept named by the crosswalk, whether or not the dictionary has it.
    pub concept: Option<String>,
    /// Non-empty expressions only.
    pub identifiers: BTreeMap<SourceDataset, IdentifierExpression>,
}

impl MappingRow {
    /// Row with every dataset column empty.
    pub fn unmapped(category: Category, concept: Option<String>) -> Self {
        Self {
            category,
            concept,
            identifiers: BTreeMap::new(),
        }
    }

    pub fn identifier(&self, dataset: SourceDataset) -> Option<&IdentifierExpression> {
        self.identifiers.get(&dataset)
    }

    /// Rendered cell for a dataset column (empty when unmapped).
    pub fn rendered(&self, dataset: SourceDataset) -> String {
        self.identifier(dataset)
            .map(IdentifierExpression::render)
            .unwrap_or_default()
    }

    pub fn has_identifiers(&self) -> bool {
        !self.identifiers.is_empty()
    }
}

/// The mapping table of one domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingTable {
    pub domain: ClinicalDomain,
    /// Definition-table columns, in source order.
    pub columns: Vec<String>,
    pub rows: Vec<MappingRow>,
}

impl MappingTable {
    pub fn new(domain: ClinicalDomain, columns: Vec<String>) -> Self {
        Self {
            domain,
            columns,
            rows: Vec::new(),
        }
    }

    /// Definition columns, minus any generated column carried over from a
    /// previously built table.
    pub fn definition_columns(&self) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .map(String::as_str)
            .filter(|column| !is_output_column(column))
    }

    /// Full header: definition columns, concept column, dataset columns.
    pub fn header(&self) -> Vec<String> {
        let mut header: Vec<String> = self.definition_columns().map(ToString::to_string).collect();
        header.push(CONCEPT_COLUMN.to_string());
        header.extend(
            SourceDataset::ALL
                .iter()
                .map(|dataset| dataset.column_name().to_string()),
        );
        header
    }

    /// Cells of a row, aligned with [`MappingTable::header`].
    pub fn record(&self, row: &MappingRow) -> Vec<String> {
        let mut record: Vec<String> = self
            .definition_columns()
            .map(|column| definition_cell(self.domain, &row.category, column))
            .collect();
        record.push(row.concept.clone().unwrap_or_default());
        record.extend(SourceDataset::ALL.iter().map(|dataset| row.rendered(*dataset)));
        record
    }

    pub fn find(&self, category: &str) -> Option<&MappingRow> {
        let key = normalize_category_key(category);
        self.rows.iter().find(|row| row.category.lookup_key() == key)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn coverage(&self) -> DomainCoverage {
        DomainCoverage::from_table(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_columns_are_not_repeated() {
        let mut table = MappingTable::new(
            ClinicalDomain::Vitals,
            vec![
                "vital_category".to_string(),
                "description".to_string(),
                "ricu_concept".to_string(),
                "sic_ids".to_string(),
            ],
        );
        let category = Category::new("heart_rate", "Heart rate")
            .unwrap()
            .with_attribute("ricu_concept", "old")
            .with_attribute("sic_ids", "999");
        let mut row = MappingRow::unmapped(category, Some("hr".to_string()));
        row.identifiers
            .insert(SourceDataset::Sic, IdentifierExpression::from_ids(["711"]));
        table.rows.push(row);

        let header = table.header();
        assert_eq!(header.iter().filter(|h| *h == CONCEPT_COLUMN).count(), 1);
        assert_eq!(header.iter().filter(|h| *h == "sic_ids").count(), 1);
        assert_eq!(
            table.record(&table.rows[0]),
            vec!["heart_rate", "Heart rate", "hr", "", "", "", "", "", "711"]
        );
    }
}
