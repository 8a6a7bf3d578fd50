//! Mapping coverage statistics.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::dataset::SourceDataset;
use crate::domain::ClinicalDomain;
use crate::mapping::MappingTable;

pub const COVERAGE_SCHEMA: &str = "openclif.coverage";
pub const COVERAGE_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainCoverage {
    pub domain: ClinicalDomain,
    pub total: usize,
    /// Categories the crosswalk links to a concept.
    pub concept_linked: usize,
    /// Categories with at least one dataset identifier.
    pub with_identifiers: usize,
    /// Populated cells per dataset, keyed by output column name.
    pub per_dataset: BTreeMap<String, usize>,
    /// Categories with no identifier in any dataset, in table order.
    pub unmapped: Vec<String>,
}

impl DomainCoverage {
    pub fn from_table(table: &MappingTable) -> Self {
        let mut per_dataset: BTreeMap<String, usize> = SourceDataset::ALL
            .iter()
            .map(|dataset| (dataset.column_name().to_string(), 0))
            .collect();
        let mut concept_linked = 0;
        let mut with_identifiers = 0;
        let mut unmapped = Vec::new();
        for row in &table.rows {
            if row.concept.as_deref().is_some_and(|c| !c.is_empty()) {
                concept_linked += 1;
            }
            if row.has_identifiers() {
                with_identifiers += 1;
            } else {
                unmapped.push(row.category.name.clone());
            }
            for dataset in row.identifiers.keys() {
                *per_dataset
                    .entry(dataset.column_name().to_string())
                    .or_insert(0) += 1;
            }
        }
        Self {
            domain: table.domain,
            total: table.rows.len(),
            concept_linked,
            with_identifiers,
            per_dataset,
            unmapped,
        }
    }

    /// Share of categories linked to a concept, as a whole percentage.
    pub fn linked_percent(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        ((self.concept_linked as f64 / self.total as f64) * 100.0).round() as u32
    }

    pub fn dataset_count(&self, dataset: SourceDataset) -> usize {
        self.per_dataset
            .get(dataset.column_name())
            .copied()
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageReport {
    pub schema: String,
    pub schema_version: u32,
    pub domains: Vec<DomainCoverage>,
}

impl CoverageReport {
    pub fn from_tables<'a, I>(tables: I) -> Self
    where
        I: IntoIterator<Item = &'a MappingTable>,
    {
        Self {
            schema: COVERAGE_SCHEMA.to_string(),
            schema_version: COVERAGE_SCHEMA_VERSION,
            domains: tables.into_iter().map(MappingTable::coverage).collect(),
        }
    }

    pub fn total_categories(&self) -> usize {
        self.domains.iter().map(|d| d.total).sum()
    }
}
