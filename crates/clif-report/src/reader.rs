//! Reading emitted mapping tables back into memory.

use std::path::Path;

use clif_model::category::split_examples;
use clif_model::{
    CONCEPT_COLUMN, Category, ClinicalDomain, DESCRIPTION_COLUMN, IdentifierExpression,
    MappingRow, MappingTable, SourceDataset,
};

use crate::error::{ReportError, Result};

pub fn read_mapping_table(path: &Path, domain: ClinicalDomain) -> Result<MappingTable> {
    let bytes = std::fs::read(path).map_err(|e| ReportError::io("read", path, e))?;
    read_mapping_bytes(&bytes, path, domain)
}

/// Read every domain table present under `mappings_dir`. Missing tables are
/// skipped.
pub fn read_mapping_dir(
    mappings_dir: &Path,
    domains: &[ClinicalDomain],
) -> Result<Vec<MappingTable>> {
    let mut tables = Vec::new();
    for domain in domains {
        let path = mappings_dir.join(domain.table_path());
        if path.is_file() {
            tables.push(read_mapping_table(&path, *domain)?);
        } else {
            tracing::debug!(path = %path.display(), "mapping table not present");
        }
    }
    Ok(tables)
}

pub fn read_mapping_bytes(bytes: &[u8], path: &Path, domain: ClinicalDomain) -> Result<MappingTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(bytes);
    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ReportError::csv(path, e))?
        .iter()
        .map(|h| h.trim_matches('\u{feff}').trim().to_string())
        .collect();

    let position = |name: &str| headers.iter().position(|h| h == name);
    let missing = |column: &str| ReportError::MissingColumn {
        path: path.to_path_buf(),
        column: column.to_string(),
    };
    let category_idx =
        position(domain.category_column()).ok_or_else(|| missing(domain.category_column()))?;
    let concept_idx = position(CONCEPT_COLUMN).ok_or_else(|| missing(CONCEPT_COLUMN))?;
    let dataset_idx: Vec<(SourceDataset, usize)> = SourceDataset::ALL
        .iter()
        .filter_map(|dataset| position(dataset.column_name()).map(|idx| (*dataset, idx)))
        .collect();

    let columns: Vec<String> = headers
        .iter()
        .enumerate()
        .filter(|(idx, _)| *idx != concept_idx && !dataset_idx.iter().any(|(_, d)| d == idx))
        .map(|(_, name)| name.clone())
        .collect();

    let mut table = MappingTable::new(domain, columns.clone());
    for (line, record) in reader.records().enumerate() {
        let record = record.map_err(|e| ReportError::csv(path, e))?;
        let cell = |idx: usize| record.get(idx).unwrap_or_default().trim();

        let mut category = Category::new(cell(category_idx), "").map_err(|e| {
            ReportError::InvalidTable {
                path: path.to_path_buf(),
                message: format!("row {}: {e}", line + 1),
            }
        })?;
        if table.find(&category.name).is_some() {
            return Err(ReportError::InvalidTable {
                path: path.to_path_buf(),
                message: format!("duplicate category '{}'", category.name),
            });
        }
        for (idx, name) in headers.iter().enumerate() {
            if !columns.contains(name) || idx == category_idx {
                continue;
            }
            if name == DESCRIPTION_COLUMN {
                category.description = cell(idx).to_string();
            } else if name == domain.examples_column() {
                category.examples = split_examples(cell(idx));
            } else {
                category.attributes.push((name.clone(), cell(idx).to_string()));
            }
        }

        let concept = Some(cell(concept_idx).to_string()).filter(|c| !c.is_empty());
        let mut row = MappingRow::unmapped(category, concept);
        for (dataset, idx) in &dataset_idx {
            let expression = IdentifierExpression::parse(cell(*idx));
            if !expression.is_empty() {
                row.identifiers.insert(*dataset, expression);
            }
        }
        table.rows.push(row);
    }
    Ok(table)
}
