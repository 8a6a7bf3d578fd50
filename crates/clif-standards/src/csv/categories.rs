#![deny(unsafe_code)]

use std::path::Path;

use clif_model::category::split_examples;
use clif_model::{
    Category, CategoryTable, ClinicalDomain, DESCRIPTION_COLUMN, is_output_column,
};
use tracing::debug;

use crate::error::StandardsError;

/// Parse a CLIF category definition table for `domain`.
///
/// The category, description and examples columns are required; every other
/// column is carried as an attribute in header order. Concept and dataset
/// columns of a previously built table are dropped.
pub fn parse_category_csv(
    path: &Path,
    domain: ClinicalDomain,
) -> Result<CategoryTable, StandardsError> {
    let bytes = std::fs::read(path).map_err(|e| StandardsError::io(path, e))?;
    parse_category_bytes(&bytes, domain, path)
}

pub fn parse_category_bytes(
    bytes: &[u8],
    domain: ClinicalDomain,
    path: &Path,
) -> Result<CategoryTable, StandardsError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(bytes);
    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| StandardsError::csv(path, e))?
        .iter()
        .map(|h| h.trim_matches('\u{feff}').trim().to_string())
        .collect();

    let position = |column: &str| -> Result<usize, StandardsError> {
        headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| StandardsError::MissingColumn {
                path: path.to_path_buf(),
                column: column.to_string(),
            })
    };
    let category_idx = position(domain.category_column())?;
    let description_idx = position(DESCRIPTION_COLUMN)?;
    let examples_idx = position(domain.examples_column())?;

    for column in headers.iter().filter(|h| is_output_column(h)) {
        debug!(path = %path.display(), column = %column, "dropping generated column");
    }
    let columns: Vec<String> = headers
        .iter()
        .filter(|h| !is_output_column(h))
        .cloned()
        .collect();

    let mut table = CategoryTable::new(domain, columns);
    for row in reader.records() {
        let row = row.map_err(|e| StandardsError::csv(path, e))?;
        let cell = |idx: usize| row.get(idx).map(str::trim).unwrap_or_default();

        let mut category = Category::new(cell(category_idx), cell(description_idx))
            .map_err(|e| StandardsError::definition(path, e))?
            .with_examples(split_examples(cell(examples_idx)));
        for (idx, column) in headers.iter().enumerate() {
            if idx == category_idx
                || idx == description_idx
                || idx == examples_idx
                || is_output_column(column)
            {
                continue;
            }
            category = category.with_attribute(column.clone(), cell(idx));
        }
        table
            .push(category)
            .map_err(|e| StandardsError::definition(path, e))?;
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clif_model::ModelError;

    use super::*;

    fn path() -> PathBuf {
        PathBuf::from("labs.csv")
    }

    #[test]
    fn keeps_attribute_columns_in_order() {
        let csv = "\u{feff}lab_category,reference_unit,description,lab_name_type_examples,lab_order_category\n\
                   albumin,g/dL,,\"ALBUMIN, ALB\",lft\n";
        let table = parse_category_bytes(csv.as_bytes(), ClinicalDomain::Labs, &path()).unwrap();
        assert_eq!(table.columns[0], "lab_category");
        let albumin = &table.categories[0];
        assert_eq!(albumin.name, "albumin");
        assert_eq!(albumin.description, "");
        assert_eq!(albumin.examples, vec!["ALBUMIN", "ALB"]);
        assert_eq!(
            albumin.attributes,
            vec![
                ("reference_unit".to_string(), "g/dL".to_string()),
                ("lab_order_category".to_string(), "lft".to_string()),
            ]
        );
    }

    #[test]
    fn previously_built_table_is_accepted_as_definitions() {
        let csv = "vital_category,description,vital_name_examples,ricu_concept,sic_ids\n\
                   heart_rate,Heart rate,pulse,old,999\n";
        let table =
            parse_category_bytes(csv.as_bytes(), ClinicalDomain::Vitals, &path()).unwrap();
        assert_eq!(
            table.columns,
            vec!["vital_category", "description", "vital_name_examples"]
        );
        assert!(table.categories[0].attributes.is_empty());
    }

    #[test]
    fn requires_examples_column() {
        let csv = "vital_category,description\nsbp,Systolic\n";
        let err = parse_category_bytes(csv.as_bytes(), ClinicalDomain::Vitals, &path()).unwrap_err();
        assert!(matches!(
            err,
            StandardsError::MissingColumn { ref column, .. } if column == "vital_name_examples"
        ));
    }

    #[test]
    fn rejects_duplicate_categories() {
        let csv = "vital_category,description,vital_name_examples\nsbp,a,x\nsbp,b,y\n";
        let err = parse_category_bytes(csv.as_bytes(), ClinicalDomain::Vitals, &path()).unwrap_err();
        assert!(matches!(
            err,
            StandardsError::Definition {
                source: ModelError::DuplicateCategory { .. },
                ..
            }
        ));
    }

    #[test]
    fn rejects_blank_category_names() {
        let csv = "med_category,description,med_name_examples\n,Orphan description,\n";
        let err =
            parse_category_bytes(csv.as_bytes(), ClinicalDomain::Medications, &path()).unwrap_err();
        assert!(matches!(
            err,
            StandardsError::Definition {
                source: ModelError::EmptyCategoryName,
                ..
            }
        ));
    }
}
