#![deny(unsafe_code)]

use std::path::Path;

use clif_model::{Crosswalk, CrosswalkEntry};

use crate::error::StandardsError;

pub const CATEGORY_COLUMN: &str = "clif_category";
pub const CONCEPT_COLUMN: &str = "ricu_concept";
pub const NOTES_COLUMN: &str = "notes";

pub fn parse_crosswalk_csv(path: &Path) -> Result<Crosswalk, StandardsError> {
    let bytes = std::fs::read(path).map_err(|e| StandardsError::io(path, e))?;
    parse_crosswalk_bytes(&bytes, path)
}

pub fn parse_crosswalk_bytes(bytes: &[u8], path: &Path) -> Result<Crosswalk, StandardsError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(bytes);
    let headers = reader
        .headers()
        .map_err(|e| StandardsError::csv(path, e))?
        .clone();
    let position = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim_matches('\u{feff}').trim() == name)
    };
    let missing = |column: &str| StandardsError::MissingColumn {
        path: path.to_path_buf(),
        column: column.to_string(),
    };
    let category_idx = position(CATEGORY_COLUMN).ok_or_else(|| missing(CATEGORY_COLUMN))?;
    let concept_idx = position(CONCEPT_COLUMN).ok_or_else(|| missing(CONCEPT_COLUMN))?;
    let notes_idx = position(NOTES_COLUMN);

    let mut crosswalk = Crosswalk::new();
    for row in reader.records() {
        let row = row.map_err(|e| StandardsError::csv(path, e))?;
        let get = |idx: usize| -> Option<String> {
            row.get(idx)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToString::to_string)
        };
        let Some(category) = get(category_idx) else {
            return Err(StandardsError::csv(path, "crosswalk row without clif_category"));
        };
        crosswalk
            .insert(CrosswalkEntry {
                category,
                concept: get(concept_idx),
                notes: notes_idx.and_then(get),
            })
            .map_err(|e| StandardsError::definition(path, e))?;
    }
    Ok(crosswalk)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn empty_concept_means_unmapped() {
        let csv = "clif_category,ricu_concept,notes\n\
                   heart_rate,hr,\n\
                   propofol,,sedatives are not tracked by rate\n";
        let crosswalk = parse_crosswalk_bytes(csv.as_bytes(), &PathBuf::from("x.csv")).unwrap();
        assert_eq!(crosswalk.len(), 2);
        assert_eq!(crosswalk.concept_for("heart_rate"), Some("hr"));
        let propofol = crosswalk.entry("propofol").unwrap();
        assert_eq!(propofol.concept, None);
        assert_eq!(
            propofol.notes.as_deref(),
            Some("sedatives are not tracked by rate")
        );
    }

    #[test]
    fn notes_column_is_optional() {
        let csv = "clif_category,ricu_concept\nsbp,sbp\n";
        let crosswalk = parse_crosswalk_bytes(csv.as_bytes(), &PathBuf::from("x.csv")).unwrap();
        assert_eq!(crosswalk.entry("sbp").unwrap().notes, None);
    }

    #[test]
    fn duplicate_rows_fail() {
        let csv = "clif_category,ricu_concept\nsbp,sbp\nSBP,sbp\n";
        assert!(parse_crosswalk_bytes(csv.as_bytes(), &PathBuf::from("x.csv")).is_err());
    }
}
