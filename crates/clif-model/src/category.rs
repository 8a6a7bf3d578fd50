//! CLIF category definitions.

use serde::{Deserialize, Serialize};

use crate::domain::ClinicalDomain;
use crate::error::{ModelError, Result};

/// Column holding the human-readable description in every definition table.
pub const DESCRIPTION_COLUMN: &str = "description";

/// Separator used between example strings in a definition cell.
pub const EXAMPLE_SEPARATOR: &str = ", ";

/// A canonical clinical category (e.g. `heart_rate`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub description: String,
    /// Example strings seen in source systems.
    pub examples: Vec<String>,
    /// Further columns of the definition table (`reference_unit`,
    /// `med_group`, ...) in source column order.
    pub attributes: Vec<(String, String)>,
}

impl Category {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ModelError::EmptyCategoryName);
        }
        Ok(Self {
            name,
            description: description.into(),
            examples: Vec::new(),
            attributes: Vec::new(),
        })
    }

    #[must_use]
    pub fn with_examples<I, S>(mut self, examples: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.examples = examples.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_attribute(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((column.into(), value.into()));
        self
    }

    /// Key used for crosswalk lookups.
    pub fn lookup_key(&self) -> String {
        normalize_category_key(&self.name)
    }

    pub fn attribute(&self, column: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    /// Examples rendered back into a single cell.
    pub fn examples_cell(&self) -> String {
        self.examples.join(EXAMPLE_SEPARATOR)
    }
}

/// Split an examples cell into its individual strings.
pub fn split_examples(cell: &str) -> Vec<String> {
    cell.split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Case-insensitive key for category names.
pub fn normalize_category_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// The ordered category definitions of one domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTable {
    pub domain: ClinicalDomain,
    /// Header of the definition table, in source order.
    pub columns: Vec<String>,
    pub categories: Vec<Category>,
}

impl CategoryTable {
    pub fn new(domain: ClinicalDomain, columns: Vec<String>) -> Self {
        Self {
            domain,
            columns,
            categories: Vec::new(),
        }
    }

    /// Default header for tables built in code: category, description, examples.
    pub fn default_columns(domain: ClinicalDomain) -> Vec<String> {
        vec![
            domain.category_column().to_string(),
            DESCRIPTION_COLUMN.to_string(),
            domain.examples_column().to_string(),
        ]
    }

    /// Append a category, rejecting names already present (case-insensitive).
    pub fn push(&mut self, category: Category) -> Result<()> {
        if self.get(&category.name).is_some() {
            return Err(ModelError::DuplicateCategory {
                domain: self.domain.to_string(),
                category: category.name,
            });
        }
        self.categories.push(category);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Category> {
        let key = normalize_category_key(name);
        self.categories.iter().find(|c| c.lookup_key() == key)
    }

    /// Value of a definition column for a category.
    pub fn cell(&self, category: &Category, column: &str) -> String {
        definition_cell(self.domain, category, column)
    }
}

/// Value of a definition-table column for a category of `domain`.
pub fn definition_cell(domain: ClinicalDomain, category: &Category, column: &str) -> String {
    if column == domain.category_column() {
        category.name.clone()
    } else if column == DESCRIPTION_COLUMN {
        category.description.clone()
    } else if column == domain.examples_column() {
        category.examples_cell()
    } else {
        category.attribute(column).unwrap_or_default().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_names() {
        assert_eq!(Category::new("  ", "x"), Err(ModelError::EmptyCategoryName));
    }

    #[test]
    fn splits_examples() {
        assert_eq!(
            split_examples("Temperature (C), Temp celsius,"),
            vec!["Temperature (C)", "Temp celsius"]
        );
        assert!(split_examples("").is_empty());
    }

    #[test]
    fn table_cells_follow_columns() {
        let mut table = CategoryTable::new(
            ClinicalDomain::Labs,
            vec![
                "lab_category".to_string(),
                "reference_unit".to_string(),
                "description".to_string(),
                "lab_name_type_examples".to_string(),
            ],
        );
        let albumin = Category::new("albumin", "serum albumin")
            .unwrap()
            .with_examples(["ALB", "SERUM ALBUMIN"])
            .with_attribute("reference_unit", "g/dL");
        table.push(albumin.clone()).unwrap();

        let cells: Vec<String> = table
            .columns
            .iter()
            .map(|column| table.cell(&albumin, column))
            .collect();
        assert_eq!(cells, vec!["albumin", "g/dL", "serum albumin", "ALB, SERUM ALBUMIN"]);
        assert!(table.get("ALBUMIN").is_some());
    }

    #[test]
    fn push_rejects_duplicates() {
        let mut table = CategoryTable::new(
            ClinicalDomain::Vitals,
            CategoryTable::default_columns(ClinicalDomain::Vitals),
        );
        table.push(Category::new("sbp", "systolic").unwrap()).unwrap();
        let err = table
            .push(Category::new("SBP", "again").unwrap())
            .unwrap_err();
        assert_eq!(
            err,
            ModelError::DuplicateCategory {
                domain: "vitals".to_string(),
                category: "SBP".to_string(),
            }
        );
        assert_eq!(table.len(), 1);
    }
}
