//! Category mapping builder.
//!
//! For every category of a definition table the builder looks up the concept
//! named by the crosswalk, resolves it in the dictionary and copies the
//! per-dataset identifier expressions into a [`MappingRow`]. Rows keep the
//! order of the definition table.

use clif_model::{
    Category, CategoryTable, ConceptEntry, Crosswalk, MappingRow, MappingTable,
};
use tracing::{debug, info};

use crate::dictionary::ConceptDictionary;
use crate::error::Result;

pub struct MappingBuilder<'a> {
    crosswalk: &'a Crosswalk,
    dictionary: &'a ConceptDictionary,
}

impl<'a> MappingBuilder<'a> {
    pub fn new(crosswalk: &'a Crosswalk, dictionary: &'a ConceptDictionary) -> Self {
        Self {
            crosswalk,
            dictionary,
        }
    }

    pub fn build_table(&self, table: &CategoryTable) -> Result<MappingTable> {
        let mut mapping = MappingTable::new(table.domain, table.columns.clone());
        for category in &table.categories {
            mapping.rows.push(self.build_row(category)?);
        }
        let coverage = mapping.coverage();
        info!(
            domain = %table.domain,
            categories = coverage.total,
            linked = coverage.concept_linked,
            with_identifiers = coverage.with_identifiers,
            "built mapping table"
        );
        Ok(mapping)
    }

    /// Build every table, failing on the first malformed referenced concept.
    pub fn build_all<'t, I>(&self, tables: I) -> Result<Vec<MappingTable>>
    where
        I: IntoIterator<Item = &'t CategoryTable>,
    {
        tables
            .into_iter()
            .map(|table| self.build_table(table))
            .collect()
    }

    pub fn build_row(&self, category: &Category) -> Result<MappingRow> {
        let Some(entry) = self.crosswalk.entry(&category.name) else {
            debug!(category = %category.name, "no crosswalk entry");
            return Ok(MappingRow::unmapped(with_description(category, None), None));
        };
        let Some(concept) = entry.concept.as_deref() else {
            debug!(
                category = %category.name,
                notes = entry.notes.as_deref().unwrap_or(""),
                "category intentionally unmapped"
            );
            return Ok(MappingRow::unmapped(with_description(category, None), None));
        };

        let resolved = self.dictionary.resolve(concept)?;
        let mut row = MappingRow::unmapped(
            with_description(category, resolved),
            Some(concept.to_string()),
        );
        match resolved {
            Some(concept_entry) => {
                row.identifiers = concept_entry.sources.clone();
                debug!(
                    category = %category.name,
                    concept,
                    datasets = row.identifiers.len(),
                    "resolved concept"
                );
            }
            None => debug!(category = %category.name, concept, "concept not in dictionary"),
        }
        Ok(row)
    }
}

/// Convenience wrapper around [`MappingBuilder::build_table`].
pub fn build_table(
    table: &CategoryTable,
    crosswalk: &Crosswalk,
    dictionary: &ConceptDictionary,
) -> Result<MappingTable> {
    MappingBuilder::new(crosswalk, dictionary).build_table(table)
}

/// The category with a populated description: its own, the concept's, or
/// the category name spelled out.
fn with_description(category: &Category, concept: Option<&ConceptEntry>) -> Category {
    let mut category = category.clone();
    if category.description.trim().is_empty() {
        category.description = concept
            .and_then(|entry| entry.description.clone())
            .unwrap_or_else(|| category.name.replace('_', " "));
    }
    category
}
