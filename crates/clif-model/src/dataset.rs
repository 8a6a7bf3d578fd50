//! Open ICU databases covered by the mapping tables.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

/// A source dataset with its own identifier space.
///
/// Variant order is the column order of every emitted mapping table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceDataset {
    /// MIMIC-III Clinical Database.
    Mimic,
    /// MIMIC-IV.
    Miiv,
    /// eICU Collaborative Research Database.
    Eicu,
    /// HiRID high time-resolution ICU dataset.
    Hirid,
    /// AmsterdamUMCdb.
    Aumc,
    /// Salzburg Intensive Care database.
    Sic,
}

impl SourceDataset {
    pub const ALL: [SourceDataset; 6] = [
        SourceDataset::Mimic,
        SourceDataset::Miiv,
        SourceDataset::Eicu,
        SourceDataset::Hirid,
        SourceDataset::Aumc,
        SourceDataset::Sic,
    ];

    /// Key used for this dataset under a concept's `sources` object.
    pub fn source_key(&self) -> &'static str {
        match self {
            SourceDataset::Mimic => "mimic",
            SourceDataset::Miiv => "miiv",
            SourceDataset::Eicu => "eicu",
            SourceDataset::Hirid => "hirid",
            SourceDataset::Aumc => "aumc",
            SourceDataset::Sic => "sic",
        }
    }

    /// Column name in the emitted mapping tables.
    pub fn column_name(&self) -> &'static str {
        match self {
            SourceDataset::Mimic => "mimic_iii_itemid",
            SourceDataset::Miiv => "mimic_iv_itemid",
            SourceDataset::Eicu => "eicu_ids",
            SourceDataset::Hirid => "hirid_ids",
            SourceDataset::Aumc => "aumc_ids",
            SourceDataset::Sic => "sic_ids",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SourceDataset::Mimic => "MIMIC-III",
            SourceDataset::Miiv => "MIMIC-IV",
            SourceDataset::Eicu => "eICU-CRD",
            SourceDataset::Hirid => "HiRID",
            SourceDataset::Aumc => "AmsterdamUMCdb",
            SourceDataset::Sic => "SICdb",
        }
    }

    /// Look up a dataset by its `sources` key (exact match).
    pub fn from_source_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.source_key() == key)
    }
}

impl fmt::Display for SourceDataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source_key())
    }
}

impl FromStr for SourceDataset {
    type Err = ModelError;

    /// Accepts the source key, the output column name or a few common aliases.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        let dataset = match normalized.as_str() {
            "mimic" | "mimic3" | "mimic_iii" | "mimic-iii" | "mimic_iii_itemid" => {
                SourceDataset::Mimic
            }
            "miiv" | "mimic4" | "mimic_iv" | "mimic-iv" | "mimic_iv_itemid" => SourceDataset::Miiv,
            "eicu" | "eicu_ids" => SourceDataset::Eicu,
            "hirid" | "hirid_ids" => SourceDataset::Hirid,
            "aumc" | "amsterdamumcdb" | "aumc_ids" => SourceDataset::Aumc,
            "sic" | "sicdb" | "sic_ids" => SourceDataset::Sic,
            _ => return Err(ModelError::UnknownDataset(s.to_string())),
        };
        Ok(dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_names_are_distinct() {
        let mut names: Vec<&str> = SourceDataset::ALL.iter().map(|d| d.column_name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), SourceDataset::ALL.len());
    }

    #[test]
    fn parses_aliases() {
        assert_eq!("SICdb".parse::<SourceDataset>().unwrap(), SourceDataset::Sic);
        assert_eq!(
            "mimic_iv_itemid".parse::<SourceDataset>().unwrap(),
            SourceDataset::Miiv
        );
        assert!("omop".parse::<SourceDataset>().is_err());
    }

    #[test]
    fn source_key_lookup_is_exact() {
        assert_eq!(SourceDataset::from_source_key("hirid"), Some(SourceDataset::Hirid));
        assert_eq!(SourceDataset::from_source_key("HIRID"), None);
        assert_eq!(SourceDataset::from_source_key("mimic_demo"), None);
    }
}
