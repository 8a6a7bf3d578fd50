use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

/// CLIF clinical domain; one mapping table is emitted per domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClinicalDomain {
    Vitals,
    Labs,
    Medications,
    RespiratorySupport,
}

impl ClinicalDomain {
    pub const ALL: [ClinicalDomain; 4] = [
        ClinicalDomain::Vitals,
        ClinicalDomain::Labs,
        ClinicalDomain::Medications,
        ClinicalDomain::RespiratorySupport,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClinicalDomain::Vitals => "vitals",
            ClinicalDomain::Labs => "labs",
            ClinicalDomain::Medications => "medications",
            ClinicalDomain::RespiratorySupport => "respiratory_support",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ClinicalDomain::Vitals => "Vitals",
            ClinicalDomain::Labs => "Labs",
            ClinicalDomain::Medications => "Medications",
            ClinicalDomain::RespiratorySupport => "Respiratory support",
        }
    }

    /// Column holding the category name in both definition and mapping tables.
    pub fn category_column(&self) -> &'static str {
        match self {
            ClinicalDomain::Vitals => "vital_category",
            ClinicalDomain::Labs => "lab_category",
            ClinicalDomain::Medications => "med_category",
            ClinicalDomain::RespiratorySupport => "device_category",
        }
    }

    pub fn examples_column(&self) -> &'static str {
        match self {
            ClinicalDomain::Vitals => "vital_name_examples",
            ClinicalDomain::Labs => "lab_name_type_examples",
            ClinicalDomain::Medications => "med_name_examples",
            ClinicalDomain::RespiratorySupport => "device_name_examples",
        }
    }

    /// Mapping table file name, relative to the domain directory.
    pub fn table_file_name(&self) -> &'static str {
        match self {
            ClinicalDomain::Vitals => "clif_vitals_categories.csv",
            ClinicalDomain::Labs => "clif_lab_categories.csv",
            ClinicalDomain::Medications => "clif_medication_categories.csv",
            ClinicalDomain::RespiratorySupport => "clif_respiratory_support_device_categories.csv",
        }
    }

    /// Path of the mapping table relative to the output root,
    /// e.g. `labs/clif_lab_categories.csv`.
    pub fn table_path(&self) -> String {
        format!("{}/{}", self.as_str(), self.table_file_name())
    }

    /// Manifest role of the category definition table for this domain.
    pub fn standards_role(&self) -> &'static str {
        match self {
            ClinicalDomain::Vitals => "vitals_categories",
            ClinicalDomain::Labs => "labs_categories",
            ClinicalDomain::Medications => "medications_categories",
            ClinicalDomain::RespiratorySupport => "respiratory_support_categories",
        }
    }
}

impl fmt::Display for ClinicalDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ClinicalDomain {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "vitals" | "vital" => Ok(ClinicalDomain::Vitals),
            "labs" | "lab" => Ok(ClinicalDomain::Labs),
            "medications" | "medication" | "meds" => Ok(ClinicalDomain::Medications),
            "respiratory_support" | "respiratory" | "resp" => {
                Ok(ClinicalDomain::RespiratorySupport)
            }
            _ => Err(ModelError::UnknownDomain(s.to_string())),
        }
    }
}
