#![deny(unsafe_code)]

use std::collections::BTreeMap;

use clif_model::ClinicalDomain;

use crate::manifest::{ManifestFile, Pins};
use crate::registry::VerifySummary;

pub const DOCTOR_SCHEMA: &str = "openclif.standards-doctor";

#[derive(Debug, Clone, serde::Serialize)]
pub struct DoctorReport {
    pub schema: String,
    pub schema_version: u32,
    pub pins: Pins,
    pub files: Vec<ManifestFile>,
    pub counts: DoctorCounts,
    pub orphan_crosswalk: Vec<String>,
    pub uncrosswalked: Vec<String>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct DoctorCounts {
    pub files: usize,
    pub categories: BTreeMap<ClinicalDomain, usize>,
    pub crosswalk_entries: usize,
    pub crosswalk_linked: usize,
}

impl DoctorReport {
    pub fn from_verify_summary(summary: &VerifySummary, files: Vec<ManifestFile>) -> Self {
        Self {
            schema: DOCTOR_SCHEMA.to_string(),
            schema_version: 1,
            pins: summary.manifest_pins.clone(),
            files,
            counts: DoctorCounts {
                files: summary.file_count,
                categories: summary.category_counts.clone(),
                crosswalk_entries: summary.crosswalk_entries,
                crosswalk_linked: summary.crosswalk_linked,
            },
            orphan_crosswalk: summary.orphan_crosswalk.clone(),
            uncrosswalked: summary.uncrosswalked.clone(),
        }
    }

    /// True when every category has a crosswalk row and vice versa.
    pub fn is_consistent(&self) -> bool {
        self.orphan_crosswalk.is_empty() && self.uncrosswalked.is_empty()
    }
}
