#![deny(unsafe_code)]

pub mod category;
pub mod concept;
pub mod coverage;
pub mod crosswalk;
pub mod dataset;
pub mod domain;
pub mod error;
pub mod expression;
pub mod mapping;

pub use category::{Category, CategoryTable, DESCRIPTION_COLUMN};
pub use concept::ConceptEntry;
pub use coverage::{CoverageReport, DomainCoverage};
pub use crosswalk::{Crosswalk, CrosswalkEntry};
pub use dataset::SourceDataset;
pub use domain::ClinicalDomain;
pub use error::{ModelError, Result};
pub use expression::{ExpressionKind, IdentifierExpression, IdentifierTerm};
pub use mapping::{CONCEPT_COLUMN, MappingRow, MappingTable, is_output_column};
