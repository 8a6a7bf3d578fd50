#![deny(unsafe_code)]

pub mod csv;
pub mod doctor;
pub mod error;
pub mod hash;
pub mod manifest;
pub mod paths;
pub mod registry;

pub use crate::doctor::DoctorReport;
pub use crate::error::StandardsError;
pub use crate::paths::{STANDARDS_ENV_VAR, resolve_standards_root, standards_root};
pub use crate::registry::{StandardsRegistry, VerifySummary};

/// Verify and load the bundle under the default standards root.
pub fn load_default_registry() -> Result<StandardsRegistry, StandardsError> {
    StandardsRegistry::verify_and_load(&standards_root()).map(|(registry, _)| registry)
}
