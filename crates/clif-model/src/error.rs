use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("unknown source dataset: {0}")]
    UnknownDataset(String),
    #[error("unknown clinical domain: {0}")]
    UnknownDomain(String),
    #[error("category name must not be empty")]
    EmptyCategoryName,
    #[error("duplicate category '{category}' in {domain} definitions")]
    DuplicateCategory { domain: String, category: String },
    #[error("duplicate crosswalk entry for category '{0}'")]
    DuplicateCrosswalkEntry(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
