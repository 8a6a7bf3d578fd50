//! Error types for dictionary loading and mapping.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("failed to read concept dictionary {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("concept dictionary {origin} is not valid JSON: {source}")]
    InvalidJson {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("concept dictionary must be a JSON object, found {found}")]
    InvalidRoot { found: &'static str },

    #[error("malformed concept '{concept}' in dictionary: {reason}")]
    MalformedDictionary { concept: String, reason: String },
}

pub type Result<T> = std::result::Result<T, MapError>;
