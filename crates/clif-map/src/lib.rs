#![deny(unsafe_code)]

pub mod builder;
pub mod dictionary;
pub mod error;
pub mod extract;

pub use builder::{MappingBuilder, build_table};
pub use dictionary::ConceptDictionary;
pub use error::{MapError, Result};
