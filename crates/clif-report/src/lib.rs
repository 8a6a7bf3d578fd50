//! Output side of the mapping builder.
//!
//! - [`render`]: CSV and JSON rendering of tables and coverage reports
//! - [`output`]: staged, all-or-nothing file output
//! - [`reader`]: reading emitted tables back
//! - [`index`]: per-dataset reverse lookup of source identifiers

#![deny(unsafe_code)]

pub mod error;
pub mod index;
pub mod output;
pub mod reader;
pub mod render;

pub use error::{ReportError, Result};
pub use index::{IndexHit, IndexTarget, MatchKind, SourceIndex};
pub use output::{OutputBatch, OutputFile, write_tables};
pub use reader::{read_mapping_bytes, read_mapping_dir, read_mapping_table};
pub use render::{render_coverage, render_table};
