//! Library side of the `openclif` command-line tool.

pub mod logging;
pub mod pipeline;
