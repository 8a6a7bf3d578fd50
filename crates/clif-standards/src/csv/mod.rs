#![deny(unsafe_code)]

pub mod categories;
pub mod crosswalk;
