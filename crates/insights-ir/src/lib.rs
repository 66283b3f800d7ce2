//! Retail insights data model
//!
//! Typed rows and aggregate records shared by every stage of the pipeline.
//! Aggregate tables are plain ordered sequences of these records.

mod row;
mod tables;
mod types;

pub use row::*;
pub use tables::*;
pub use types::*;
