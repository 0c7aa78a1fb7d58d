//! Input/output helpers.
//!
//! - CSV ingest + column profiling (`ingest`)
//! - aggregate, cleaned-table, and synthetic-dataset exports (CSV/JSON) (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
