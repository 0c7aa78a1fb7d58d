//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - raw and cleaned sales rows (`RawSalesRecord`, `SalesRecord`)
//! - the owned table the pipeline mutates (`SalesTable`)
//! - run configuration and the enums behind CLI flags (`Frequency`, `WeekEnd`, ...)

pub mod types;

pub use types::*;
