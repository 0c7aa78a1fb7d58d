//! Read-only projections over a cleaned `SalesTable`.
//!
//! Responsibilities:
//!
//! - group-by aggregations and revenue rankings (`group`)
//! - descriptive statistics for Sales and Unit (`stats`)
//! - calendar-bucketed rollups with a contiguous time axis (`resample`)
//!
//! Every entry point fails with `EmptyTableError` on a table with no rows.

pub mod group;
pub mod resample;
pub mod stats;

pub use group::*;
pub use resample::*;
pub use stats::*;
