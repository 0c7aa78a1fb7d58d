//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during cleaning and aggregation
//! - exported to CSV/JSON
//! - rendered by the report, plot, and TUI front-ends

use std::path::PathBuf;

use chrono::{NaiveDate, Weekday};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Column names of the input schema, in canonical order.
pub const REQUIRED_COLUMNS: [&str; 6] = ["Date", "State", "Group", "Time", "Sales", "Unit"];

/// Largest Unit a single row may carry.
///
/// Keeps every Unit total a table can hold inside `u64`.
pub const MAX_UNIT: u64 = u32::MAX as u64;

/// A row as read from the CSV, before cleaning.
///
/// `date` is kept verbatim; it is only parsed during cleaning so that
/// deduplication sees exactly what the file contained.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSalesRecord {
    /// 1-based line number in the source file (header is line 1).
    pub line: usize,
    pub date: String,
    pub state: String,
    pub group: String,
    pub time: String,
    /// `None` means the cell was null (`""`, `NA`, `NaN`, ...).
    pub sales: Option<f64>,
    pub unit: u64,
}

/// Output of the load stage.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub records: Vec<RawSalesRecord>,
    /// Human-readable origin (file path or `<memory>`).
    pub source: String,
}

impl RawTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A cleaned row: null-free Sales and a parsed calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub date: NaiveDate,
    pub state: String,
    pub group: String,
    pub time: String,
    pub sales: f64,
    pub unit: u64,
    /// Min-max scaled Sales in `[0, 1]`; `None` until the transform stage runs.
    pub sales_normalized: Option<f64>,
}

/// The table owned by a pipeline run.
///
/// Order is the order of first appearance in the source file; no key is
/// enforced.
#[derive(Debug, Clone, Default)]
pub struct SalesTable {
    pub records: Vec<SalesRecord>,
}

impl SalesTable {
    pub fn new(records: Vec<SalesRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SalesRecord> {
        self.records.iter()
    }

    /// Fail with `EmptyTableError` when there is nothing to aggregate.
    pub fn require_rows(&self, operation: &str) -> Result<(), AppError> {
        if self.records.is_empty() {
            return Err(AppError::empty_table(format!(
                "Cannot compute {operation}: the sales table has no rows."
            )));
        }
        Ok(())
    }

    pub fn total_sales(&self) -> f64 {
        self.records.iter().map(|r| r.sales).sum()
    }

    pub fn total_units(&self) -> u64 {
        self.records.iter().map(|r| r.unit).sum()
    }

    /// Earliest and latest date in the table.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.records.first()?.date;
        Some(self.records.iter().fold((first, first), |(lo, hi), r| {
            (lo.min(r.date), hi.max(r.date))
        }))
    }
}

/// Resampling granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
}

impl Frequency {
    pub const ALL: [Frequency; 4] = [
        Frequency::Daily,
        Frequency::Weekly,
        Frequency::Monthly,
        Frequency::Quarterly,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Quarterly => "quarterly",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Frequency::Daily => "Daily",
            Frequency::Weekly => "Weekly",
            Frequency::Monthly => "Monthly",
            Frequency::Quarterly => "Quarterly",
        }
    }

    pub fn next(self) -> Frequency {
        match self {
            Frequency::Daily => Frequency::Weekly,
            Frequency::Weekly => Frequency::Monthly,
            Frequency::Monthly => Frequency::Quarterly,
            Frequency::Quarterly => Frequency::Daily,
        }
    }
}

/// Weekday on which weekly buckets close.
///
/// Defaults to Sunday, i.e. weeks run Monday..=Sunday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum WeekEnd {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    #[default]
    Sun,
}

impl WeekEnd {
    pub fn weekday(self) -> Weekday {
        match self {
            WeekEnd::Mon => Weekday::Mon,
            WeekEnd::Tue => Weekday::Tue,
            WeekEnd::Wed => Weekday::Wed,
            WeekEnd::Thu => Weekday::Thu,
            WeekEnd::Fri => Weekday::Fri,
            WeekEnd::Sat => Weekday::Sat,
            WeekEnd::Sun => Weekday::Sun,
        }
    }
}

/// What to do when every Sales value is identical (`max == min`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DegeneratePolicy {
    /// Abort with `DegenerateRangeError`.
    #[default]
    Error,
    /// Map every value to `0.0`.
    Zeros,
}

/// Configuration for a `sales report` / `sales tui` run.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub csv_path: PathBuf,
    pub week_end: WeekEnd,
    pub degenerate: DegeneratePolicy,
    /// Rows shown by head/tail previews.
    pub head_rows: usize,
    /// Buckets shown per resampled table.
    pub preview_buckets: usize,
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
    pub export_dir: Option<PathBuf>,
}

/// Configuration for synthetic dataset generation.
#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub out: PathBuf,
    pub seed: u64,
    pub start: NaiveDate,
    pub days: u32,
    /// Probability that a row's Sales cell is written empty.
    pub null_rate: f64,
    /// Probability that a row is written twice.
    pub duplicate_rate: f64,
}
