//! Descriptive statistics.
//!
//! Conventions:
//! - standard deviation is the **sample** deviation (divisor `n - 1`);
//!   undefined (`None`) for a single value
//! - quartiles interpolate linearly between the closest ranks
//! - the mode is the most frequent value; ties go to the smallest value

use serde::Serialize;

use crate::domain::SalesTable;
use crate::error::AppError;

/// Summary of one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Descriptive {
    pub count: usize,
    pub mean: f64,
    pub std: Option<f64>,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub mode: f64,
}

impl Descriptive {
    /// `None` for an empty input.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let n = sorted.len();
        let mean = sorted.iter().sum::<f64>() / n as f64;
        let std = (n > 1).then(|| {
            let ss: f64 = sorted.iter().map(|v| (v - mean).powi(2)).sum();
            (ss / (n - 1) as f64).sqrt()
        });

        Some(Self {
            count: n,
            mean,
            std,
            min: sorted[0],
            q1: quantile_sorted(&sorted, 0.25),
            median: quantile_sorted(&sorted, 0.5),
            q3: quantile_sorted(&sorted, 0.75),
            max: sorted[n - 1],
            mode: mode_sorted(&sorted),
        })
    }
}

/// Sales and Unit summaries of one table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummaries {
    pub sales: Descriptive,
    pub unit: Descriptive,
}

/// Describe the Sales and Unit columns independently.
pub fn describe_sales_and_units(table: &SalesTable) -> Result<ColumnSummaries, AppError> {
    table.require_rows("descriptive statistics")?;

    let sales: Vec<f64> = table.iter().map(|r| r.sales).collect();
    let units: Vec<f64> = table.iter().map(|r| r.unit as f64).collect();

    let empty = || AppError::empty_table("Cannot describe an empty column.");
    Ok(ColumnSummaries {
        sales: Descriptive::from_values(&sales).ok_or_else(empty)?,
        unit: Descriptive::from_values(&units).ok_or_else(empty)?,
    })
}

fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

fn mode_sorted(sorted: &[f64]) -> f64 {
    // Runs of equal values are contiguous; the first longest run is the
    // smallest modal value.
    let mut best = (sorted[0], 0usize);
    let mut i = 0;
    while i < sorted.len() {
        let v = sorted[i];
        let run = sorted[i..].iter().take_while(|&&x| x == v).count();
        if run > best.1 {
            best = (v, run);
        }
        i += run;
    }
    best.0
}
