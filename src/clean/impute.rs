//! Mean imputation for null Sales values.

use crate::domain::RawSalesRecord;
use crate::error::AppError;

/// A raw row whose Sales value is guaranteed present.
#[derive(Debug, Clone, PartialEq)]
pub struct FilledRow {
    pub line: usize,
    pub date: String,
    pub state: String,
    pub group: String,
    pub time: String,
    pub sales: f64,
    pub unit: u64,
}

#[derive(Debug, Clone)]
pub struct Imputed {
    pub rows: Vec<FilledRow>,
    /// Number of null Sales cells that were filled.
    pub filled: usize,
    /// The fill value, when at least one cell was filled.
    pub value: Option<f64>,
}

/// Replace every null Sales with the mean of the non-null values.
///
/// The mean is taken over all rows as loaded, duplicates included. Nulls
/// with no non-null value to average are an `EmptyTableError`.
pub fn impute_sales(rows: Vec<RawSalesRecord>) -> Result<Imputed, AppError> {
    let (sum, count) = rows
        .iter()
        .filter_map(|r| r.sales)
        .fold((0.0_f64, 0usize), |(s, n), v| (s + v, n + 1));
    let nulls = rows.len() - count;

    let value = if nulls == 0 {
        None
    } else if count == 0 {
        return Err(AppError::empty_table(format!(
            "Cannot impute {nulls} null Sales value(s): no non-null Sales to average."
        )));
    } else {
        Some(sum / count as f64)
    };

    let fill = value.unwrap_or_default();
    let rows = rows
        .into_iter()
        .map(|r| FilledRow {
            line: r.line,
            date: r.date,
            state: r.state,
            group: r.group,
            time: r.time,
            sales: r.sales.unwrap_or(fill),
            unit: r.unit,
        })
        .collect();

    Ok(Imputed {
        rows,
        filled: nulls,
        value,
    })
}
