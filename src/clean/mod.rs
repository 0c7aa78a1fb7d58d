//! Cleaning stage: raw rows in, invariant-holding `SalesTable` out.
//!
//! Steps run in a fixed order:
//!
//! 1. impute null Sales with the mean of the non-null values (`impute`)
//! 2. parse every date text into a `NaiveDate` (`dates`)
//! 3. drop exact duplicate records, keeping the first occurrence (`dedup`)
//!
//! Dedup runs on parsed dates, so the same day written in two formats
//! still counts as a duplicate.
//!
//! Any failure aborts the run; rows are never skipped.

pub mod dates;
pub mod dedup;
pub mod impute;

pub use dates::parse_date;

use serde::Serialize;

use crate::domain::{RawTable, SalesRecord, SalesTable};
use crate::error::AppError;

/// What the cleaning stage changed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleanReport {
    pub rows_in: usize,
    pub rows_out: usize,
    pub nulls_imputed: usize,
    /// Mean used to fill nulls; `None` when there was nothing to fill.
    pub imputed_value: Option<f64>,
    pub duplicates_removed: usize,
}

/// Run every cleaning step over a loaded table.
pub fn clean(raw: RawTable) -> Result<(SalesTable, CleanReport), AppError> {
    let rows_in = raw.len();

    let imputed = impute::impute_sales(raw.records)?;
    if imputed.filled > 0 {
        tracing::warn!(
            nulls = imputed.filled,
            value = imputed.value.unwrap_or_default(),
            "imputed null Sales with column mean"
        );
    }

    let mut parsed = Vec::with_capacity(imputed.rows.len());
    for row in imputed.rows {
        let date = parse_date(&row.date).map_err(|e| AppError::parse(format!("Line {}: {e}", row.line)))?;
        parsed.push(SalesRecord {
            date,
            state: row.state,
            group: row.group,
            time: row.time,
            sales: row.sales,
            unit: row.unit,
            sales_normalized: None,
        });
    }

    let (records, duplicates_removed) = dedup::drop_duplicates(parsed);
    if duplicates_removed > 0 {
        tracing::warn!(duplicates = duplicates_removed, "dropped duplicate rows");
    }

    let report = CleanReport {
        rows_in,
        rows_out: records.len(),
        nulls_imputed: imputed.filled,
        imputed_value: imputed.value,
        duplicates_removed,
    };
    tracing::info!(rows_in, rows_out = report.rows_out, "cleaned sales table");

    Ok((SalesTable::new(records), report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RawSalesRecord;
    use crate::error::ErrorKind;
    use chrono::NaiveDate;

    fn raw(line: usize, date: &str, state: &str, sales: Option<f64>, unit: u64) -> RawSalesRecord {
        RawSalesRecord {
            line,
            date: date.to_string(),
            state: state.to_string(),
            group: "Men".to_string(),
            time: "Morning".to_string(),
            sales,
            unit,
        }
    }

    #[test]
    fn imputes_then_parses_then_dedups() {
        let table = RawTable {
            records: vec![
                raw(2, "2020-01-01", "NSW", Some(100.0), 2),
                raw(3, "2020-01-01", "NSW", Some(100.0), 2),
                raw(4, "2020-01-08", "VIC", None, 3),
            ],
            source: "<memory>".to_string(),
        };

        let (cleaned, report) = clean(table).unwrap();
        assert_eq!(cleaned.len(), 2);
        assert_eq!(report.duplicates_removed, 1);
        assert_eq!(report.nulls_imputed, 1);
        assert_eq!(report.imputed_value, Some(100.0));
        assert_eq!(cleaned.records[1].sales, 100.0);
        assert_eq!(cleaned.records[1].date, NaiveDate::from_ymd_opt(2020, 1, 8).unwrap());
        assert_eq!(cleaned.records[0].state, "NSW");
    }

    #[test]
    fn rows_that_become_identical_after_imputation_collapse() {
        let table = RawTable {
            records: vec![
                raw(2, "2020-01-01", "NSW", Some(10.0), 1),
                raw(3, "2020-01-02", "NSW", None, 1),
                raw(4, "2020-01-02", "NSW", None, 1),
            ],
            source: String::new(),
        };
        let (cleaned, report) = clean(table).unwrap();
        assert_eq!(report.nulls_imputed, 2);
        assert_eq!(report.duplicates_removed, 1);
        assert_eq!(cleaned.len(), 2);
    }

    #[test]
    fn same_day_in_two_formats_is_one_record() {
        let table = RawTable {
            records: vec![
                raw(2, "2020-10-01", "WA", Some(100.0), 2),
                raw(3, "1-Oct-2020", "WA", Some(100.0), 2),
                raw(4, "01/10/2020", "WA", Some(100.0), 2),
                raw(5, "2-Oct-2020", "WA", Some(100.0), 2),
            ],
            source: String::new(),
        };
        let (cleaned, report) = clean(table).unwrap();
        assert_eq!(cleaned.len(), 2);
        assert_eq!(report.duplicates_removed, 2);
        assert_eq!(report.rows_out, 2);
        assert_eq!(cleaned.records[0].date, NaiveDate::from_ymd_opt(2020, 10, 1).unwrap());
        assert_eq!(cleaned.records[1].date, NaiveDate::from_ymd_opt(2020, 10, 2).unwrap());
        for (i, a) in cleaned.records.iter().enumerate() {
            assert!(cleaned.records[i + 1..].iter().all(|b| a != b));
        }
    }

    #[test]
    fn bad_date_aborts_with_parse_error() {
        let table = RawTable {
            records: vec![
                raw(2, "2020-01-01", "NSW", Some(1.0), 1),
                raw(3, "not a date", "NSW", Some(2.0), 1),
            ],
            source: String::new(),
        };
        let err = clean(table).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert!(err.message().contains("Line 3"), "{err}");
    }

    #[test]
    fn empty_table_cleans_to_empty_table() {
        let (cleaned, report) = clean(RawTable::default()).unwrap();
        assert!(cleaned.is_empty());
        assert_eq!(report.rows_out, 0);
        assert_eq!(report.imputed_value, None);
    }
}
