//! Min-max scaling of Sales into `Sales_Normalized`.

use serde::Serialize;

use crate::domain::{DegeneratePolicy, SalesTable};
use crate::error::AppError;

/// Range used for scaling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NormalizationSummary {
    pub min: f64,
    pub max: f64,
    /// `true` when `max == min` and the zero fallback was applied.
    pub degenerate: bool,
}

/// Fill `sales_normalized` on every record with `(v - min) / (max - min)`.
///
/// A constant Sales column either fails with `DegenerateRangeError` or maps
/// every value to `0.0`, depending on `policy`.
pub fn normalize_sales(table: &mut SalesTable, policy: DegeneratePolicy) -> Result<NormalizationSummary, AppError> {
    table.require_rows("Sales normalization")?;

    let (min, max) = table
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), r| (lo.min(r.sales), hi.max(r.sales)));
    let span = max - min;

    if span == 0.0 {
        return match policy {
            DegeneratePolicy::Error => Err(AppError::degenerate_range(format!(
                "Cannot min-max normalize Sales: every value equals {min}."
            ))),
            DegeneratePolicy::Zeros => {
                tracing::warn!(value = min, "constant Sales column; normalized values set to 0");
                for r in &mut table.records {
                    r.sales_normalized = Some(0.0);
                }
                Ok(NormalizationSummary { min, max, degenerate: true })
            }
        };
    }

    for r in &mut table.records {
        // Clamp guards the last ulp; min and max land exactly on 0 and 1.
        r.sales_normalized = Some(((r.sales - min) / span).clamp(0.0, 1.0));
    }
    tracing::debug!(min, max, "normalized Sales");

    Ok(NormalizationSummary { min, max, degenerate: false })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SalesRecord;
    use crate::error::ErrorKind;
    use chrono::NaiveDate;

    fn table(sales: &[f64]) -> SalesTable {
        let date = NaiveDate::from_ymd_opt(2020, 10, 1).unwrap();
        SalesTable::new(
            sales
                .iter()
                .map(|&s| SalesRecord {
                    date,
                    state: "QLD".to_string(),
                    group: "Women".to_string(),
                    time: "Afternoon".to_string(),
                    sales: s,
                    unit: 1,
                    sales_normalized: None,
                })
                .collect(),
        )
    }

    #[test]
    fn extremes_map_to_zero_and_one() {
        let mut t = table(&[5000.0, 12500.0, 20000.0, 5000.0]);
        let summary = normalize_sales(&mut t, DegeneratePolicy::Error).unwrap();
        assert_eq!(summary.min, 5000.0);
        assert_eq!(summary.max, 20000.0);
        let n: Vec<f64> = t.iter().map(|r| r.sales_normalized.unwrap()).collect();
        assert_eq!(n, vec![0.0, 0.5, 1.0, 0.0]);
    }

    #[test]
    fn every_value_lands_in_unit_interval() {
        let mut t = table(&[3.3, 7.1, 0.2, 9.9, 4.4, 0.2]);
        normalize_sales(&mut t, DegeneratePolicy::Error).unwrap();
        for r in t.iter() {
            let v = r.sales_normalized.unwrap();
            assert!((0.0..=1.0).contains(&v), "{v}");
        }
    }

    #[test]
    fn constant_column_errors_by_default() {
        let mut t = table(&[50.0, 50.0, 50.0]);
        let err = normalize_sales(&mut t, DegeneratePolicy::Error).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DegenerateRange);
        assert!(t.iter().all(|r| r.sales_normalized.is_none()));
    }

    #[test]
    fn constant_column_zero_fallback() {
        let mut t = table(&[50.0, 50.0]);
        let summary = normalize_sales(&mut t, DegeneratePolicy::Zeros).unwrap();
        assert!(summary.degenerate);
        assert!(t.iter().all(|r| r.sales_normalized == Some(0.0)));
    }

    #[test]
    fn empty_table_is_empty_table_error() {
        let mut t = SalesTable::default();
        let err = normalize_sales(&mut t, DegeneratePolicy::Zeros).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyTable);
    }
}
