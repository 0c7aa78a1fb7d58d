//! Calendar resampling.
//!
//! Buckets are labelled by their last day:
//! - daily: the day itself
//! - weekly: the next occurrence (inclusive) of the configured week-end weekday
//! - monthly: the last day of the month
//! - quarterly: the last day of the calendar quarter
//!
//! The full bucket sequence between the first and last record is generated
//! before any record is folded in, so periods without sales still appear
//! (zero-filled) and the time axis stays contiguous.

use std::collections::HashMap;

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::Serialize;

use crate::domain::{Frequency, SalesTable, WeekEnd};
use crate::error::AppError;

/// One calendar bucket of a resampled series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub sales: f64,
    pub units: u64,
    /// Number of table rows folded into this bucket (0 for gap buckets).
    pub records: usize,
}

/// A resampled series at one granularity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resampled {
    pub frequency: Frequency,
    pub buckets: Vec<Bucket>,
}

impl Resampled {
    pub fn total_sales(&self) -> f64 {
        self.buckets.iter().map(|b| b.sales).sum()
    }

    pub fn total_units(&self) -> u64 {
        self.buckets.iter().map(|b| b.units).sum()
    }
}

/// Sum Sales and Units into contiguous calendar buckets.
pub fn resample(table: &SalesTable, frequency: Frequency, week_end: WeekEnd) -> Result<Resampled, AppError> {
    table.require_rows(&format!("{} resample", frequency.label()))?;
    let Some((first, last)) = table.date_range() else {
        return Err(AppError::empty_table("Cannot resample: the sales table has no dates."));
    };

    let week_end = week_end.weekday();
    let out_of_range = |d: NaiveDate| AppError::parse(format!("Date {d} is outside the supported calendar range."));

    let last_end = bucket_end(last, frequency, week_end).ok_or_else(|| out_of_range(last))?;
    let mut end = bucket_end(first, frequency, week_end).ok_or_else(|| out_of_range(first))?;

    let mut buckets = Vec::new();
    let mut index: HashMap<NaiveDate, usize> = HashMap::new();
    loop {
        let start = bucket_start(end, frequency).ok_or_else(|| out_of_range(end))?;
        index.insert(end, buckets.len());
        buckets.push(Bucket {
            start,
            end,
            sales: 0.0,
            units: 0,
            records: 0,
        });
        if end >= last_end {
            break;
        }
        end = end
            .checked_add_days(Days::new(1))
            .and_then(|d| bucket_end(d, frequency, week_end))
            .ok_or_else(|| out_of_range(end))?;
    }

    for r in table.iter() {
        let end = bucket_end(r.date, frequency, week_end).ok_or_else(|| out_of_range(r.date))?;
        let Some(&idx) = index.get(&end) else {
            return Err(AppError::parse(format!("Date {} fell outside the generated bucket range.", r.date)));
        };
        let bucket = &mut buckets[idx];
        bucket.sales += r.sales;
        bucket.units += r.unit;
        bucket.records += 1;
    }

    let empty = buckets.iter().filter(|b| b.records == 0).count();
    tracing::info!(
        frequency = frequency.label(),
        buckets = buckets.len(),
        empty,
        "resampled sales"
    );

    Ok(Resampled { frequency, buckets })
}

/// Resample at every granularity, finest first.
pub fn resample_all(table: &SalesTable, week_end: WeekEnd) -> Result<Vec<Resampled>, AppError> {
    Frequency::ALL
        .iter()
        .map(|&f| resample(table, f, week_end))
        .collect()
}

/// Last day of the bucket containing `date`.
pub fn bucket_end(date: NaiveDate, frequency: Frequency, week_end: Weekday) -> Option<NaiveDate> {
    match frequency {
        Frequency::Daily => Some(date),
        Frequency::Weekly => {
            let ahead = (7 + week_end.num_days_from_monday() - date.weekday().num_days_from_monday()) % 7;
            date.checked_add_days(Days::new(u64::from(ahead)))
        }
        Frequency::Monthly => last_day_of_month(date.year(), date.month()),
        Frequency::Quarterly => {
            let quarter_last_month = date.month0() / 3 * 3 + 3;
            last_day_of_month(date.year(), quarter_last_month)
        }
    }
}

/// First day of the bucket that ends on `end`.
pub fn bucket_start(end: NaiveDate, frequency: Frequency) -> Option<NaiveDate> {
    match frequency {
        Frequency::Daily => Some(end),
        Frequency::Weekly => end.checked_sub_days(Days::new(6)),
        Frequency::Monthly => NaiveDate::from_ymd_opt(end.year(), end.month(), 1),
        Frequency::Quarterly => NaiveDate::from_ymd_opt(end.year(), end.month0() / 3 * 3 + 1, 1),
    }
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SalesRecord;
    use crate::error::ErrorKind;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn rec(date: NaiveDate, sales: f64, unit: u64) -> SalesRecord {
        SalesRecord {
            date,
            state: "NSW".to_string(),
            group: "Men".to_string(),
            time: "Morning".to_string(),
            sales,
            unit,
            sales_normalized: None,
        }
    }

    #[test]
    fn bucket_ends_follow_calendar() {
        let sun = Weekday::Sun;
        // 2020-01-01 was a Wednesday.
        assert_eq!(bucket_end(d(2020, 1, 1), Frequency::Weekly, sun), Some(d(2020, 1, 5)));
        assert_eq!(bucket_end(d(2020, 1, 5), Frequency::Weekly, sun), Some(d(2020, 1, 5)));
        assert_eq!(bucket_end(d(2020, 1, 1), Frequency::Weekly, Weekday::Wed), Some(d(2020, 1, 1)));
        assert_eq!(bucket_end(d(2020, 2, 10), Frequency::Monthly, sun), Some(d(2020, 2, 29)));
        assert_eq!(bucket_end(d(2021, 2, 10), Frequency::Monthly, sun), Some(d(2021, 2, 28)));
        assert_eq!(bucket_end(d(2020, 11, 15), Frequency::Quarterly, sun), Some(d(2020, 12, 31)));
        assert_eq!(bucket_end(d(2020, 4, 1), Frequency::Quarterly, sun), Some(d(2020, 6, 30)));
        assert_eq!(bucket_start(d(2020, 12, 31), Frequency::Quarterly), Some(d(2020, 10, 1)));
        assert_eq!(bucket_start(d(2020, 1, 5), Frequency::Weekly), Some(d(2019, 12, 30)));
    }

    #[test]
    fn weekly_two_week_scenario() {
        let table = SalesTable::new(vec![rec(d(2020, 1, 1), 100.0, 2), rec(d(2020, 1, 8), 100.0, 3)]);
        let weekly = resample(&table, Frequency::Weekly, WeekEnd::Sun).unwrap();
        let sums: Vec<(NaiveDate, f64)> = weekly.buckets.iter().map(|b| (b.end, b.sales)).collect();
        assert_eq!(sums, vec![(d(2020, 1, 5), 100.0), (d(2020, 1, 12), 100.0)]);
    }

    #[test]
    fn gaps_are_zero_filled() {
        let table = SalesTable::new(vec![rec(d(2020, 10, 30), 5.0, 1), rec(d(2020, 10, 1), 7.0, 2)]);

        let daily = resample(&table, Frequency::Daily, WeekEnd::Sun).unwrap();
        assert_eq!(daily.buckets.len(), 30);
        assert_eq!(daily.buckets.iter().filter(|b| b.records == 0).count(), 28);
        assert_eq!(daily.buckets[1].sales, 0.0);
        assert_eq!(daily.buckets[1].units, 0);

        let weekly = resample(&table, Frequency::Weekly, WeekEnd::Sun).unwrap();
        let ends: Vec<NaiveDate> = weekly.buckets.iter().map(|b| b.end).collect();
        assert_eq!(
            ends,
            vec![d(2020, 10, 4), d(2020, 10, 11), d(2020, 10, 18), d(2020, 10, 25), d(2020, 11, 1)]
        );
        for pair in weekly.buckets.windows(2) {
            assert_eq!(pair[1].start, pair[0].end.succ_opt().unwrap());
        }
    }

    #[test]
    fn every_granularity_preserves_the_total() {
        let table = SalesTable::new(vec![
            rec(d(2020, 9, 28), 1.5, 1),
            rec(d(2020, 10, 1), 2.25, 2),
            rec(d(2020, 10, 19), 4.0, 3),
            rec(d(2020, 12, 31), 8.0, 4),
            rec(d(2021, 1, 1), 16.0, 5),
        ]);
        let total = table.total_sales();
        for series in resample_all(&table, WeekEnd::Sun).unwrap() {
            assert!((series.total_sales() - total).abs() < 1e-9, "{:?}", series.frequency);
            assert_eq!(series.total_units(), 15);
        }

        let quarterly = resample(&table, Frequency::Quarterly, WeekEnd::Sun).unwrap();
        let ends: Vec<NaiveDate> = quarterly.buckets.iter().map(|b| b.end).collect();
        assert_eq!(ends, vec![d(2020, 9, 30), d(2020, 12, 31), d(2021, 3, 31)]);
    }

    #[test]
    fn monthly_axis_crosses_year_end() {
        let table = SalesTable::new(vec![rec(d(2020, 11, 3), 1.0, 1), rec(d(2021, 2, 3), 1.0, 1)]);
        let monthly = resample(&table, Frequency::Monthly, WeekEnd::Sun).unwrap();
        let ends: Vec<NaiveDate> = monthly.buckets.iter().map(|b| b.end).collect();
        assert_eq!(ends, vec![d(2020, 11, 30), d(2020, 12, 31), d(2021, 1, 31), d(2021, 2, 28)]);
        assert_eq!(monthly.buckets[1].records, 0);
    }

    #[test]
    fn largest_units_sum_without_overflow() {
        use crate::domain::MAX_UNIT;

        let table = SalesTable::new(vec![
            rec(d(2020, 1, 1), 1.0, MAX_UNIT),
            rec(d(2020, 1, 2), 1.0, MAX_UNIT),
            rec(d(2020, 1, 3), 1.0, 1),
        ]);
        let weekly = resample(&table, Frequency::Weekly, WeekEnd::Sun).unwrap();
        assert_eq!(weekly.buckets.len(), 1);
        assert_eq!(weekly.buckets[0].units, 2 * MAX_UNIT + 1);
        assert_eq!(weekly.total_units(), table.total_units());
    }

    #[test]
    fn empty_table_is_rejected() {
        let err = resample(&SalesTable::default(), Frequency::Daily, WeekEnd::Sun).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyTable);
    }
}
