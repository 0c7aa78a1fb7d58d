//! Synthetic quarterly apparel sales, shaped like the real export.
//!
//! Every day has one row per State × Group × Time-of-day. Units are drawn
//! from a normal distribution scaled per state, group and time slot; Sales
//! is Units × the unit price. Nulls and duplicate rows can be injected to
//! exercise the cleaning stage.

use chrono::{Datelike, Days};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{RawSalesRecord, SampleConfig};
use crate::error::AppError;

pub const STATES: [&str; 7] = ["WA", "NT", "SA", "VIC", "QLD", "NSW", "TAS"];
pub const GROUPS: [&str; 4] = ["Kids", "Men", "Women", "Seniors"];
pub const TIMES: [&str; 3] = ["Morning", "Afternoon", "Evening"];

const UNIT_PRICE: f64 = 2500.0;
const BASE_UNITS: f64 = 15.0;
/// Relative spread of the unit draw around its mean.
const UNIT_CV: f64 = 0.35;

/// Generated rows plus what was injected.
#[derive(Debug, Clone)]
pub struct SampleData {
    pub rows: Vec<RawSalesRecord>,
    /// Null Sales cells written, duplicates included.
    pub nulls: usize,
    pub duplicates: usize,
}

pub fn generate_dataset(config: &SampleConfig) -> Result<SampleData, AppError> {
    if config.days == 0 {
        return Err(AppError::config("Sample day count must be > 0."));
    }
    for (name, p) in [("null rate", config.null_rate), ("duplicate rate", config.duplicate_rate)] {
        if !(0.0..1.0).contains(&p) {
            return Err(AppError::config(format!("Invalid {name} {p} (must be in [0, 1)).")));
        }
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let noise = Normal::new(0.0, UNIT_CV)
        .map_err(|e| AppError::config(format!("Noise distribution error: {e}")))?;

    let per_day = STATES.len() * GROUPS.len() * TIMES.len();
    let mut rows = Vec::with_capacity(per_day * config.days as usize);
    let mut nulls = 0usize;
    let mut duplicates = 0usize;

    for offset in 0..config.days {
        let date = config
            .start
            .checked_add_days(Days::new(u64::from(offset)))
            .ok_or_else(|| AppError::config("Sample date range overflows the calendar."))?;
        let date_text = date.format("%-d-%b-%Y").to_string();
        let season = seasonal_factor(date.month0());

        for state in STATES {
            for group in GROUPS {
                for time in TIMES {
                    let mean = BASE_UNITS * state_factor(state) * group_factor(group) * time_factor(time) * season;
                    let units = (mean * (1.0 + noise.sample(&mut rng))).round().max(2.0) as u64;

                    let sales = if rng.gen_bool(config.null_rate) {
                        nulls += 1;
                        None
                    } else {
                        Some(units as f64 * UNIT_PRICE)
                    };

                    let row = RawSalesRecord {
                        line: rows.len() + 2,
                        date: date_text.clone(),
                        state: state.to_string(),
                        group: group.to_string(),
                        time: time.to_string(),
                        sales,
                        unit: units,
                    };
                    let duplicate = rng.gen_bool(config.duplicate_rate);
                    rows.push(row.clone());
                    if duplicate {
                        duplicates += 1;
                        nulls += usize::from(row.sales.is_none());
                        rows.push(RawSalesRecord { line: rows.len() + 2, ..row });
                    }
                }
            }
        }
    }

    tracing::info!(rows = rows.len(), nulls, duplicates, seed = config.seed, "generated sample dataset");

    Ok(SampleData { rows, nulls, duplicates })
}

fn state_factor(state: &str) -> f64 {
    match state {
        "VIC" => 1.65,
        "NSW" => 1.35,
        "SA" => 1.0,
        "QLD" => 0.8,
        _ => 0.55,
    }
}

fn group_factor(group: &str) -> f64 {
    match group {
        "Men" => 1.02,
        "Women" => 1.01,
        "Kids" => 1.0,
        _ => 0.97,
    }
}

fn time_factor(time: &str) -> f64 {
    match time {
        "Morning" => 1.02,
        "Afternoon" => 1.0,
        _ => 0.99,
    }
}

/// Holiday trade lifts December.
fn seasonal_factor(month0: u32) -> f64 {
    if month0 == 11 { 1.15 } else { 1.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::path::PathBuf;

    fn config(seed: u64) -> SampleConfig {
        SampleConfig {
            out: PathBuf::from("unused.csv"),
            seed,
            start: NaiveDate::from_ymd_opt(2020, 10, 1).unwrap(),
            days: 3,
            null_rate: 0.0,
            duplicate_rate: 0.0,
        }
    }

    #[test]
    fn one_row_per_slot_per_day() {
        let data = generate_dataset(&config(7)).unwrap();
        assert_eq!(data.rows.len(), 3 * 7 * 4 * 3);
        assert_eq!(data.rows[0].date, "1-Oct-2020");
        assert!(data.rows.iter().all(|r| r.sales == Some(r.unit as f64 * UNIT_PRICE)));
    }

    #[test]
    fn same_seed_same_rows() {
        let a = generate_dataset(&config(42)).unwrap();
        let b = generate_dataset(&config(42)).unwrap();
        assert_eq!(a.rows, b.rows);
    }

    #[test]
    fn injected_nulls_and_duplicates_are_counted() {
        let mut cfg = config(1);
        cfg.days = 30;
        cfg.null_rate = 0.1;
        cfg.duplicate_rate = 0.1;
        let data = generate_dataset(&cfg).unwrap();
        assert_eq!(data.rows.len(), 30 * 84 + data.duplicates);
        assert!(data.nulls > 0);
        assert!(data.duplicates > 0);
        assert_eq!(data.rows.iter().filter(|r| r.sales.is_none()).count(), data.nulls);
    }

    #[test]
    fn rejects_bad_rates() {
        let mut cfg = config(1);
        cfg.null_rate = 1.0;
        assert!(generate_dataset(&cfg).is_err());
        let mut cfg = config(1);
        cfg.days = 0;
        assert!(generate_dataset(&cfg).is_err());
    }
}
