//! Exact-duplicate removal over parsed records.

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::domain::SalesRecord;

/// Identity of a record across all six attributes.
///
/// The date is the parsed calendar day, so `2020-10-01` and `1-Oct-2020`
/// are the same row. Sales compares by bit pattern so that equal floats
/// hash equally.
type RowKey<'a> = (NaiveDate, &'a str, &'a str, &'a str, u64, u64);

fn row_key(record: &SalesRecord) -> RowKey<'_> {
    (
        record.date,
        record.state.as_str(),
        record.group.as_str(),
        record.time.as_str(),
        normalized_bits(record.sales),
        record.unit,
    )
}

fn normalized_bits(v: f64) -> u64 {
    // -0.0 and 0.0 are the same amount.
    if v == 0.0 { 0.0_f64.to_bits() } else { v.to_bits() }
}

/// Keep the first occurrence of each distinct record, preserving order.
///
/// Returns the surviving records and how many were dropped.
pub fn drop_duplicates(records: Vec<SalesRecord>) -> (Vec<SalesRecord>, usize) {
    let keep: Vec<bool> = {
        let mut seen: HashSet<RowKey<'_>> = HashSet::with_capacity(records.len());
        records.iter().map(|r| seen.insert(row_key(r))).collect()
    };

    let before = records.len();
    let unique: Vec<SalesRecord> = records
        .into_iter()
        .zip(keep)
        .filter_map(|(r, k)| k.then_some(r))
        .collect();
    let removed = before - unique.len();
    (unique, removed)
}
