//! CSV ingest.
//!
//! This module is responsible for turning a sales CSV into a `RawTable`:
//! rows with the fixed `Date, State, Group, Time, Sales, Unit` schema, with
//! Sales nulls preserved (imputation is the cleaning stage's job) and dates
//! kept as text.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors, `LoadError`)
//! - **No silent row drops**: a malformed row aborts the load with its line number
//! - **Separation of concerns**: no cleaning or aggregation logic here

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use serde::Serialize;

use crate::domain::{MAX_UNIT, RawSalesRecord, RawTable, REQUIRED_COLUMNS};
use crate::error::AppError;

/// Cell values treated as a missing Sales figure.
const NULL_MARKERS: [&str; 9] = ["", "na", "n/a", "nan", "null", "none", "<na>", "nat", "-"];

/// Load a sales CSV from disk.
pub fn load_sales_csv(path: &Path) -> Result<RawTable, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::load(format!("Failed to open CSV '{}': {e}", path.display())))?;
    load_sales_reader(file, &path.display().to_string())
}

/// Load sales rows from any reader (files, in-memory buffers in tests).
pub fn load_sales_reader<R: Read>(reader: R, source: &str) -> Result<RawTable, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::load(format!("Failed to read CSV headers from '{source}': {e}")))?
        .clone();

    let header_map = build_header_map(&headers);
    ensure_required_columns_exist(&header_map)?;

    let mut records = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header, and lines are 1-based.
        let line = idx + 2;
        let record =
            result.map_err(|e| AppError::load(format!("CSV parse error on line {line}: {e}")))?;

        let row = parse_row(&record, &header_map, line)
            .map_err(|e| AppError::load(format!("Line {line}: {e}")))?;
        records.push(row);
    }

    tracing::info!(source, rows = records.len(), "loaded sales rows");

    Ok(RawTable {
        records,
        source: source.to_string(),
    })
}

/// Per-column non-null count of a loaded table (the `info` view).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnProfile {
    pub name: &'static str,
    pub non_null: usize,
    pub nulls: usize,
    pub dtype: &'static str,
}

/// Profile the six schema columns before any cleaning.
pub fn profile_columns(raw: &RawTable) -> Vec<ColumnProfile> {
    let rows = raw.len();
    let count = |pred: fn(&RawSalesRecord) -> bool| raw.records.iter().filter(|r| pred(r)).count();

    let non_null = [
        count(|r| !r.date.is_empty()),
        count(|r| !r.state.is_empty()),
        count(|r| !r.group.is_empty()),
        count(|r| !r.time.is_empty()),
        count(|r| r.sales.is_some()),
        rows,
    ];
    let dtypes = ["text", "text", "text", "text", "float", "integer"];

    REQUIRED_COLUMNS
        .iter()
        .zip(non_null)
        .zip(dtypes)
        .map(|((&name, non_null), dtype)| ColumnProfile {
            name,
            non_null,
            nulls: rows - non_null,
            dtype,
        })
        .collect()
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn ensure_required_columns_exist(header_map: &HashMap<String, usize>) -> Result<(), AppError> {
    for column in REQUIRED_COLUMNS {
        if !header_map.contains_key(&column.to_ascii_lowercase()) {
            return Err(AppError::load(format!("Missing required column: `{column}`")));
        }
    }
    Ok(())
}

fn parse_row(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    line: usize,
) -> Result<RawSalesRecord, String> {
    let date = get_text(record, header_map, "date").to_string();
    let state = get_text(record, header_map, "state").to_string();
    let group = get_text(record, header_map, "group").to_string();
    let time = get_text(record, header_map, "time").to_string();
    let sales = parse_sales(get_text(record, header_map, "sales"))?;
    let unit = parse_unit(get_text(record, header_map, "unit"))?;

    Ok(RawSalesRecord {
        line,
        date,
        state,
        group,
        time,
        sales,
        unit,
    })
}

/// A missing trailing cell on a short row reads as empty.
fn get_text<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, name: &str) -> &'a str {
    header_map
        .get(name)
        .and_then(|idx| record.get(*idx))
        .map(str::trim)
        .unwrap_or("")
}

fn is_null_marker(s: &str) -> bool {
    NULL_MARKERS.iter().any(|m| s.eq_ignore_ascii_case(m))
}

fn parse_sales(s: &str) -> Result<Option<f64>, String> {
    if is_null_marker(s) {
        return Ok(None);
    }
    let v = s
        .parse::<f64>()
        .map_err(|_| format!("Invalid `Sales` value '{s}' (expected a number)."))?;
    if !v.is_finite() || v < 0.0 {
        return Err(format!("Invalid `Sales` value '{s}' (must be finite and >= 0)."));
    }
    Ok(Some(v))
}

fn parse_unit(s: &str) -> Result<u64, String> {
    if is_null_marker(s) {
        return Err("Missing `Unit` value.".to_string());
    }
    let unit = match s.parse::<u64>() {
        Ok(v) => Some(v),
        // Exports that went through a float column write `8.0`.
        Err(_) => match s.parse::<f64>() {
            Ok(v) if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= MAX_UNIT as f64 => Some(v as u64),
            _ => None,
        },
    };
    match unit {
        Some(v) if v <= MAX_UNIT => Ok(v),
        Some(_) => Err(format!("`Unit` value '{s}' exceeds the maximum of {MAX_UNIT}.")),
        None => Err(format!("Invalid `Unit` value '{s}' (expected a non-negative integer).")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn load(text: &str) -> Result<RawTable, AppError> {
        load_sales_reader(text.as_bytes(), "<memory>")
    }

    #[test]
    fn loads_rows_and_keeps_nulls() {
        let table = load(
            "Date,State,Group,Time,Sales,Unit\n\
             1-Oct-2020,WA,Kids,Morning,20000,8\n\
             1-Oct-2020,WA,Men,Morning,,10\n\
             1-Oct-2020,WA,Women,Morning,NaN,4.0\n",
        )
        .unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.records[0].sales, Some(20000.0));
        assert_eq!(table.records[0].line, 2);
        assert_eq!(table.records[1].sales, None);
        assert_eq!(table.records[2].sales, None);
        assert_eq!(table.records[2].unit, 4);
        assert_eq!(table.records[0].date, "1-Oct-2020");
    }

    #[test]
    fn headers_match_case_insensitively_with_bom() {
        let table = load("\u{feff}date, STATE ,group,time,sales,unit\n2020-01-01,NSW,Men,Morning,1,1\n").unwrap();
        assert_eq!(table.records[0].state, "NSW");
    }

    #[test]
    fn missing_column_is_load_error() {
        let err = load("Date,State,Group,Time,Unit\n2020-01-01,NSW,Men,Morning,1\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Load);
        assert!(err.message().contains("`Sales`"), "{err}");
    }

    #[test]
    fn header_only_file_loads_empty_table() {
        let table = load("Date,State,Group,Time,Sales,Unit\n").unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn bad_sales_value_reports_line() {
        let err = load(
            "Date,State,Group,Time,Sales,Unit\n\
             2020-01-01,NSW,Men,Morning,100,2\n\
             2020-01-02,NSW,Men,Morning,abc,2\n",
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Load);
        assert!(err.message().starts_with("Line 3:"), "{err}");
    }

    #[test]
    fn negative_sales_and_fractional_units_are_rejected() {
        assert!(parse_sales("-5").is_err());
        assert!(parse_unit("2.5").is_err());
        assert!(parse_unit("-1").is_err());
        assert!(parse_unit("").is_err());
        assert_eq!(parse_unit("12").unwrap(), 12);
    }

    #[test]
    fn oversized_units_are_rejected() {
        assert_eq!(parse_unit("4294967295").unwrap(), MAX_UNIT);
        assert_eq!(parse_unit("4294967295.0").unwrap(), MAX_UNIT);
        assert!(parse_unit("4294967296").is_err());
        assert!(parse_unit("18446744073709551615").is_err());
        assert!(parse_unit("18446744073709551616.0").is_err());

        let err = load(
            "Date,State,Group,Time,Sales,Unit\n\
             2020-01-01,NSW,Men,Morning,100,2\n\
             2020-01-02,NSW,Men,Morning,100,18446744073709551615\n",
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Load);
        assert!(err.message().starts_with("Line 3:"), "{err}");
        assert!(err.message().contains("exceeds the maximum"), "{err}");
    }

    #[test]
    fn profile_counts_nulls_per_column() {
        let table = load(
            "Date,State,Group,Time,Sales,Unit\n\
             1-Oct-2020,WA,Kids,Morning,,8\n\
             1-Oct-2020,,Men,Morning,5,10\n",
        )
        .unwrap();
        let profile = profile_columns(&table);
        let by_name = |n: &str| profile.iter().find(|p| p.name == n).unwrap().clone();
        assert_eq!(by_name("Sales").nulls, 1);
        assert_eq!(by_name("State").nulls, 1);
        assert_eq!(by_name("Unit").non_null, 2);
        assert_eq!(by_name("Date").dtype, "text");
    }

    #[test]
    fn missing_file_is_load_error() {
        let err = load_sales_csv(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Load);
    }
}
