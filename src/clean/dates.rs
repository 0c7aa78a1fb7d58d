//! Date normalization.

use chrono::NaiveDate;

/// Accepted date layouts, tried in order.
///
/// The source data is Australian, so ambiguous numeric dates are day-first.
const FMTS: [&str; 6] = ["%Y-%m-%d", "%d-%b-%Y", "%d %b %Y", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];

/// Parse a date cell into a calendar date.
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    let s = s.trim();
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    Err(format!(
        "Invalid date '{s}'. Expected one of: YYYY-MM-DD, D-Mon-YYYY, D Mon YYYY, DD/MM/YYYY, DD-MM-YYYY, YYYY/MM/DD."
    ))
}
