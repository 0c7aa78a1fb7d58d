//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the cleaning/aggregation code stays clean and testable
//! - output changes are localized (important for snapshot tests)

use crate::analysis::{ColumnSummaries, Descriptive, GroupTotals, Pivot, Ranking, Resampled, StateGroupMean};
use crate::app::pipeline::RunOutput;
use crate::clean::CleanReport;
use crate::domain::{AnalysisConfig, Frequency, SalesRecord, SalesTable};
use crate::io::ingest::ColumnProfile;
use crate::report::Recommendation;

/// Format the complete EDA report for one run.
pub fn format_full_report(run: &RunOutput, config: &AnalysisConfig) -> String {
    let mut out = String::new();

    out.push_str(&format_run_header(run));
    out.push('\n');
    out.push_str(&format_head_tail(&run.table, config.head_rows));
    out.push('\n');
    out.push_str(&format_info(&run.profile));
    out.push('\n');
    out.push_str(&format_clean_report(&run.clean));
    out.push('\n');
    out.push_str(&format_describe(&run.summaries));
    out.push('\n');
    out.push_str(&format_state_group_means(&run.state_group_means));
    out.push('\n');
    out.push_str(&format_state_revenue(&run.state_revenue));
    out.push('\n');
    out.push_str(&format_group_totals(&run.group_totals));
    out.push('\n');
    out.push_str(&format_ranking("Time-of-day sales", "Time", "Sales", &run.time_of_day));
    out.push('\n');
    out.push_str(&format_pivot(&run.pivot));
    out.push('\n');

    for series in &run.resampled {
        out.push_str(&format_resampled(series, config.preview_buckets));
        out.push('\n');
    }

    if config.plot {
        out.push_str(&crate::plot::render_bar_chart("Sales by State", &run.state_revenue, config.plot_width));
        out.push('\n');
        out.push_str(&crate::plot::render_bar_chart("Sales by Group", &run.group_totals.sales, config.plot_width));
        out.push('\n');
        out.push_str(&crate::plot::render_bar_chart("Sales by Time of Day", &run.time_of_day, config.plot_width));
        out.push('\n');
        out.push_str(&crate::plot::render_heatmap(&run.pivot));
        out.push('\n');
        let sales: Vec<f64> = run.table.iter().map(|r| r.sales).collect();
        out.push_str(&crate::plot::render_histogram(&sales, 10, config.plot_width));
        out.push('\n');
        for frequency in [Frequency::Daily, Frequency::Weekly, Frequency::Monthly] {
            if let Some(series) = run.series(frequency) {
                out.push_str(&crate::plot::render_line_chart(series, config.plot_width, config.plot_height));
                out.push('\n');
            }
        }
    }

    out.push_str(&format_recommendations(&crate::report::build_recommendations(run)));
    out
}

/// Dataset banner: source, size, and date coverage.
pub fn format_run_header(run: &RunOutput) -> String {
    let mut out = String::new();
    out.push_str("=== sales - Quarterly Apparel Sales Analysis ===\n");
    out.push_str(&format!("Source: {}\n", run.source));
    out.push_str(&format!(
        "Rows: {} loaded | {} after cleaning\n",
        run.clean.rows_in, run.clean.rows_out
    ));
    if let Some((first, last)) = run.table.date_range() {
        out.push_str(&format!("Dates: {first} .. {last}\n"));
    }
    out.push_str(&format!(
        "Totals: sales={:.2} | units={}\n",
        run.table.total_sales(),
        run.table.total_units()
    ));
    out
}

/// First and last `n` rows of the table.
pub fn format_head_tail(table: &SalesTable, n: usize) -> String {
    let n = n.max(1);
    let len = table.len();
    let mut out = String::new();

    out.push_str(&format!("Head ({} of {len} rows):\n", n.min(len)));
    out.push_str(&format_records(&table.records[..n.min(len)], 0));
    out.push('\n');

    let start = len.saturating_sub(n);
    out.push_str(&format!("Tail ({} of {len} rows):\n", len - start));
    out.push_str(&format_records(&table.records[start..], start));

    out
}

/// Row table with a leading positional index.
pub fn format_records(records: &[SalesRecord], first_index: usize) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:>6} {:<10} {:<6} {:<8} {:<10} {:>12} {:>6} {:>10}\n",
            "", "Date", "State", "Group", "Time", "Sales", "Unit", "Sales_Norm"
        )
        .trim_end(),
    );
    out.push('\n');

    for (i, r) in records.iter().enumerate() {
        let norm = r
            .sales_normalized
            .map(|v| format!("{v:.4}"))
            .unwrap_or_else(|| "-".to_string());
        out.push_str(
            format!(
                "{:>6} {:<10} {:<6} {:<8} {:<10} {:>12.2} {:>6} {:>10}\n",
                first_index + i,
                r.date,
                truncate(&r.state, 6),
                truncate(&r.group, 8),
                truncate(&r.time, 10),
                r.sales,
                r.unit,
                norm
            )
            .trim_end(),
        );
        out.push('\n');
    }
    out
}

/// Column / non-null / dtype table of the loaded data.
pub fn format_info(profile: &[ColumnProfile]) -> String {
    let mut out = String::new();
    let rows = profile.first().map(|p| p.non_null + p.nulls).unwrap_or(0);
    out.push_str(&format!("Info ({rows} rows as loaded):\n"));
    out.push_str(&format!("{:<8} {:>10} {:>8} {:<8}\n", "Column", "Non-null", "Nulls", "Dtype"));
    out.push_str(&format!("{:-<8} {:->10} {:->8} {:-<8}\n", "", "", "", ""));
    for p in profile {
        out.push_str(&format!("{:<8} {:>10} {:>8} {:<8}\n", p.name, p.non_null, p.nulls, p.dtype));
    }
    out
}

pub fn format_clean_report(report: &CleanReport) -> String {
    let mut out = String::new();
    out.push_str("Cleaning:\n");
    match report.imputed_value {
        Some(v) => out.push_str(&format!(
            "- null Sales imputed: {} (filled with mean {v:.4})\n",
            report.nulls_imputed
        )),
        None => out.push_str("- null Sales imputed: 0\n"),
    }
    out.push_str(&format!("- duplicate rows removed: {}\n", report.duplicates_removed));
    out.push_str(&format!("- rows: {} -> {}\n", report.rows_in, report.rows_out));
    out
}

/// Describe table for Sales and Unit, followed by the headline statistics.
pub fn format_describe(summaries: &ColumnSummaries) -> String {
    let s = &summaries.sales;
    let u = &summaries.unit;
    let mut out = String::new();

    out.push_str("Descriptive statistics (std = sample std, n-1):\n");
    out.push_str(&format!("{:<7} {:>16} {:>12}\n", "", "Sales", "Unit"));
    let rows: [(&str, f64, f64); 7] = [
        ("mean", s.mean, u.mean),
        ("min", s.min, u.min),
        ("25%", s.q1, u.q1),
        ("50%", s.median, u.median),
        ("75%", s.q3, u.q3),
        ("max", s.max, u.max),
        ("mode", s.mode, u.mode),
    ];
    out.push_str(&format!("{:<7} {:>16} {:>12}\n", "count", s.count, u.count));
    for (label, sv, uv) in rows {
        out.push_str(&format!("{label:<7} {sv:>16.4} {uv:>12.4}\n"));
    }
    out.push_str(&format!("{:<7} {:>16} {:>12}\n", "std", fmt_std(s), fmt_std(u)));

    out.push('\n');
    out.push_str(&format_headline("Sales", s));
    out.push_str(&format_headline("Unit", u));
    out
}

fn format_headline(name: &str, d: &Descriptive) -> String {
    format!(
        "{name}: mean={:.4} median={:.4} mode={:.4} std={}\n",
        d.mean,
        d.median,
        d.mode,
        fmt_std(d).trim()
    )
}

fn fmt_std(d: &Descriptive) -> String {
    d.std.map(|v| format!("{v:.4}")).unwrap_or_else(|| "n/a".to_string())
}

pub fn format_state_group_means(means: &[StateGroupMean]) -> String {
    let mut out = String::new();
    out.push_str("Mean sales by State and Group:\n");
    out.push_str(&format!("{:<8} {:<10} {:>14} {:>6}\n", "State", "Group", "Mean Sales", "Rows"));
    out.push_str(&format!("{:-<8} {:-<10} {:->14} {:->6}\n", "", "", "", ""));
    for m in means {
        out.push_str(&format!(
            "{:<8} {:<10} {:>14.2} {:>6}\n",
            truncate(&m.state, 8),
            truncate(&m.group, 10),
            m.mean_sales,
            m.rows
        ));
    }
    out
}

/// A ranking in descending order with share of total.
pub fn format_ranking(title: &str, key_header: &str, value_header: &str, ranking: &Ranking) -> String {
    let total = ranking.total();
    let mut out = String::new();
    out.push_str(&format!("{title}:\n"));
    out.push_str(&format_ranking_rows(key_header, value_header, &ranking.descending(), total));
    out
}

fn format_ranking_rows(
    key_header: &str,
    value_header: &str,
    entries: &[crate::analysis::RankedEntry],
    total: f64,
) -> String {
    let mut out = String::new();
    out.push_str(&format!("{key_header:<12} {value_header:>16} {:>7}\n", "Share"));
    out.push_str(&format!("{:-<12} {:->16} {:->7}\n", "", "", ""));
    for e in entries {
        let share = if total > 0.0 { e.value / total * 100.0 } else { 0.0 };
        out.push_str(&format!("{:<12} {:>16.2} {:>6.1}%\n", truncate(&e.key, 12), e.value, share));
    }
    out
}

pub fn format_state_revenue(ranking: &Ranking) -> String {
    let total = ranking.total();
    let mut out = String::new();

    out.push_str("States by revenue (highest first):\n");
    out.push_str(&format_ranking_rows("State", "Sales", &ranking.descending(), total));
    out.push('\n');
    out.push_str("States by revenue (lowest first):\n");
    out.push_str(&format_ranking_rows("State", "Sales", &ranking.ascending(), total));
    out.push('\n');

    if let (Some(hi), Some(lo)) = (ranking.highest(), ranking.lowest()) {
        out.push_str(&format!("State with highest revenue: {} ({:.2})\n", hi.key, hi.value));
        out.push_str(&format!("State with lowest revenue: {} ({:.2})\n", lo.key, lo.value));
    }
    out
}

pub fn format_group_totals(totals: &GroupTotals) -> String {
    let mut out = String::new();
    out.push_str(&format_ranking("Sales by Group", "Group", "Sales", &totals.sales));
    out.push('\n');
    out.push_str(&format_ranking("Units by Group", "Group", "Units", &totals.units));
    out.push('\n');

    if let (Some(hi), Some(lo)) = (totals.sales.highest(), totals.sales.lowest()) {
        out.push_str(&format!("Group with highest sales: {} ({:.2})\n", hi.key, hi.value));
        out.push_str(&format!("Group with lowest sales: {} ({:.2})\n", lo.key, lo.value));
    }
    if let (Some(hi), Some(lo)) = (totals.units.highest(), totals.units.lowest()) {
        out.push_str(&format!("Group with highest units: {} ({:.0})\n", hi.key, hi.value));
        out.push_str(&format!("Group with lowest units: {} ({:.0})\n", lo.key, lo.value));
    }
    out
}

/// State × Group pivot of summed Sales.
pub fn format_pivot(pivot: &Pivot) -> String {
    let mut out = String::new();
    out.push_str("Sales by State x Group:\n");

    let mut header = format!("{:<8}", "State");
    for g in &pivot.groups {
        header.push_str(&format!(" {:>14}", truncate(g, 14)));
    }
    out.push_str(header.trim_end());
    out.push('\n');

    for (state, row) in pivot.states.iter().zip(&pivot.cells) {
        let mut line = format!("{:<8}", truncate(state, 8));
        for cell in row {
            let text = cell.map(|v| format!("{v:.1}")).unwrap_or_else(|| "-".to_string());
            line.push_str(&format!(" {text:>14}"));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// First `limit` buckets of a resampled series.
pub fn format_resampled(series: &Resampled, limit: usize) -> String {
    let mut out = String::new();
    let shown = limit.max(1).min(series.buckets.len());
    out.push_str(&format!(
        "{} report ({shown} of {} buckets):\n",
        series.frequency.title(),
        series.buckets.len()
    ));
    out.push_str(&format!(
        "{:<10} {:<10} {:>16} {:>8} {:>7}\n",
        "Start", "End", "Sales", "Units", "Rows"
    ));
    out.push_str(&format!("{:-<10} {:-<10} {:->16} {:->8} {:->7}\n", "", "", "", "", ""));
    for b in series.buckets.iter().take(shown) {
        out.push_str(&format!(
            "{:<10} {:<10} {:>16.2} {:>8} {:>7}\n",
            b.start, b.end, b.sales, b.units, b.records
        ));
    }
    out
}

pub fn format_recommendations(recs: &[Recommendation]) -> String {
    let mut out = String::new();
    out.push_str("Recommendations:\n");
    for (i, rec) in recs.iter().enumerate() {
        out.push_str(&format!("\n{}. {}\n", i + 1, rec.heading));
        for line in &rec.lines {
            out.push_str(&format!("   - {line}\n"));
        }
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::RankedEntry;
    use chrono::NaiveDate;

    fn rec(day: u32, state: &str, sales: f64) -> SalesRecord {
        SalesRecord {
            date: NaiveDate::from_ymd_opt(2020, 10, day).unwrap(),
            state: state.to_string(),
            group: "Kids".to_string(),
            time: "Morning".to_string(),
            sales,
            unit: 2,
            sales_normalized: Some(0.5),
        }
    }

    #[test]
    fn head_tail_show_positional_indices() {
        let table = SalesTable::new((1..=5).map(|d| rec(d, "WA", d as f64)).collect());
        let txt = format_head_tail(&table, 2);
        assert!(txt.starts_with("Head (2 of 5 rows):\n"));
        assert!(txt.contains("Tail (2 of 5 rows):\n"));
        assert!(txt.contains("     3 2020-10-04"), "{txt}");
        assert!(txt.contains("     4 2020-10-05"), "{txt}");
    }

    #[test]
    fn ranking_table_lists_shares() {
        let ranking = Ranking {
            entries: vec![
                RankedEntry { key: "WA".to_string(), value: 25.0 },
                RankedEntry { key: "VIC".to_string(), value: 75.0 },
            ],
        };
        let txt = format_ranking("States", "State", "Sales", &ranking);
        let expected = concat!(
            "States:\n",
            "State                   Sales   Share\n",
            "------------ ---------------- -------\n",
            "VIC                     75.00   75.0%\n",
            "WA                      25.00   25.0%\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn describe_prints_na_for_single_row_std() {
        let summaries = ColumnSummaries {
            sales: Descriptive::from_values(&[10.0]).unwrap(),
            unit: Descriptive::from_values(&[1.0]).unwrap(),
        };
        let txt = format_describe(&summaries);
        assert!(txt.contains("Sales: mean=10.0000 median=10.0000 mode=10.0000 std=n/a"), "{txt}");
    }

    #[test]
    fn pivot_marks_missing_pairs() {
        let pivot = Pivot {
            states: vec!["WA".to_string()],
            groups: vec!["Kids".to_string(), "Men".to_string()],
            cells: vec![vec![Some(12.5), None]],
        };
        let txt = format_pivot(&pivot);
        assert!(txt.ends_with("WA                 12.5              -\n"), "{txt}");
    }

    #[test]
    fn truncate_marks_cut_text() {
        assert_eq!(truncate("Afternoon", 10), "Afternoon");
        assert_eq!(truncate("Afternoon", 5), "Afte.");
    }
}
