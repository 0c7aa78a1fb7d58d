//! Export tables to CSV and the run summary to JSON.
//!
//! The exports are meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::{File, create_dir_all};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Serialize;

use crate::analysis::{ColumnSummaries, GroupTotals, RankedEntry, Ranking, Resampled};
use crate::app::pipeline::RunOutput;
use crate::clean::CleanReport;
use crate::domain::RawSalesRecord;
use crate::error::AppError;
use crate::transform::NormalizationSummary;

#[derive(Serialize)]
struct RawCsvRow<'a> {
    #[serde(rename = "Date")]
    date: &'a str,
    #[serde(rename = "State")]
    state: &'a str,
    #[serde(rename = "Group")]
    group: &'a str,
    #[serde(rename = "Time")]
    time: &'a str,
    #[serde(rename = "Sales")]
    sales: Option<f64>,
    #[serde(rename = "Unit")]
    unit: u64,
}

#[derive(Serialize)]
struct CleanCsvRow<'a> {
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "State")]
    state: &'a str,
    #[serde(rename = "Group")]
    group: &'a str,
    #[serde(rename = "Time")]
    time: &'a str,
    #[serde(rename = "Sales")]
    sales: f64,
    #[serde(rename = "Unit")]
    unit: u64,
    #[serde(rename = "Sales_Normalized")]
    sales_normalized: Option<f64>,
}

#[derive(Serialize)]
struct RankingCsvRow<'a> {
    key: &'a str,
    value: f64,
    rank_desc: usize,
}

#[derive(Serialize)]
struct GroupTotalsCsvRow<'a> {
    group: &'a str,
    sales: f64,
    units: f64,
}

#[derive(Serialize)]
struct BucketCsvRow {
    start: NaiveDate,
    end: NaiveDate,
    sales: f64,
    units: u64,
    records: usize,
}

#[derive(Serialize)]
struct Summary<'a> {
    source: &'a str,
    clean: &'a CleanReport,
    normalization: &'a NormalizationSummary,
    stats: &'a ColumnSummaries,
    state_revenue_desc: Vec<RankedEntry>,
    highest_state: Option<&'a str>,
    lowest_state: Option<&'a str>,
    group_totals: &'a GroupTotals,
    time_of_day: &'a Ranking,
    total_sales: f64,
    total_units: u64,
}

fn csv_writer(path: &Path) -> Result<csv::Writer<File>, AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::export(format!("Failed to create export CSV '{}': {e}", path.display())))?;
    Ok(csv::Writer::from_writer(file))
}

fn write_rows<T: Serialize>(path: &Path, rows: impl IntoIterator<Item = T>) -> Result<(), AppError> {
    let mut writer = csv_writer(path)?;
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| AppError::export(format!("Failed to write row to '{}': {e}", path.display())))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::export(format!("Failed to flush '{}': {e}", path.display())))
}

/// Write rows in the input schema (used for synthetic datasets).
pub fn write_raw_csv(path: &Path, rows: &[RawSalesRecord]) -> Result<(), AppError> {
    write_rows(
        path,
        rows.iter().map(|r| RawCsvRow {
            date: &r.date,
            state: &r.state,
            group: &r.group,
            time: &r.time,
            sales: r.sales,
            unit: r.unit,
        }),
    )
}

/// Write one resampled series.
pub fn write_resampled_csv(path: &Path, series: &Resampled) -> Result<(), AppError> {
    write_rows(
        path,
        series.buckets.iter().map(|b| BucketCsvRow {
            start: b.start,
            end: b.end,
            sales: b.sales,
            units: b.units,
            records: b.records,
        }),
    )
}

fn write_ranking_csv(path: &Path, ranking: &Ranking) -> Result<(), AppError> {
    let desc = ranking.descending();
    write_rows(
        path,
        desc.iter().enumerate().map(|(i, e)| RankingCsvRow {
            key: &e.key,
            value: e.value,
            rank_desc: i + 1,
        }),
    )
}

/// Write every table of a run into `dir`; returns the files written.
pub fn write_run_exports(dir: &Path, run: &RunOutput) -> Result<Vec<PathBuf>, AppError> {
    create_dir_all(dir)
        .map_err(|e| AppError::export(format!("Failed to create export dir '{}': {e}", dir.display())))?;

    let mut written = Vec::new();

    let path = dir.join("cleaned.csv");
    write_rows(
        &path,
        run.table.iter().map(|r| CleanCsvRow {
            date: r.date,
            state: &r.state,
            group: &r.group,
            time: &r.time,
            sales: r.sales,
            unit: r.unit,
            sales_normalized: r.sales_normalized,
        }),
    )?;
    written.push(path);

    let path = dir.join("state_group_mean.csv");
    write_rows(&path, &run.state_group_means)?;
    written.push(path);

    let path = dir.join("state_revenue.csv");
    write_ranking_csv(&path, &run.state_revenue)?;
    written.push(path);

    let path = dir.join("group_totals.csv");
    write_rows(
        &path,
        run.group_totals.sales.entries.iter().map(|e| GroupTotalsCsvRow {
            group: &e.key,
            sales: e.value,
            units: run.group_totals.units.get(&e.key).unwrap_or_default(),
        }),
    )?;
    written.push(path);

    for series in &run.resampled {
        let path = dir.join(format!("resample_{}.csv", series.frequency.label()));
        write_resampled_csv(&path, series)?;
        written.push(path);
    }

    let path = dir.join("summary.json");
    write_summary_json(&path, run)?;
    written.push(path);

    tracing::info!(dir = %dir.display(), files = written.len(), "wrote exports");
    Ok(written)
}

fn write_summary_json(path: &Path, run: &RunOutput) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::export(format!("Failed to create summary JSON '{}': {e}", path.display())))?;

    let summary = Summary {
        source: &run.source,
        clean: &run.clean,
        normalization: &run.normalization,
        stats: &run.summaries,
        state_revenue_desc: run.state_revenue.descending(),
        highest_state: run.state_revenue.highest().map(|e| e.key.as_str()),
        lowest_state: run.state_revenue.lowest().map(|e| e.key.as_str()),
        group_totals: &run.group_totals,
        time_of_day: &run.time_of_day,
        total_sales: run.table.total_sales(),
        total_units: run.table.total_units(),
    };

    serde_json::to_writer_pretty(file, &summary)
        .map_err(|e| AppError::export(format!("Failed to write summary JSON: {e}")))
}
