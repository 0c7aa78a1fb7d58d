//! Shared analysis pipeline used by the report, export, and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load -> clean -> normalize -> aggregate -> resample
//!
//! The front-ends can then focus on presentation (printing vs widgets).

use crate::analysis::{
    ColumnSummaries, GroupTotals, Pivot, Ranking, Resampled, StateGroupMean, describe_sales_and_units, group_totals,
    mean_sales_by_state_group, resample_all, state_group_pivot, state_revenue, time_of_day_sales,
};
use crate::clean::{CleanReport, clean};
use crate::domain::{AnalysisConfig, Frequency, RawTable, SalesTable};
use crate::error::AppError;
use crate::io::ingest::{ColumnProfile, load_sales_csv, profile_columns};
use crate::transform::{NormalizationSummary, normalize_sales};

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub source: String,
    /// Column profile of the table as loaded, before cleaning.
    pub profile: Vec<ColumnProfile>,
    pub clean: CleanReport,
    pub table: SalesTable,
    pub normalization: NormalizationSummary,
    pub summaries: ColumnSummaries,
    pub state_group_means: Vec<StateGroupMean>,
    pub state_revenue: Ranking,
    pub group_totals: GroupTotals,
    pub time_of_day: Ranking,
    pub pivot: Pivot,
    /// One series per granularity, finest first.
    pub resampled: Vec<Resampled>,
}

/// Execute the full pipeline against the configured CSV.
pub fn run_analysis(config: &AnalysisConfig) -> Result<RunOutput, AppError> {
    let raw = load_sales_csv(&config.csv_path)?;
    run_analysis_on(raw, config)
}

/// Execute the pipeline on an already-loaded table.
pub fn run_analysis_on(raw: RawTable, config: &AnalysisConfig) -> Result<RunOutput, AppError> {
    let source = raw.source.clone();
    let profile = profile_columns(&raw);

    // 1) Clean: impute, dedup, parse dates.
    let (mut table, clean_report) = clean(raw)?;

    // 2) Transform in place.
    let normalization = normalize_sales(&mut table, config.degenerate)?;

    // 3) Read-only aggregations.
    let summaries = describe_sales_and_units(&table)?;
    let state_group_means = mean_sales_by_state_group(&table)?;
    let state_revenue = state_revenue(&table)?;
    let group_totals = group_totals(&table)?;
    let time_of_day = time_of_day_sales(&table)?;
    let pivot = state_group_pivot(&table)?;

    // 4) Calendar rollups.
    let resampled = resample_all(&table, config.week_end)?;

    Ok(RunOutput {
        source,
        profile,
        clean: clean_report,
        table,
        normalization,
        summaries,
        state_group_means,
        state_revenue,
        group_totals,
        time_of_day,
        pivot,
        resampled,
    })
}

/// Load and clean, skipping normalization and the aggregation passes.
///
/// Used by commands that only need the cleaned rows (`sales resample`), so a
/// constant Sales column is not an error here.
pub fn prepare_table(config: &AnalysisConfig) -> Result<SalesTable, AppError> {
    let raw = load_sales_csv(&config.csv_path)?;
    let (table, _) = clean(raw)?;
    Ok(table)
}

impl RunOutput {
    /// The resampled series for one granularity.
    pub fn series(&self, frequency: Frequency) -> Option<&Resampled> {
        self.resampled.iter().find(|s| s.frequency == frequency)
    }
}
