//! Command-line parsing for the sales analysis tool.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the cleaning/aggregation code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::{DegeneratePolicy, Frequency, WeekEnd};

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "sales", version, about = "Quarterly apparel sales EDA: clean, aggregate, resample")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the full pipeline and print the EDA report.
    Report(ReportArgs),
    /// Print a single resampled table (and line chart).
    Resample(ResampleArgs),
    /// Write a synthetic sales CSV.
    Sample(SampleArgs),
    /// Launch the interactive TUI.
    ///
    /// This uses the same underlying pipeline as `sales report`, but renders
    /// results in a terminal UI using Ratatui.
    Tui(DataArgs),
}

/// Options shared by every command that reads a sales CSV.
#[derive(Debug, Args, Clone)]
pub struct DataArgs {
    /// Sales CSV to analyse (falls back to `SALES_CSV`, then an interactive picker).
    #[arg(short = 'f', long, value_name = "CSV")]
    pub csv: Option<PathBuf>,

    /// Weekday on which weekly buckets end.
    #[arg(long, value_enum, default_value_t = WeekEnd::Sun)]
    pub week_end: WeekEnd,

    /// Behaviour when every Sales value is identical (normalization only;
    /// `resample` does not normalize).
    #[arg(long = "degenerate-range", value_enum, default_value_t = DegeneratePolicy::Error)]
    pub degenerate: DegeneratePolicy,
}

#[derive(Debug, Args, Clone)]
pub struct ReportArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Rows shown in the head/tail previews.
    #[arg(long, default_value_t = 5)]
    pub head: usize,

    /// Buckets shown per resampled table.
    #[arg(long, default_value_t = 10)]
    pub buckets: usize,

    /// Disable the terminal charts.
    #[arg(long)]
    pub no_plot: bool,

    /// Chart width (columns).
    #[arg(long, default_value_t = 60)]
    pub width: usize,

    /// Line chart height (rows).
    #[arg(long, default_value_t = 15)]
    pub height: usize,

    /// Write cleaned data, aggregates and a JSON summary into this directory.
    #[arg(long, value_name = "DIR")]
    pub export_dir: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct ResampleArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Bucket granularity.
    #[arg(long, value_enum, default_value_t = Frequency::Weekly)]
    pub freq: Frequency,

    /// Write the full bucket table to this CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Disable the line chart.
    #[arg(long)]
    pub no_plot: bool,

    /// Chart width (columns).
    #[arg(long, default_value_t = 60)]
    pub width: usize,

    /// Chart height (rows).
    #[arg(long, default_value_t = 15)]
    pub height: usize,
}

#[derive(Debug, Args, Clone)]
pub struct SampleArgs {
    /// Output CSV path.
    #[arg(long, value_name = "CSV")]
    pub out: PathBuf,

    /// Random seed (same seed, same file).
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// First calendar day of the dataset.
    #[arg(long, default_value = "2020-10-01", value_parser = parse_iso_date)]
    pub start: NaiveDate,

    /// Number of consecutive days to generate.
    #[arg(long, default_value_t = 92)]
    pub days: u32,

    /// Probability that a row's Sales cell is left empty.
    #[arg(long, default_value_t = 0.0)]
    pub null_rate: f64,

    /// Probability that a row is written twice.
    #[arg(long, default_value_t = 0.0)]
    pub duplicate_rate: f64,
}

fn parse_iso_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD ({e})"))
}
