//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - resolves the input CSV (flag, env, or picker)
//! - runs the load/clean/aggregate pipeline
//! - prints reports/plots
//! - writes optional exports

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use clap::Parser;

use crate::cli::{Command, DataArgs, ReportArgs, ResampleArgs, SampleArgs};
use crate::domain::{AnalysisConfig, SampleConfig};
use crate::error::AppError;

pub mod pipeline;

/// Environment variable consulted when `--csv` is not given.
pub const CSV_ENV_VAR: &str = "SALES_CSV";

const MIN_PLOT_WIDTH: usize = 20;
const MIN_PLOT_HEIGHT: usize = 5;

/// Entry point for the `sales` binary.
pub fn run() -> Result<(), AppError> {
    // A missing .env is fine; variables may come from the shell.
    dotenvy::dotenv().ok();

    // We want `sales` and `sales --csv data.csv` to behave like `sales report ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    // Log lines would tear the alternate screen, so the TUI is silent by default.
    let default_level = match cli.command {
        Command::Tui(_) => "off",
        _ => "warn",
    };
    crate::logging::init_tracing(default_level);

    match cli.command {
        Command::Report(args) => handle_report(args),
        Command::Resample(args) => handle_resample(args),
        Command::Sample(args) => handle_sample(args),
        Command::Tui(args) => handle_tui(args),
    }
}

fn handle_report(args: ReportArgs) -> Result<(), AppError> {
    let config = config_from_args(&args)?;
    let run = pipeline::run_analysis(&config)?;

    println!("{}", crate::report::format::format_full_report(&run, &config));

    if let Some(dir) = &config.export_dir {
        let written = crate::io::export::write_run_exports(dir, &run)?;
        println!("Exported {} file(s) to {}", written.len(), dir.display());
    }
    Ok(())
}

fn handle_resample(args: ResampleArgs) -> Result<(), AppError> {
    let config = analysis_config(&args.data)?;
    let table = pipeline::prepare_table(&config)?;
    let series = crate::analysis::resample(&table, args.freq, config.week_end)?;

    println!("{}", crate::report::format::format_resampled(&series, series.buckets.len()));
    println!(
        "Total: sales={:.2} | units={}",
        series.total_sales(),
        series.total_units()
    );

    if !args.no_plot {
        let (width, height) = clamp_plot_size(args.width, args.height);
        println!();
        println!("{}", crate::plot::render_line_chart(&series, width, height));
    }

    if let Some(path) = &args.export {
        crate::io::export::write_resampled_csv(path, &series)?;
        println!("Exported {} bucket(s) to {}", series.buckets.len(), path.display());
    }
    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let config = sample_config_from_args(&args);
    let data = crate::data::sample::generate_dataset(&config)?;
    crate::io::export::write_raw_csv(&config.out, &data.rows)?;

    println!(
        "Wrote {} row(s) to {} ({} null Sales, {} duplicate(s), seed {})",
        data.rows.len(),
        config.out.display(),
        data.nulls,
        data.duplicates,
        config.seed
    );
    Ok(())
}

fn handle_tui(args: DataArgs) -> Result<(), AppError> {
    let config = analysis_config(&args)?;
    crate::tui::run(config)
}

/// Build the report configuration, validating numeric flags.
pub fn config_from_args(args: &ReportArgs) -> Result<AnalysisConfig, AppError> {
    if args.head == 0 {
        return Err(AppError::config("--head must be at least 1."));
    }
    if args.buckets == 0 {
        return Err(AppError::config("--buckets must be at least 1."));
    }

    let (plot_width, plot_height) = clamp_plot_size(args.width, args.height);
    let mut config = analysis_config(&args.data)?;
    config.head_rows = args.head;
    config.preview_buckets = args.buckets;
    config.plot = !args.no_plot;
    config.plot_width = plot_width;
    config.plot_height = plot_height;
    config.export_dir = args.export_dir.clone();
    Ok(config)
}

/// Configuration with report defaults for the shared data flags.
fn analysis_config(data: &DataArgs) -> Result<AnalysisConfig, AppError> {
    let env_path = std::env::var_os(CSV_ENV_VAR).map(PathBuf::from);
    let csv_path = resolve_csv_path(data.csv.as_deref(), env_path)?;
    tracing::debug!(path = %csv_path.display(), "resolved input CSV");

    Ok(AnalysisConfig {
        csv_path,
        week_end: data.week_end,
        degenerate: data.degenerate,
        head_rows: 5,
        preview_buckets: 10,
        plot: true,
        plot_width: 60,
        plot_height: 15,
        export_dir: None,
    })
}

/// `--csv` wins, then `SALES_CSV`, then the interactive picker.
///
/// Explicit paths are passed through untouched so that a missing file
/// surfaces as a load failure, not a configuration one.
fn resolve_csv_path(flag: Option<&Path>, env_path: Option<PathBuf>) -> Result<PathBuf, AppError> {
    if let Some(path) = flag {
        return Ok(path.to_path_buf());
    }
    if let Some(path) = env_path.filter(|p| !p.as_os_str().is_empty()) {
        return Ok(path);
    }
    if !std::io::stdin().is_terminal() {
        return Err(AppError::config(format!(
            "No input CSV. Pass --csv <file.csv> or set {CSV_ENV_VAR}."
        )));
    }
    crate::cli::picker::prompt_for_csv_path()
}

fn sample_config_from_args(args: &SampleArgs) -> SampleConfig {
    SampleConfig {
        out: args.out.clone(),
        seed: args.seed,
        start: args.start,
        days: args.days,
        null_rate: args.null_rate,
        duplicate_rate: args.duplicate_rate,
    }
}

fn clamp_plot_size(width: usize, height: usize) -> (usize, usize) {
    (width.max(MIN_PLOT_WIDTH), height.max(MIN_PLOT_HEIGHT))
}

/// Rewrite argv so `sales` defaults to `sales report`.
///
/// Rules:
/// - `sales`                        -> `sales report`
/// - `sales --csv data.csv ...`     -> `sales report --csv data.csv ...`
/// - `sales --help/--version/-h`    -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("report".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    // If the first token is a flag, treat it as "report flags".
    if arg1.starts_with('-') {
        argv.insert(1, "report".to_string());
    }
    argv
}
