//! Interactive CSV picker.
//!
//! This is intentionally kept separate from clap parsing:
//! - clap handles structured flags/subcommands
//! - the picker provides the "run `sales` and choose a CSV" UX
//!
//! The picker searches for `*.csv` files under the current working directory.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use crate::error::AppError;

/// Default directory recursion depth for finding CSV files.
const DEFAULT_SEARCH_DEPTH: usize = 4;

const HINT: &str = "Provide one with `sales report --csv <file.csv>` or set `SALES_CSV`.";

/// Prompt the user to select a CSV file from the current directory tree.
///
/// Behavior:
/// - list discovered `*.csv` files
/// - accept either a number (from the list) or an explicit path
/// - `q` cancels
pub fn prompt_for_csv_path() -> Result<PathBuf, AppError> {
    let files = discover_csv_files(Path::new("."));
    if files.is_empty() {
        return Err(AppError::config(format!("No .csv files found. {HINT}")));
    }
    let stdin = io::stdin();
    choose_csv(&files, &mut stdin.lock(), &mut io::stdout())
}

/// Selection loop over any input/output pair.
fn choose_csv<R: BufRead, W: Write>(files: &[PathBuf], input: &mut R, out: &mut W) -> Result<PathBuf, AppError> {
    let io_err = |e: io::Error| AppError::config(format!("Picker I/O failed: {e}"));

    writeln!(out, "Found {} CSV file(s):", files.len()).map_err(io_err)?;
    for (idx, path) in files.iter().enumerate() {
        writeln!(out, "{:>3}) {}", idx + 1, pretty_path(path)).map_err(io_err)?;
    }

    loop {
        write!(out, "Select a file by number (1-{}) or type a path (q to quit): ", files.len()).map_err(io_err)?;
        out.flush().map_err(io_err)?;

        let mut line = String::new();
        if input.read_line(&mut line).map_err(io_err)? == 0 {
            return Err(AppError::config(format!("No input received. {HINT}")));
        }

        let line = line.trim();
        if line.eq_ignore_ascii_case("q") {
            return Err(AppError::config("Canceled."));
        }

        if let Ok(choice) = line.parse::<usize>() {
            if (1..=files.len()).contains(&choice) {
                return validate_csv_path(&files[choice - 1]);
            }
            writeln!(out, "Invalid choice: {choice}. Enter a number between 1 and {}.", files.len())
                .map_err(io_err)?;
            continue;
        }

        match validate_csv_path(Path::new(line)) {
            Ok(path) => return Ok(path),
            Err(err) => writeln!(out, "{}", err.message()).map_err(io_err)?,
        }
    }
}

/// Validate the provided path points to a `.csv` file.
pub fn validate_csv_path(path: &Path) -> Result<PathBuf, AppError> {
    if !path.exists() {
        return Err(AppError::config(format!("CSV file not found: {}", path.display())));
    }
    if path.is_dir() {
        return Err(AppError::config(format!(
            "Expected a file, got a directory: {}",
            path.display()
        )));
    }
    if !has_csv_extension(path) {
        return Err(AppError::config(format!(
            "Expected a .csv file (got: {}). Use --csv to pass a CSV path.",
            path.display()
        )));
    }
    Ok(path.to_path_buf())
}

/// Discover `*.csv` files under `root` (deterministic order).
pub fn discover_csv_files(root: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    find_csv_files_inner(root, 0, DEFAULT_SEARCH_DEPTH, &mut out);
    out.sort_by_key(|p| pretty_path(p));
    out
}

fn find_csv_files_inner(root: &Path, depth: usize, max_depth: usize, out: &mut Vec<PathBuf>) {
    if depth > max_depth {
        return;
    }

    let Ok(entries) = fs::read_dir(root) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };

        if file_type.is_dir() {
            if !should_skip_dir(&path) {
                find_csv_files_inner(&path, depth + 1, max_depth, out);
            }
        } else if file_type.is_file() && has_csv_extension(&path) {
            out.push(path);
        }
    }
}

fn has_csv_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

fn should_skip_dir(path: &Path) -> bool {
    let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
    matches!(name, ".git" | "target" | "node_modules")
}

fn pretty_path(path: &Path) -> String {
    let stripped = path.strip_prefix("./").unwrap_or(path);
    stripped.display().to_string()
}
