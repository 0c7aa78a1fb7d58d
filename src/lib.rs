//! `sales-eda` library crate.
//!
//! The binary (`sales`) is a thin wrapper around this library so that:
//!
//! - the load/clean/aggregate stages are testable without spawning processes
//! - the report, export, and TUI front-ends share one pipeline
//! - code stays easy to navigate as the project grows

pub mod analysis;
pub mod app;
pub mod clean;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod plot;
pub mod report;
pub mod transform;
pub mod tui;
