//! Structured logging setup.
//!
//! Logs go to stderr so report text on stdout stays pipeable.
//!
//! # Environment Variables
//! - `RUST_LOG` (optional) - full `EnvFilter` directive, wins over everything
//! - `SALES_LOG_LEVEL` (optional) - `trace|debug|info|warn|error|off`
//! - `FORCE_COLOR` (optional) - `1|true|yes` / `0|false|no`; otherwise TTY detection

use std::env;
use std::io::IsTerminal;

use tracing_subscriber::EnvFilter;

/// Install the global subscriber. Safe to call more than once; later calls
/// are ignored.
pub fn init_tracing(default_level: &str) {
    let use_color = match env::var("FORCE_COLOR").as_deref() {
        Ok("1") | Ok("true") | Ok("yes") => true,
        Ok("0") | Ok("false") | Ok("no") => false,
        _ => std::io::stderr().is_terminal(),
    };

    let env_filter = if env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let requested = env::var("SALES_LOG_LEVEL").ok();
        let level = resolve_level(requested.as_deref(), default_level);
        EnvFilter::new(level)
    };

    let _ = tracing_subscriber::fmt()
        .with_target(true)
        .with_env_filter(env_filter)
        .with_ansi(use_color)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}

/// Pick the effective level: a recognised `SALES_LOG_LEVEL`, else the default.
fn resolve_level<'a>(requested: Option<&'a str>, default_level: &'a str) -> &'a str {
    match requested {
        Some(level @ ("trace" | "debug" | "info" | "warn" | "error" | "off")) => level,
        _ => default_level,
    }
}
