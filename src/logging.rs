//! File logging via `tracing`.
//!
//! The TUI owns the terminal, so diagnostics go to an append-only file instead
//! of stderr.

use std::fs::OpenOptions;
use std::path::Path;

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LOG_ENV_VAR;

/// Filter used when `GIT_OPENER_LOG` is unset
const DEFAULT_FILTER: &str = "info";

/// Install the global subscriber writing to `path`.
pub fn init(path: &Path) -> Result<()> {
    let directive = std::env::var(LOG_ENV_VAR).unwrap_or_else(|_| DEFAULT_FILTER.into());
    let filter = EnvFilter::try_new(&directive)
        .with_context(|| format!("Invalid log filter: {}", directive))?;

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;

    let fmt_layer = fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_target(true)
        .with_file(false)
        .with_line_number(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .context("Failed to init logging")?;

    Ok(())
}
