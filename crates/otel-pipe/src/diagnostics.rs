//! otel-pipe's own diagnostics, kept apart from the records it forwards.
//!
//! Forwarded records may be written to stdout (`EXPORTER=stdout`), so the
//! binary reports on itself as JSON lines on stderr.

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

/// Install the process-wide JSON subscriber on stderr.
///
/// `RUST_LOG` wins over `log_level` when it is set.
///
/// # Errors
///
/// Returns an error if `log_level` is not a valid filter directive or a
/// subscriber is already installed.
pub fn init(log_level: &str) -> Result<()> {
    tracing_subscriber::fmt()
        .json()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(filter(log_level)?)
        .try_init()
        .map_err(|e| anyhow::anyhow!("diagnostics subscriber already installed: {e}"))
}

fn filter(log_level: &str) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(from_env) => Ok(from_env),
        Err(_) => EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid LOG_LEVEL directive {log_level:?}")),
    }
}
