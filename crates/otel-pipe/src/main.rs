//! `otel-pipe` — forwards stdin to an OpenTelemetry collector as log records.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`](config::Config) from environment variables.
//! 2. Initialise structured JSON diagnostics on stderr.
//! 3. Build the [`Telemetry`] handle (resource, exporter, batch provider).
//! 4. Forward stdin lines until EOF or Ctrl-C.
//! 5. Flush and shut the provider down within `SHUTDOWN_TIMEOUT_MS`.

mod config;
mod diagnostics;
mod pipe;

use std::time::Instant;

use anyhow::{Context, Result};
use otelemetry::{EmitContext, KeyValue, Telemetry};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = config::Config::from_env().map_err(|e| {
        // Diagnostics are not yet up; write to stderr directly.
        eprintln!("ERROR: otel-pipe configuration invalid: {e:#}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Diagnostics
    // -----------------------------------------------------------------------
    diagnostics::init(&cfg.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        service = %cfg.service_name,
        exporter = %cfg.exporter,
        "otel-pipe starting"
    );

    // -----------------------------------------------------------------------
    // 3. Telemetry
    // -----------------------------------------------------------------------
    let tel = Telemetry::new(&cfg.telemetry()?).context("failed to build telemetry provider")?;
    let severity = cfg.severity()?;

    // -----------------------------------------------------------------------
    // 4. Forwarding
    // -----------------------------------------------------------------------
    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("interrupt received, stopping");
                cancel.cancel();
            }
        }
    });

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let emitted = pipe::run(stdin, tel.log(), severity, cancel).await?;
    tel.log().debug(
        &EmitContext::current(),
        "otel-pipe input drained",
        [KeyValue::new(
            "pipe.records",
            i64::try_from(emitted).unwrap_or(i64::MAX),
        )],
    );
    info!(emitted, "forwarding finished");

    // -----------------------------------------------------------------------
    // 5. Shutdown
    // -----------------------------------------------------------------------
    let deadline = Instant::now() + cfg.shutdown_timeout();
    if let Err(e) = tel.force_flush(deadline).await {
        warn!(error = %e, "flush incomplete");
    }
    tel.shutdown(deadline)
        .await
        .context("failed to shut down telemetry provider")?;

    Ok(())
}
