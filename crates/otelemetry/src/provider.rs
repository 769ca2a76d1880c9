//! Logger provider construction and bounded teardown.
//!
//! A [`Telemetry`] handle is built once, passed down to whoever logs, and
//! shut down explicitly. No global provider is installed.

use std::fmt;
use std::time::Instant;

use opentelemetry::logs::LoggerProvider as _;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{logs as sdklogs, runtime, Resource};
use tracing::{info, warn};

use crate::config::{Collector, Exporter, TelemetryConfig};
use crate::error::TelemetryError;
use crate::facade::Log;
use crate::resource::ResourceDescriptor;
use crate::sink::OtelSink;
use crate::stdout::StdoutExporter;

/// Owns the SDK logger provider and the facade that writes into it.
pub struct Telemetry {
    provider: sdklogs::LoggerProvider,
    log: Log<OtelSink>,
}

impl fmt::Debug for Telemetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Telemetry")
            .field("log", &self.log)
            .finish_non_exhaustive()
    }
}

impl Telemetry {
    /// Build the resource, the exporter, and a batching logger provider.
    ///
    /// Must be called from within a Tokio runtime: the batch processor runs
    /// on [`runtime::Tokio`].
    ///
    /// # Errors
    ///
    /// - [`TelemetryError::Config`] if the service identity, resource options,
    ///   collector address, or scope name are invalid.
    /// - [`TelemetryError::Transport`] if the OTLP pipeline cannot be installed.
    pub fn new(config: &TelemetryConfig) -> Result<Self, TelemetryError> {
        if config.scope_name.trim().is_empty() {
            return Err(TelemetryError::config("logger scope name must not be empty"));
        }
        let resource =
            ResourceDescriptor::new(&config.service, &config.resource_options)?.into_resource();

        let provider = match config.exporter {
            Exporter::Otlp => otlp_provider(&config.collector, resource)?,
            Exporter::Stdout => stdout_provider(resource),
        };
        let logger = provider.logger(config.scope_name.clone());

        info!(
            service = %config.service.name,
            exporter = ?config.exporter,
            scope = %config.scope_name,
            "telemetry logger provider ready"
        );

        Ok(Self {
            provider,
            log: Log::new(OtelSink::new(logger)),
        })
    }

    /// The logging facade.
    pub fn log(&self) -> &Log<OtelSink> {
        &self.log
    }

    /// The underlying SDK provider.
    pub fn provider(&self) -> &sdklogs::LoggerProvider {
        &self.provider
    }

    /// Export everything buffered so far, waiting at most until `deadline`.
    ///
    /// # Errors
    ///
    /// [`TelemetryError::ShutdownTimeout`] if the deadline passes first,
    /// [`TelemetryError::Shutdown`] if an exporter reports a failure.
    pub async fn force_flush(&self, deadline: Instant) -> Result<(), TelemetryError> {
        let provider = self.provider.clone();
        run_until(deadline, "flush", move || {
            provider
                .force_flush()
                .into_iter()
                .find_map(Result::err)
                .map_or(Ok(()), |e| Err(e.to_string()))
        })
        .await
    }

    /// Flush pending records and release the export pipeline.
    ///
    /// The SDK shutdown is started even when `deadline` has already passed;
    /// it then completes in the background.
    ///
    /// # Errors
    ///
    /// [`TelemetryError::ShutdownTimeout`] if the deadline passes first,
    /// [`TelemetryError::Shutdown`] if the SDK reports a failure.
    pub async fn shutdown(self, deadline: Instant) -> Result<(), TelemetryError> {
        let provider = self.provider;
        run_until(deadline, "shutdown", move || {
            provider.shutdown().map_err(|e| e.to_string())
        })
        .await
    }
}

fn otlp_provider(
    collector: &Collector,
    resource: Resource,
) -> Result<sdklogs::LoggerProvider, TelemetryError> {
    if collector.host.trim().is_empty() {
        return Err(TelemetryError::config("collector host must not be empty"));
    }
    if collector.port == 0 {
        return Err(TelemetryError::config("collector port must be > 0"));
    }

    opentelemetry_otlp::new_pipeline()
        .logging()
        .with_exporter(
            opentelemetry_otlp::new_exporter()
                .tonic()
                .with_endpoint(collector.endpoint()),
        )
        .with_log_config(sdklogs::Config::default().with_resource(resource))
        .install_batch(runtime::Tokio)
        .map_err(|e| TelemetryError::Transport(e.to_string()))
}

fn stdout_provider(resource: Resource) -> sdklogs::LoggerProvider {
    sdklogs::LoggerProvider::builder()
        .with_config(sdklogs::Config::default().with_resource(resource))
        .with_batch_exporter(StdoutExporter::new(), runtime::Tokio)
        .build()
}

/// Run a blocking SDK operation on the blocking pool, bounded by `deadline`.
async fn run_until<F>(deadline: Instant, what: &'static str, op: F) -> Result<(), TelemetryError>
where
    F: FnOnce() -> Result<(), String> + Send + 'static,
{
    let budget = deadline.saturating_duration_since(Instant::now());
    let task = tokio::task::spawn_blocking(op);

    if budget.is_zero() {
        warn!(operation = what, "telemetry deadline already expired");
        return Err(TelemetryError::ShutdownTimeout(budget));
    }

    match tokio::time::timeout(budget, task).await {
        Err(_) => {
            warn!(
                operation = what,
                budget_ms = budget.as_millis() as u64,
                "telemetry deadline exceeded"
            );
            Err(TelemetryError::ShutdownTimeout(budget))
        }
        Ok(Err(join)) => Err(TelemetryError::Shutdown(join.to_string())),
        Ok(Ok(Err(msg))) => Err(TelemetryError::Shutdown(msg)),
        Ok(Ok(Ok(()))) => Ok(()),
    }
}
