//! Error taxonomy for provider construction and teardown.

use std::time::Duration;

use thiserror::Error;

/// Errors surfaced while building or tearing down a [`Telemetry`](crate::Telemetry) handle.
///
/// Emission never fails, so every variant originates either from
/// construction or from flush / shutdown:
/// - [`TelemetryError::Config`] → the service identity or resource options are invalid
/// - [`TelemetryError::Transport`] → the export pipeline could not be initialised
/// - [`TelemetryError::ShutdownTimeout`] → a bounded flush or shutdown ran out of time
/// - [`TelemetryError::Shutdown`] → the SDK reported a failure while flushing
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Required identity fields are missing, or resource options are invalid or conflicting.
    #[error("invalid telemetry configuration: {0}")]
    Config(String),

    /// The exporter or batch pipeline could not be established.
    #[error("export transport unavailable: {0}")]
    Transport(String),

    /// The deadline expired before pending records were flushed.
    #[error("shutdown deadline exceeded (budget {}ms)", .0.as_millis())]
    ShutdownTimeout(Duration),

    /// The SDK returned an error during flush or shutdown.
    #[error("telemetry shutdown failed: {0}")]
    Shutdown(String),
}

impl TelemetryError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        TelemetryError::Config(msg.into())
    }

    /// Returns `true` for errors caused by caller-supplied configuration.
    pub fn is_config(&self) -> bool {
        matches!(self, TelemetryError::Config(_))
    }
}
