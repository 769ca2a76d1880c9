//! Caller-supplied cancellation / deadline scope for an emission call.
//!
//! The facade never looks inside an [`EmitContext`]; it is handed to the sink
//! unchanged. Sinks decide whether to honour cancellation.

use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

/// Trace context plus optional cancellation and deadline.
#[derive(Debug, Clone, Default)]
pub struct EmitContext {
    otel: opentelemetry::Context,
    cancel: Option<CancellationToken>,
    deadline: Option<Instant>,
}

impl EmitContext {
    /// An empty context: no active span, never cancelled, no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// Capture the OpenTelemetry context active on this thread.
    pub fn current() -> Self {
        Self {
            otel: opentelemetry::Context::current(),
            ..Self::default()
        }
    }

    /// Wrap an explicit OpenTelemetry context.
    pub fn from_otel(otel: opentelemetry::Context) -> Self {
        Self {
            otel,
            ..Self::default()
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Set an absolute deadline. An earlier existing deadline is kept.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        });
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn otel(&self) -> &opentelemetry::Context {
        &self.otel
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// `true` once the token is cancelled or the deadline has passed.
    pub fn is_done(&self) -> bool {
        let cancelled = self
            .cancel
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled);
        let expired = self.deadline.is_some_and(|d| Instant::now() >= d);
        cancelled || expired
    }
}
