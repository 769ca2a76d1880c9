//! [`Log`]: one convenience method per severity on top of a [`LogSink`].

use opentelemetry::KeyValue;

use crate::context::EmitContext;
use crate::record::LogRecord;
use crate::severity::Severity;
use crate::sink::LogSink;

/// Logging facade over an injected sink.
///
/// Each method builds a [`LogRecord`] for its fixed severity and hands it to
/// the sink together with the caller's [`EmitContext`]. The facade keeps no
/// state of its own, applies no timeout, and never reports an error.
///
/// # Fatal
///
/// [`Log::fatal`] only labels the record. It does **not** exit or abort the
/// process; callers that want to terminate must do so themselves.
#[derive(Debug, Clone)]
pub struct Log<S> {
    sink: S,
}

impl<S: LogSink> Log<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    /// The underlying log handle.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Build and emit a record at an arbitrary severity.
    pub fn emit(
        &self,
        ctx: &EmitContext,
        severity: Severity,
        message: impl Into<String>,
        attributes: impl IntoIterator<Item = KeyValue>,
    ) {
        let record = LogRecord::build(message, severity, attributes);
        self.sink.emit(ctx, record);
    }

    pub fn debug(
        &self,
        ctx: &EmitContext,
        message: impl Into<String>,
        attributes: impl IntoIterator<Item = KeyValue>,
    ) {
        self.emit(ctx, Severity::Debug, message, attributes);
    }

    pub fn info(
        &self,
        ctx: &EmitContext,
        message: impl Into<String>,
        attributes: impl IntoIterator<Item = KeyValue>,
    ) {
        self.emit(ctx, Severity::Info, message, attributes);
    }

    pub fn warning(
        &self,
        ctx: &EmitContext,
        message: impl Into<String>,
        attributes: impl IntoIterator<Item = KeyValue>,
    ) {
        self.emit(ctx, Severity::Warn, message, attributes);
    }

    pub fn error(
        &self,
        ctx: &EmitContext,
        message: impl Into<String>,
        attributes: impl IntoIterator<Item = KeyValue>,
    ) {
        self.emit(ctx, Severity::Error, message, attributes);
    }

    /// Emit at [`Severity::Fatal`]. Returns normally; see the type-level docs.
    pub fn fatal(
        &self,
        ctx: &EmitContext,
        message: impl Into<String>,
        attributes: impl IntoIterator<Item = KeyValue>,
    ) {
        self.emit(ctx, Severity::Fatal, message, attributes);
    }
}
