//! The emission primitive the facade writes into.
//!
//! - [`OtelSink`] hands records to an OpenTelemetry SDK logger.
//! - [`MemorySink`] keeps records in memory for inspection.

pub mod memory;
pub mod otel;

pub use memory::MemorySink;
pub use otel::OtelSink;

use std::sync::Arc;

use crate::context::EmitContext;
use crate::record::LogRecord;

/// Underlying log handle shared by every facade method.
///
/// `emit` takes ownership of the record and returns nothing: delivery
/// problems belong to the export pipeline behind the sink.
#[cfg_attr(test, mockall::automock)]
pub trait LogSink: Send + Sync {
    fn emit(&self, ctx: &EmitContext, record: LogRecord);
}

impl<S: LogSink + ?Sized> LogSink for Arc<S> {
    fn emit(&self, ctx: &EmitContext, record: LogRecord) {
        (**self).emit(ctx, record)
    }
}

impl<S: LogSink + ?Sized> LogSink for &S {
    fn emit(&self, ctx: &EmitContext, record: LogRecord) {
        (**self).emit(ctx, record)
    }
}
