//! [`OtelSink`]: bridges [`LogRecord`]s into an OpenTelemetry logger.

use std::fmt;
use std::sync::Arc;

use opentelemetry::logs::{AnyValue, LogRecord as _, Logger};
use tracing::debug;

use super::LogSink;
use crate::context::EmitContext;
use crate::record::LogRecord;

/// Sink backed by an OpenTelemetry [`Logger`], the SDK logger by default.
///
/// Records whose [`EmitContext`] is already cancelled or past its deadline
/// are dropped. Otherwise the context's trace context is made current for
/// the duration of the emit so the SDK can correlate the record with the
/// active span.
pub struct OtelSink<L = opentelemetry_sdk::logs::Logger> {
    logger: Arc<L>,
}

impl<L> OtelSink<L> {
    pub fn new(logger: L) -> Self {
        Self {
            logger: Arc::new(logger),
        }
    }

    /// The raw OpenTelemetry logger, for capabilities the facade does not cover.
    pub fn logger(&self) -> &L {
        &self.logger
    }
}

impl<L> Clone for OtelSink<L> {
    fn clone(&self) -> Self {
        Self {
            logger: Arc::clone(&self.logger),
        }
    }
}

impl<L> fmt::Debug for OtelSink<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OtelSink").finish_non_exhaustive()
    }
}

impl<L> LogSink for OtelSink<L>
where
    L: Logger + Send + Sync,
{
    fn emit(&self, ctx: &EmitContext, record: LogRecord) {
        if ctx.is_done() {
            debug!(
                severity = record.severity_label(),
                "emit context already done, dropping log record"
            );
            return;
        }
        let otel = to_otel_record(&*self.logger, record);
        let _guard = ctx.otel().clone().attach();
        self.logger.emit(otel);
    }
}

/// Fill a logger-specific record with the facade record's fields.
///
/// Attributes keep their order, duplicates included.
pub(crate) fn to_otel_record<L: Logger>(logger: &L, record: LogRecord) -> L::LogRecord {
    let (body, severity, timestamp, attributes) = record.into_parts();

    let mut otel = logger.create_log_record();
    otel.set_body(AnyValue::String(body.into()));
    otel.set_severity_number(severity.to_otel());
    otel.set_severity_text(severity.label().into());
    otel.set_timestamp(timestamp);
    otel.add_attributes(attributes.into_iter().map(|kv| (kv.key, kv.value)));
    otel
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::severity::Severity;
    use opentelemetry::logs::LoggerProvider as _;
    use opentelemetry::trace::{
        SpanContext, SpanId, TraceContextExt, TraceFlags, TraceId, TraceState,
    };
    use opentelemetry::{Context, KeyValue, StringValue};
    use opentelemetry_sdk::logs::LoggerProvider;
    use opentelemetry_sdk::testing::logs::in_memory_exporter::LogDataWithResource;
    use opentelemetry_sdk::testing::logs::InMemoryLogsExporter;
    use std::time::{Duration, Instant};
    use tokio_util::sync::CancellationToken;

    fn sdk_sink() -> (OtelSink, LoggerProvider, InMemoryLogsExporter) {
        let exporter = InMemoryLogsExporter::default();
        let provider = LoggerProvider::builder()
            .with_simple_exporter(exporter.clone())
            .build();
        let sink = OtelSink::new(provider.logger("otel-sink-test"));
        (sink, provider, exporter)
    }

    fn exported(exporter: &InMemoryLogsExporter) -> Vec<LogDataWithResource> {
        exporter.get_emitted_logs().expect("in-memory exporter readable")
    }

    fn body_of(log: &LogDataWithResource) -> String {
        match &log.record.body {
            Some(AnyValue::String(s)) => s.as_str().to_owned(),
            other => panic!("unexpected body {other:?}"),
        }
    }

    #[test]
    fn exports_every_field() {
        let (sink, _provider, exporter) = sdk_sink();
        let record = LogRecord::build(
            "disk almost full",
            Severity::Warn,
            [KeyValue::new("mount", "/var"), KeyValue::new("used_pct", 97_i64)],
        );
        let ts = record.timestamp();
        sink.emit(&EmitContext::background(), record);

        let logs = exported(&exporter);
        assert_eq!(logs.len(), 1);
        let otel = &logs[0].record;
        assert_eq!(body_of(&logs[0]), "disk almost full");
        assert_eq!(otel.severity_number, Some(opentelemetry::logs::Severity::Warn));
        assert_eq!(otel.severity_text.as_deref(), Some("WARN"));
        assert_eq!(otel.timestamp, Some(ts));
        assert_eq!(logs[0].instrumentation.name, "otel-sink-test");

        let attrs = otel.attributes.as_ref().expect("attributes set");
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs[0].0.as_str(), "mount");
        assert_eq!(attrs[0].1, AnyValue::String("/var".into()));
        assert_eq!(attrs[1].0.as_str(), "used_pct");
        assert_eq!(attrs[1].1, AnyValue::Int(97));
    }

    #[test]
    fn converts_array_values_to_lists() {
        let (sink, _provider, exporter) = sdk_sink();
        let tags = KeyValue::new(
            "tags",
            opentelemetry::Value::Array(
                vec![StringValue::from("a"), StringValue::from("b")].into(),
            ),
        );
        sink.emit(
            &EmitContext::background(),
            LogRecord::build("tagged", Severity::Info, [tags, KeyValue::new("ok", true)]),
        );

        let logs = exported(&exporter);
        let attrs = logs[0].record.attributes.as_ref().expect("attributes set");
        assert!(matches!(attrs[0].1, AnyValue::ListAny(ref items) if items.len() == 2));
        assert_eq!(attrs[1].1, AnyValue::Boolean(true));
    }

    #[test]
    fn keeps_duplicate_keys() {
        let (sink, _provider, exporter) = sdk_sink();
        sink.emit(
            &EmitContext::background(),
            LogRecord::build(
                "dup",
                Severity::Info,
                [KeyValue::new("k", "1"), KeyValue::new("k", "2")],
            ),
        );

        let logs = exported(&exporter);
        let attrs = logs[0].record.attributes.as_ref().expect("attributes set");
        assert_eq!(attrs.len(), 2);
        assert!(attrs.iter().all(|(k, _)| k.as_str() == "k"));
        assert_eq!(attrs[0].1, AnyValue::String("1".into()));
        assert_eq!(attrs[1].1, AnyValue::String("2".into()));
    }

    #[test]
    fn drops_records_for_done_contexts() {
        let (sink, _provider, exporter) = sdk_sink();

        let expired = EmitContext::background().with_deadline(Instant::now());
        sink.emit(&expired, LogRecord::build("late", Severity::Error, []));

        let token = CancellationToken::new();
        token.cancel();
        let cancelled = EmitContext::background().with_cancellation(token);
        sink.emit(&cancelled, LogRecord::build("cancelled", Severity::Error, []));

        let live = EmitContext::background().with_timeout(Duration::from_secs(60));
        sink.clone()
            .emit(&live, LogRecord::build("on time", Severity::Error, []));

        let logs = exported(&exporter);
        assert_eq!(logs.len(), 1);
        assert_eq!(body_of(&logs[0]), "on time");
    }

    #[test]
    fn attaches_trace_context() {
        let (sink, _provider, exporter) = sdk_sink();
        let span = SpanContext::new(
            TraceId::from_u128(0x4bf92f3577b34da6a3ce929d0e0e4736),
            SpanId::from_u64(0x00f067aa0ba902b7),
            TraceFlags::SAMPLED,
            true,
            TraceState::default(),
        );
        let ctx = EmitContext::from_otel(Context::new().with_remote_span_context(span));

        sink.emit(&ctx, LogRecord::build("in span", Severity::Info, []));
        sink.emit(
            &EmitContext::background(),
            LogRecord::build("no span", Severity::Info, []),
        );

        let logs = exported(&exporter);
        assert_eq!(logs.len(), 2);
        let trace = logs[0]
            .record
            .trace_context
            .as_ref()
            .expect("trace context attached");
        assert_eq!(trace.trace_id, TraceId::from_u128(0x4bf92f3577b34da6a3ce929d0e0e4736));
        assert_eq!(trace.span_id, SpanId::from_u64(0x00f067aa0ba902b7));
        assert!(logs[1].record.trace_context.is_none());
    }
}
