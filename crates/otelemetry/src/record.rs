//! Immutable log records built once per emission call.

use std::cell::Cell;
use std::time::SystemTime;

use opentelemetry::KeyValue;

use crate::severity::Severity;

thread_local! {
    static LAST_TIMESTAMP: Cell<SystemTime> = const { Cell::new(SystemTime::UNIX_EPOCH) };
}

/// Wall-clock time, clamped so it never moves backwards on the calling thread.
fn now() -> SystemTime {
    LAST_TIMESTAMP.with(|last| {
        let ts = SystemTime::now().max(last.get());
        last.set(ts);
        ts
    })
}

/// A structured log entry: body, severity, timestamp, and ordered attributes.
///
/// Fields are private; a record cannot be altered after [`LogRecord::build`].
/// Attributes keep their call order and duplicate keys are preserved as given.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    body: String,
    severity: Severity,
    timestamp: SystemTime,
    attributes: Vec<KeyValue>,
}

impl LogRecord {
    /// Build a record stamped with the current wall-clock time.
    pub fn build(
        message: impl Into<String>,
        severity: Severity,
        attributes: impl IntoIterator<Item = KeyValue>,
    ) -> Self {
        let timestamp = now();
        Self {
            body: message.into(),
            severity,
            timestamp,
            attributes: attributes.into_iter().collect(),
        }
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// OpenTelemetry severity number of [`LogRecord::severity`].
    pub fn severity_rank(&self) -> u8 {
        self.severity.rank()
    }

    pub fn severity_label(&self) -> &'static str {
        self.severity.label()
    }

    pub fn timestamp(&self) -> SystemTime {
        self.timestamp
    }

    pub fn attributes(&self) -> &[KeyValue] {
        &self.attributes
    }

    /// Decompose the record, handing ownership of its parts to a sink.
    pub fn into_parts(self) -> (String, Severity, SystemTime, Vec<KeyValue>) {
        (self.body, self.severity, self.timestamp, self.attributes)
    }
}
