//! [`StdoutExporter`]: writes exported log records as JSON lines.
//!
//! One line per record, each carrying the resource and instrumentation scope
//! it was emitted under, so the output can be piped into `jq` or a collector
//! file receiver without further framing.

use std::fmt;
use std::io::{self, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use opentelemetry::logs::{AnyValue, LogError, LogResult};
use opentelemetry_sdk::export::logs::{LogData, LogExporter};
use opentelemetry_sdk::Resource;
use serde_json::{json, Map, Value as Json};

/// Log exporter that serialises each record to one line of JSON.
pub struct StdoutExporter {
    writer: Box<dyn Write + Send + Sync>,
    resource: Json,
    closed: bool,
}

impl StdoutExporter {
    /// Export to the process's standard output.
    pub fn new() -> Self {
        Self::with_writer(io::stdout())
    }

    /// Export to an arbitrary writer.
    pub fn with_writer(writer: impl Write + Send + Sync + 'static) -> Self {
        Self {
            writer: Box::new(writer),
            resource: Json::Object(Map::new()),
            closed: false,
        }
    }

    fn write_batch(&mut self, batch: &[LogData]) -> io::Result<()> {
        for data in batch {
            let line = record_json(data, &self.resource);
            serde_json::to_writer(&mut self.writer, &line)?;
            self.writer.write_all(b"\n")?;
        }
        self.writer.flush()
    }
}

impl Default for StdoutExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StdoutExporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StdoutExporter")
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl LogExporter for StdoutExporter {
    async fn export(&mut self, batch: Vec<LogData>) -> LogResult<()> {
        if self.closed {
            return Err(LogError::from("stdout exporter is shut down"));
        }
        self.write_batch(&batch)
            .map_err(|e| LogError::Other(Box::new(e)))
    }

    fn shutdown(&mut self) {
        let _ = self.writer.flush();
        self.closed = true;
    }

    fn set_resource(&mut self, resource: &Resource) {
        let attrs: Map<String, Json> = resource
            .iter()
            .map(|(k, v)| (k.as_str().to_owned(), any_json(&AnyValue::from(v.clone()))))
            .collect();
        self.resource = Json::Object(attrs);
    }
}

fn record_json(data: &LogData, resource: &Json) -> Json {
    let record = &data.record;
    let mut line = json!({
        "resource": resource,
        "scope": {
            "name": data.instrumentation.name,
            "version": data.instrumentation.version,
        },
        "time_unix_nano": record.timestamp.map(unix_nanos),
        "observed_time_unix_nano": record.observed_timestamp.map(unix_nanos),
        "severity_number": record.severity_number.map(|s| s as i32),
        "severity_text": record.severity_text,
        "body": record.body.as_ref().map(any_json),
        // Array of pairs: attribute order and duplicate keys survive.
        "attributes": record
            .attributes
            .iter()
            .flatten()
            .map(|(k, v)| json!({ "key": k.as_str(), "value": any_json(v) }))
            .collect::<Vec<_>>(),
    });
    if let (Some(trace), Json::Object(obj)) = (&record.trace_context, &mut line) {
        obj.insert("trace_id".into(), Json::String(trace.trace_id.to_string()));
        obj.insert("span_id".into(), Json::String(trace.span_id.to_string()));
    }
    line
}

fn unix_nanos(ts: SystemTime) -> u64 {
    ts.duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_nanos()).unwrap_or(u64::MAX))
        .unwrap_or_default()
}

fn any_json(value: &AnyValue) -> Json {
    match value {
        AnyValue::Int(i) => json!(i),
        AnyValue::Double(f) => json!(f),
        AnyValue::String(s) => Json::String(s.as_str().to_owned()),
        AnyValue::Boolean(b) => Json::Bool(*b),
        AnyValue::Bytes(bytes) => json!(bytes),
        AnyValue::ListAny(items) => Json::Array(items.iter().map(any_json).collect()),
        AnyValue::Map(map) => Json::Object(
            map.iter()
                .map(|(k, v)| (k.to_string(), any_json(v)))
                .collect(),
        ),
    }
}
