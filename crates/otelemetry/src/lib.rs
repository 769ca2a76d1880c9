//! Logging facade over the OpenTelemetry SDK.
//!
//! [`Telemetry`] builds a batching logger provider (OTLP/gRPC or stdout) for a
//! validated service resource. [`Log`] turns `debug`/`info`/`warning`/`error`/
//! `fatal` calls into immutable [`LogRecord`]s and hands them to a [`LogSink`].

pub mod config;
pub mod context;
pub mod error;
pub mod facade;
pub mod provider;
pub mod record;
pub mod resource;
pub mod severity;
pub mod sink;
pub mod stdout;

pub use config::{Collector, Exporter, ResourceOption, Service, TelemetryConfig};
pub use context::EmitContext;
pub use error::TelemetryError;
pub use facade::Log;
pub use provider::Telemetry;
pub use record::LogRecord;
pub use resource::{attribute, ResourceDescriptor};
pub use severity::Severity;
pub use sink::{LogSink, MemorySink, OtelSink};
pub use stdout::StdoutExporter;

pub use opentelemetry::KeyValue;
