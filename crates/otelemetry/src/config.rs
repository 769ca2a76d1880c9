//! Typed configuration consumed by [`Telemetry::new`](crate::Telemetry::new).

use opentelemetry::KeyValue;

/// Identity of the emitting service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Service {
    /// `service.name`. **Required**, must not be blank.
    pub name: String,
    /// `service.namespace`; omitted from the resource when empty.
    pub namespace: String,
    /// `service.version`; omitted from the resource when empty.
    pub version: String,
}

/// OTLP/gRPC collector address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collector {
    pub host: String,
    pub port: u16,
}

impl Default for Collector {
    fn default() -> Self {
        Self {
            host: default_collector_host(),
            port: DEFAULT_COLLECTOR_PORT,
        }
    }
}

/// Standard OTLP/gRPC port.
pub const DEFAULT_COLLECTOR_PORT: u16 = 4317;

fn default_collector_host() -> String {
    "localhost".into()
}

impl Collector {
    /// Plaintext gRPC endpoint URI, e.g. `http://localhost:4317`.
    pub fn endpoint(&self) -> String {
        format!("http://{}:{}", self.host.trim(), self.port)
    }
}

/// Where the batch processor exports records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Exporter {
    /// OTLP over gRPC to [`Collector`].
    #[default]
    Otlp,
    /// Human-readable records on standard output.
    Stdout,
}

/// Extra contributions to the resource descriptor.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceOption {
    /// `host.name`, `host.arch`, `os.type`.
    Host,
    /// `container.id`, when running inside a container.
    Container,
    /// `process.pid`, `process.executable.name`.
    Process,
    /// Caller-supplied attributes. Must carry at least one attribute.
    Attributes(Vec<KeyValue>),
}

/// Instrumentation scope used when none is configured.
pub const DEFAULT_SCOPE_NAME: &str = "otelemetry";

/// Everything needed to build a [`Telemetry`](crate::Telemetry) handle.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryConfig {
    pub service: Service,
    pub collector: Collector,
    pub exporter: Exporter,
    pub resource_options: Vec<ResourceOption>,
    /// Instrumentation scope name given to the SDK logger.
    pub scope_name: String,
}

impl TelemetryConfig {
    /// Configuration with defaults for everything except the service identity.
    pub fn new(service: Service) -> Self {
        Self {
            service,
            collector: Collector::default(),
            exporter: Exporter::default(),
            resource_options: Vec::new(),
            scope_name: DEFAULT_SCOPE_NAME.into(),
        }
    }

    pub fn with_collector(mut self, host: impl Into<String>, port: u16) -> Self {
        self.collector = Collector {
            host: host.into(),
            port,
        };
        self
    }

    pub fn with_exporter(mut self, exporter: Exporter) -> Self {
        self.exporter = exporter;
        self
    }

    pub fn with_resource_option(mut self, option: ResourceOption) -> Self {
        self.resource_options.push(option);
        self
    }

    pub fn with_scope_name(mut self, scope_name: impl Into<String>) -> Self {
        self.scope_name = scope_name.into();
        self
    }
}
