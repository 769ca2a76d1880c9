//! Configuration loading and validation for the otel-pipe binary.

use std::time::Duration;

use anyhow::{Context, Result};
use otelemetry::{
    attribute, Exporter, KeyValue, ResourceOption, Service, Severity, TelemetryConfig,
};
use serde::Deserialize;

/// Validated otel-pipe configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// `service.name` of the emitted records. **Required.**
    pub service_name: String,

    #[serde(default)]
    pub service_namespace: String,

    #[serde(default)]
    pub service_version: String,

    /// OTLP/gRPC collector host.
    #[serde(default = "default_collector_host")]
    pub collector_host: String,

    /// OTLP/gRPC collector port.
    #[serde(default = "default_collector_port")]
    pub collector_port: u16,

    /// `otlp` or `stdout`.
    #[serde(default = "default_exporter")]
    pub exporter: String,

    /// Extra resource attributes as `key=value,key=value`.
    #[serde(default)]
    pub resource_attributes: String,

    #[serde(default)]
    pub detect_host: bool,

    #[serde(default)]
    pub detect_container: bool,

    #[serde(default)]
    pub detect_process: bool,

    /// Severity given to each forwarded line.
    #[serde(default = "default_pipe_severity")]
    pub pipe_severity: String,

    /// Upper bound on flushing and shutting down the exporter.
    #[serde(default = "default_shutdown_timeout_ms")]
    pub shutdown_timeout_ms: u64,

    /// Tracing log level for otel-pipe's own diagnostics.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_collector_host() -> String {
    "localhost".into()
}
fn default_collector_port() -> u16 {
    otelemetry::config::DEFAULT_COLLECTOR_PORT
}
fn default_exporter() -> String {
    "otlp".into()
}
fn default_pipe_severity() -> String {
    "info".into()
}
fn default_shutdown_timeout_ms() -> u64 {
    5_000
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any required variable is absent or cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build otel-pipe configuration")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise otel-pipe configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        if self.service_name.trim().is_empty() {
            anyhow::bail!("SERVICE_NAME is required and must not be empty");
        }
        let exporter = self.exporter()?;
        if exporter == Exporter::Otlp {
            if self.collector_host.trim().is_empty() {
                anyhow::bail!("COLLECTOR_HOST must not be empty when EXPORTER=otlp");
            }
            if self.collector_port == 0 {
                anyhow::bail!("COLLECTOR_PORT must be > 0");
            }
        }
        if self.shutdown_timeout_ms == 0 {
            anyhow::bail!("SHUTDOWN_TIMEOUT_MS must be > 0");
        }
        self.severity()?;
        parse_resource_attributes(&self.resource_attributes)?;
        Ok(())
    }

    pub fn exporter(&self) -> Result<Exporter> {
        match self.exporter.trim().to_ascii_lowercase().as_str() {
            "otlp" => Ok(Exporter::Otlp),
            "stdout" => Ok(Exporter::Stdout),
            other => anyhow::bail!("EXPORTER must be `otlp` or `stdout`, got {other:?}"),
        }
    }

    pub fn severity(&self) -> Result<Severity> {
        self.pipe_severity
            .parse()
            .with_context(|| format!("PIPE_SEVERITY {:?} is not a severity", self.pipe_severity))
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }

    /// Translate into the library's typed configuration.
    pub fn telemetry(&self) -> Result<TelemetryConfig> {
        let mut cfg = TelemetryConfig::new(Service {
            name: self.service_name.clone(),
            namespace: self.service_namespace.clone(),
            version: self.service_version.clone(),
        })
        .with_collector(self.collector_host.clone(), self.collector_port)
        .with_exporter(self.exporter()?)
        .with_scope_name(env!("CARGO_PKG_NAME"));

        if self.detect_host {
            cfg = cfg.with_resource_option(ResourceOption::Host);
        }
        if self.detect_container {
            cfg = cfg.with_resource_option(ResourceOption::Container);
        }
        if self.detect_process {
            cfg = cfg.with_resource_option(ResourceOption::Process);
        }
        let extra = parse_resource_attributes(&self.resource_attributes)?;
        if !extra.is_empty() {
            cfg = cfg.with_resource_option(ResourceOption::Attributes(extra));
        }
        Ok(cfg)
    }
}

/// Parse `key=value,key=value`; blank input yields no attributes.
fn parse_resource_attributes(raw: &str) -> Result<Vec<KeyValue>> {
    raw.split(',')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| -> Result<KeyValue> {
            let (key, value) = pair
                .split_once('=')
                .with_context(|| format!("RESOURCE_ATTRIBUTES entry {pair:?} is not key=value"))?;
            let key = key.trim();
            if key.is_empty() {
                anyhow::bail!("RESOURCE_ATTRIBUTES entry {pair:?} has an empty key");
            }
            Ok(attribute(key.to_owned(), value.trim()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Config {
        Config {
            service_name: "billing".into(),
            service_namespace: "payments".into(),
            service_version: "1.2.3".into(),
            collector_host: default_collector_host(),
            collector_port: default_collector_port(),
            exporter: default_exporter(),
            resource_attributes: String::new(),
            detect_host: false,
            detect_container: false,
            detect_process: false,
            pipe_severity: default_pipe_severity(),
            shutdown_timeout_ms: default_shutdown_timeout_ms(),
            log_level: default_log_level(),
        }
    }

    #[test]
    fn defaults() {
        assert_eq!(default_collector_host(), "localhost");
        assert_eq!(default_collector_port(), 4317);
        assert_eq!(default_exporter(), "otlp");
        assert_eq!(default_pipe_severity(), "info");
        assert_eq!(default_shutdown_timeout_ms(), 5_000);
        assert_eq!(default_log_level(), "info");
    }

    #[test]
    fn validate_accepts_valid_config() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_service_name() {
        let cfg = Config {
            service_name: "  ".into(),
            ..valid()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_unknown_exporter() {
        let cfg = Config {
            exporter: "kafka".into(),
            ..valid()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_port_for_otlp_only() {
        let cfg = Config {
            collector_port: 0,
            ..valid()
        };
        assert!(cfg.validate().is_err());

        let cfg = Config {
            collector_port: 0,
            exporter: "stdout".into(),
            ..valid()
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_severity_and_timeout() {
        let cfg = Config {
            pipe_severity: "verbose".into(),
            ..valid()
        };
        assert!(cfg.validate().is_err());

        let cfg = Config {
            shutdown_timeout_ms: 0,
            ..valid()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn parses_resource_attributes() {
        let attrs = parse_resource_attributes(" pod.name = api-0 ,zone=eu-west-1a,").unwrap();
        assert_eq!(
            attrs,
            vec![
                KeyValue::new("pod.name", "api-0"),
                KeyValue::new("zone", "eu-west-1a"),
            ]
        );
        assert!(parse_resource_attributes("").unwrap().is_empty());
        assert!(parse_resource_attributes("novalue").is_err());
        assert!(parse_resource_attributes("=x").is_err());
    }

    #[test]
    fn builds_telemetry_config() {
        let cfg = Config {
            exporter: "STDOUT".into(),
            detect_host: true,
            detect_process: true,
            resource_attributes: "pod.name=api-0".into(),
            pipe_severity: "warning".into(),
            ..valid()
        };
        let tel = cfg.telemetry().unwrap();
        assert_eq!(tel.service.name, "billing");
        assert_eq!(tel.exporter, Exporter::Stdout);
        assert_eq!(tel.scope_name, "otel-pipe");
        assert_eq!(
            tel.resource_options,
            vec![
                ResourceOption::Host,
                ResourceOption::Process,
                ResourceOption::Attributes(vec![KeyValue::new("pod.name", "api-0")]),
            ]
        );
        assert_eq!(cfg.severity().unwrap(), Severity::Warn);
        assert_eq!(cfg.shutdown_timeout(), Duration::from_secs(5));
    }
}
