//! Resource descriptor: service identity plus optional host, container,
//! process, and caller-supplied attributes.

use std::time::Duration;

use opentelemetry::{Key, KeyValue, Value};
use opentelemetry_resource_detectors::{OsResourceDetector, ProcessResourceDetector};
use opentelemetry_sdk::resource::ResourceDetector;
use opentelemetry_sdk::Resource;
use opentelemetry_semantic_conventions::resource as semconv;

use crate::config::{ResourceOption, Service};
use crate::error::TelemetryError;

/// Validated, ordered set of resource attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceDescriptor {
    attributes: Vec<KeyValue>,
}

impl ResourceDescriptor {
    /// Validate the service identity and apply each option in order.
    ///
    /// # Errors
    ///
    /// Returns [`TelemetryError::Config`] if the service name is blank, an
    /// [`ResourceOption::Attributes`] option is empty, an attribute key is
    /// empty, or an attribute tries to override a `service.*` identity key.
    pub fn new(service: &Service, options: &[ResourceOption]) -> Result<Self, TelemetryError> {
        if service.name.trim().is_empty() {
            return Err(TelemetryError::config(
                "service name is required and must not be empty",
            ));
        }

        let mut attributes = vec![KeyValue::new(semconv::SERVICE_NAME, service.name.clone())];
        if !service.namespace.trim().is_empty() {
            attributes.push(KeyValue::new(
                semconv::SERVICE_NAMESPACE,
                service.namespace.clone(),
            ));
        }
        if !service.version.trim().is_empty() {
            attributes.push(KeyValue::new(
                semconv::SERVICE_VERSION,
                service.version.clone(),
            ));
        }

        for option in options {
            match option {
                ResourceOption::Host => attributes.extend(detect_host()),
                ResourceOption::Container => attributes.extend(detect_container()),
                ResourceOption::Process => attributes.extend(detect_process()),
                ResourceOption::Attributes(extra) => {
                    validate_attributes(extra)?;
                    attributes.extend(extra.iter().cloned());
                }
            }
        }

        Ok(Self { attributes })
    }

    pub fn attributes(&self) -> &[KeyValue] {
        &self.attributes
    }

    /// Value of `key`; the last occurrence wins.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes
            .iter()
            .rev()
            .find(|kv| kv.key.as_str() == key)
            .map(|kv| &kv.value)
    }

    /// SDK resource: these attributes layered over the SDK defaults.
    pub fn into_resource(self) -> Resource {
        Resource::default().merge(&Resource::new(self.attributes))
    }
}

fn validate_attributes(extra: &[KeyValue]) -> Result<(), TelemetryError> {
    if extra.is_empty() {
        return Err(TelemetryError::config(
            "resource attributes option must carry at least one attribute",
        ));
    }
    for kv in extra {
        let key = kv.key.as_str();
        if key.trim().is_empty() {
            return Err(TelemetryError::config("resource attribute key must not be empty"));
        }
        if key.starts_with("service.") {
            return Err(TelemetryError::config(format!(
                "resource attribute {key:?} conflicts with the configured service identity"
            )));
        }
    }
    Ok(())
}

/// Upper bound handed to each SDK resource detector.
const DETECT_TIMEOUT: Duration = Duration::from_secs(1);

fn detected(detector: Box<dyn ResourceDetector>) -> Vec<KeyValue> {
    Resource::from_detectors(DETECT_TIMEOUT, vec![detector])
        .iter()
        .map(|(k, v)| KeyValue::new(k.clone(), v.clone()))
        .collect()
}

fn detect_host() -> Vec<KeyValue> {
    let mut attrs = detected(Box::new(OsResourceDetector));
    attrs.push(KeyValue::new(semconv::HOST_ARCH, host_arch()));
    attrs
}

/// Map Rust target names to the semantic-convention values.
fn host_arch() -> &'static str {
    match std::env::consts::ARCH {
        "x86_64" => "amd64",
        "aarch64" => "arm64",
        "arm" => "arm32",
        "powerpc" => "ppc32",
        "powerpc64" => "ppc64",
        other => other,
    }
}

// No SDK detector covers `container.id` for this SDK release.
fn detect_container() -> Vec<KeyValue> {
    std::fs::read_to_string("/proc/self/cgroup")
        .ok()
        .and_then(|cgroup| container_id_from_cgroup(&cgroup))
        .map(|id| KeyValue::new(semconv::CONTAINER_ID, id))
        .into_iter()
        .collect()
}

const CONTAINER_ID_LEN: usize = 64;

/// Extract a 64-hex-digit container id from `/proc/<pid>/cgroup` contents.
///
/// Handles plain docker paths (`/docker/<id>`), systemd scopes
/// (`docker-<id>.scope`, `cri-containerd-<id>.scope`) and kubepods paths.
fn container_id_from_cgroup(cgroup: &str) -> Option<String> {
    cgroup.lines().find_map(|line| {
        let path = line.rsplit(':').next()?;
        let last = path.rsplit('/').next()?;
        let last = last.strip_suffix(".scope").unwrap_or(last);
        let id = last.rsplit('-').next()?;
        let is_id = id.len() == CONTAINER_ID_LEN && id.bytes().all(|b| b.is_ascii_hexdigit());
        is_id.then(|| id.to_owned())
    })
}

fn detect_process() -> Vec<KeyValue> {
    detected(Box::new(ProcessResourceDetector))
}

/// Shorthand for building a string resource attribute.
pub fn attribute(key: impl Into<Key>, value: impl Into<String>) -> KeyValue {
    KeyValue::new(key, value.into())
}
