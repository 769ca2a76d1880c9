//! End-to-end construction and teardown of a [`Telemetry`] handle.

use std::time::{Duration, Instant};

use otelemetry::{
    attribute, EmitContext, Exporter, KeyValue, ResourceOption, Service, Telemetry,
    TelemetryConfig, TelemetryError,
};

fn test_config(name: &str) -> TelemetryConfig {
    TelemetryConfig::new(Service {
        name: name.into(),
        namespace: "test-namespace".into(),
        version: "1.0.0".into(),
    })
    .with_collector("localhost", 4317)
}

fn pod_resources(pod_name: &str) -> Vec<ResourceOption> {
    let pod_name = if pod_name.is_empty() { "default-pod" } else { pod_name };
    vec![
        ResourceOption::Host,
        ResourceOption::Container,
        ResourceOption::Attributes(vec![attribute("pod.name", pod_name)]),
    ]
}

#[tokio::test]
async fn missing_service_name_is_config_error() {
    let err = Telemetry::new(&test_config("")).unwrap_err();
    assert!(matches!(err, TelemetryError::Config(_)));
}

#[tokio::test]
async fn invalid_resource_options_are_config_error() {
    let cfg = test_config("test-service").with_resource_option(ResourceOption::Attributes(vec![]));
    let err = Telemetry::new(&cfg).unwrap_err();
    assert!(matches!(err, TelemetryError::Config(_)));
}

#[tokio::test]
async fn empty_scope_name_is_config_error() {
    let cfg = test_config("test-service").with_scope_name("");
    assert!(Telemetry::new(&cfg).unwrap_err().is_config());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn shutdown_with_expired_deadline_times_out() {
    let tel = Telemetry::new(&test_config("test-service")).expect("telemetry builds");

    let err = tel.shutdown(Instant::now()).await.unwrap_err();
    assert!(matches!(err, TelemetryError::ShutdownTimeout(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn builds_with_resources() {
    let mut cfg = test_config("test-service");
    cfg.resource_options = pod_resources("test-pod");

    let tel = Telemetry::new(&cfg).expect("telemetry builds");
    tel.log().info(
        &EmitContext::background(),
        "started",
        [KeyValue::new("attempt", 1_i64)],
    );
    // No collector is running: the expired deadline returns at once and the
    // OTLP exporter drains in the background.
    let err = tel.shutdown(Instant::now()).await.unwrap_err();
    assert!(matches!(err, TelemetryError::ShutdownTimeout(d) if d.is_zero()));
}

#[tokio::test]
async fn malformed_collector_endpoint_is_transport_error() {
    let cfg = test_config("test-service").with_collector("bad host", 4317);
    let err = Telemetry::new(&cfg).unwrap_err();
    assert!(matches!(err, TelemetryError::Transport(_)), "got {err}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn stdout_exporter_round_trip() {
    let cfg = test_config("test-service").with_exporter(Exporter::Stdout);
    let tel = Telemetry::new(&cfg).expect("telemetry builds");

    let ctx = EmitContext::current();
    let log = tel.log();
    log.debug(&ctx, "hello", [KeyValue::new("k", "v")]);
    log.warning(&ctx, "careful", []);
    log.fatal(&ctx, "still running afterwards", []);

    let deadline = Instant::now() + Duration::from_secs(10);
    tel.force_flush(deadline).await.expect("flush succeeds");
    tel.shutdown(deadline).await.expect("shutdown succeeds");
}
