// Telemetry attachment tests
// The process-wide registry is attached once per test binary, so only
// `test_global_attach_without_connection_is_noop` touches it.

use fxa_core::TelemetryConfig;
use fxa_telemetry::{AttachStatus, SpanKind, TelemetryRegistry};

fn config(connection: &str) -> TelemetryConfig {
    TelemetryConfig {
        connection_string: Some(connection.to_string()),
        ..TelemetryConfig::default()
    }
}

#[test]
fn test_global_attach_without_connection_is_noop() {
    let cfg = TelemetryConfig::default();

    let first = fxa_telemetry::attach(&cfg);
    let second = fxa_telemetry::attach(&cfg);

    assert!(!first.is_enabled());
    assert!(!second.is_enabled());
    assert_eq!(fxa_telemetry::exporter_count(), 0);
    assert_eq!(fxa_telemetry::status(), Some(AttachStatus::NotConfigured));

    // Spans on the no-op tracer record nothing and never fail
    let span = first.start_span("agent.run", SpanKind::Server, None, vec![]);
    assert!(!span.is_recording());
    span.end();

    fxa_telemetry::shutdown();
}

#[test]
fn test_malformed_connection_string_disables_telemetry() {
    let registry = TelemetryRegistry::new();
    let tracer = registry.attach(&config("InstrumentationKey"));

    assert!(!tracer.is_enabled());
    assert_eq!(registry.exporter_count(), 0);
    assert!(matches!(
        registry.status(),
        Some(AttachStatus::Unavailable { .. })
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_app_insights_attach_twice_exports_once() {
    let mut server = mockito::Server::new_async().await;
    let track = server
        .mock("POST", "/v2.1/track")
        .with_status(200)
        .with_body(r#"{"itemsReceived":1,"itemsAccepted":1,"errors":[]}"#)
        .expect_at_least(1)
        .create_async()
        .await;

    let registry = std::sync::Arc::new(TelemetryRegistry::new());
    let cfg = config(&format!(
        "InstrumentationKey=00000000-0000-0000-0000-000000000000;IngestionEndpoint={}",
        server.url()
    ));

    let first = registry.attach(&cfg);
    let second = registry.attach(&cfg);

    assert!(first.is_enabled());
    assert!(std::sync::Arc::ptr_eq(&first, &second));
    assert_eq!(registry.exporter_count(), 1);
    assert_eq!(
        registry.status(),
        Some(AttachStatus::Enabled {
            exporter: "appinsights"
        })
    );

    let span = first.start_span("agent.run", SpanKind::Server, None, vec![]);
    assert!(span.is_recording());
    span.end();

    // Flushing blocks until the batch is exported
    let flushing = registry.clone();
    tokio::task::spawn_blocking(move || flushing.shutdown())
        .await
        .unwrap();

    track.assert_async().await;
}
