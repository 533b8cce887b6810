//! OTLP/HTTP exporter, compiled in with the `otlp` feature

use crate::TelemetryError;
use url::Url;

pub fn build_exporter(endpoint: &Url) -> Result<opentelemetry_otlp::SpanExporter, TelemetryError> {
    use opentelemetry_otlp::WithExportConfig;

    opentelemetry_otlp::new_exporter()
        .http()
        .with_endpoint(endpoint.as_str())
        .build_span_exporter()
        .map_err(|e| TelemetryError::ExporterBuild {
            exporter: "otlp",
            reason: e.to_string(),
        })
}
