//! Span exporters and pipeline installation

pub mod appinsights;
#[cfg(feature = "otlp")]
pub mod otlp;

pub use appinsights::AppInsightsExporter;

use crate::{ConnectionTarget, TelemetryError, tracer::AgentIdentity};
use opentelemetry::KeyValue;
use opentelemetry_sdk::{
    Resource, runtime,
    trace::{Config, TracerProvider},
};

/// Provider configuration shared by every pipeline: `service.name` is the agent name
pub fn provider_config(identity: &AgentIdentity) -> Config {
    Config::default().with_resource(Resource::new([
        KeyValue::new("service.name", identity.agent_name.clone()),
        KeyValue::new("service.instance.id", identity.agent_id.clone()),
    ]))
}

/// Build a batching pipeline for the target.
///
/// The batch processor runs on the tokio runtime, so this must be called from
/// within one.
pub fn install_batch(
    target: &ConnectionTarget,
    identity: &AgentIdentity,
) -> Result<TracerProvider, TelemetryError> {
    let builder = TracerProvider::builder().with_config(provider_config(identity));

    let builder = match target {
        ConnectionTarget::AppInsights {
            instrumentation_key,
            ingestion_endpoint,
        } => {
            let exporter = AppInsightsExporter::new(
                instrumentation_key.clone(),
                ingestion_endpoint,
                identity.agent_name.clone(),
            )?;
            builder.with_batch_exporter(exporter, runtime::Tokio)
        }
        #[cfg(feature = "otlp")]
        ConnectionTarget::Otlp { endpoint } => {
            let exporter = otlp::build_exporter(endpoint)?;
            builder.with_batch_exporter(exporter, runtime::Tokio)
        }
        #[cfg(not(feature = "otlp"))]
        ConnectionTarget::Otlp { .. } => return Err(TelemetryError::ExporterUnavailable("otlp")),
    };

    Ok(builder.build())
}
