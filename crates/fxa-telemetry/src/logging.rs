//! Structured logging setup
//!
//! Logs go to stdout through `tracing-subscriber`. When telemetry is attached
//! the same subscriber also bridges `tracing` spans (the HTTP request spans)
//! into the exporter, so agent spans nest under them.

use crate::{TelemetryError, tracer::AgentTracer};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Output format for log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    /// `FXA_LOG_FORMAT=json` selects JSON output
    pub fn from_env() -> Self {
        Self::parse(std::env::var("FXA_LOG_FORMAT").ok().as_deref())
    }

    fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()) {
            Some(v) if v == "json" => LogFormat::Json,
            _ => LogFormat::Text,
        }
    }
}

/// Install the global subscriber.
///
/// The filter comes from `RUST_LOG` and defaults to `info`. Fails if a global
/// subscriber is already set.
pub fn init_logging(tracer: &dyn AgentTracer, format: LogFormat) -> Result<(), TelemetryError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let otel_layer = tracer
        .otel_tracer()
        .map(|t| tracing_opentelemetry::layer().with_tracer(t));

    let registry = tracing_subscriber::registry().with(filter).with(otel_layer);

    let result = match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_target(true).with_current_span(true))
            .try_init(),
        LogFormat::Text => registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .try_init(),
    };

    result.map_err(|e| TelemetryError::Logging(e.to_string()))
}
