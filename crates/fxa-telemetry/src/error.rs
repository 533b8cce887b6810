use crate::connection::ConnectionError;
use thiserror::Error;

/// Reasons telemetry could not be attached.
///
/// None of these are fatal: the registry downgrades every one of them to a
/// no-op tracer and a single log line.
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("malformed connection string: {0}")]
    Connection(#[from] ConnectionError),

    #[error("{0} exporter is not available in this build")]
    ExporterUnavailable(&'static str),

    #[error("failed to build {exporter} exporter: {reason}")]
    ExporterBuild {
        exporter: &'static str,
        reason: String,
    },

    #[error("failed to initialize logging: {0}")]
    Logging(String),
}

impl From<TelemetryError> for fxa_core::Error {
    fn from(err: TelemetryError) -> Self {
        fxa_core::Error::Telemetry(err.to_string())
    }
}
