//! Process-wide telemetry attachment
//!
//! The first call to [`attach`] decides, once, whether spans are exported.
//! Later calls return the same tracer and never install a second pipeline.

use crate::{
    ConnectionTarget, TelemetryError,
    attributes::SYSTEM_NAME,
    exporter,
    tracer::{ActiveTracer, AgentIdentity, AgentTracer, NoOpTracer},
};
use fxa_core::TelemetryConfig;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::TracerProvider;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

/// Outcome of the attachment decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachStatus {
    /// Spans are exported
    Enabled { exporter: &'static str },
    /// No connection value was configured
    NotConfigured,
    /// A connection value was configured but could not be used
    Unavailable { reason: String },
}

impl AttachStatus {
    pub fn is_enabled(&self) -> bool {
        matches!(self, AttachStatus::Enabled { .. })
    }

    /// Emit the decision as a single log line
    pub fn log(&self) {
        match self {
            AttachStatus::Enabled { exporter } => {
                tracing::info!(exporter, "Telemetry enabled");
            }
            AttachStatus::NotConfigured => {
                tracing::info!("Telemetry disabled: no connection string configured");
            }
            AttachStatus::Unavailable { reason } => {
                tracing::warn!(reason = %reason, "Telemetry disabled");
            }
        }
    }
}

struct Attached {
    tracer: Arc<dyn AgentTracer>,
    provider: Option<TracerProvider>,
    status: AttachStatus,
}

/// Guards the single exporter pipeline
pub struct TelemetryRegistry {
    attached: OnceLock<Attached>,
    exporters: AtomicUsize,
    shut_down: AtomicBool,
}

impl TelemetryRegistry {
    pub const fn new() -> Self {
        Self {
            attached: OnceLock::new(),
            exporters: AtomicUsize::new(0),
            shut_down: AtomicBool::new(false),
        }
    }

    /// Attach with the batching exporters for the configured target
    pub fn attach(&self, config: &TelemetryConfig) -> Arc<dyn AgentTracer> {
        self.attach_with(config, exporter::install_batch)
    }

    /// Attach with a custom pipeline installer.
    ///
    /// `install` runs at most once per registry, and only when the connection
    /// value parses. Its errors downgrade telemetry to a no-op tracer.
    pub fn attach_with<F>(&self, config: &TelemetryConfig, install: F) -> Arc<dyn AgentTracer>
    where
        F: FnOnce(&ConnectionTarget, &AgentIdentity) -> Result<TracerProvider, TelemetryError>,
    {
        let attached = self.attached.get_or_init(|| {
            let identity = AgentIdentity::from_config(config);
            match Self::decide(config, &identity, install) {
                Ok(Some((provider, exporter))) => {
                    self.exporters.fetch_add(1, Ordering::SeqCst);
                    let tracer = ActiveTracer::new(
                        provider.tracer(SYSTEM_NAME),
                        identity,
                        config.enable_content,
                    );
                    Attached {
                        tracer: Arc::new(tracer),
                        provider: Some(provider),
                        status: AttachStatus::Enabled { exporter },
                    }
                }
                Ok(None) => Self::disabled(AttachStatus::NotConfigured),
                Err(err) => Self::disabled(AttachStatus::Unavailable {
                    reason: err.to_string(),
                }),
            }
        });

        attached.tracer.clone()
    }

    fn decide<F>(
        config: &TelemetryConfig,
        identity: &AgentIdentity,
        install: F,
    ) -> Result<Option<(TracerProvider, &'static str)>, TelemetryError>
    where
        F: FnOnce(&ConnectionTarget, &AgentIdentity) -> Result<TracerProvider, TelemetryError>,
    {
        let Some(value) = config.connection_value() else {
            return Ok(None);
        };
        let Some(target) = ConnectionTarget::parse(value)? else {
            return Ok(None);
        };

        let provider = install(&target, identity)?;
        Ok(Some((provider, target.exporter_name())))
    }

    fn disabled(status: AttachStatus) -> Attached {
        Attached {
            tracer: Arc::new(NoOpTracer),
            provider: None,
            status,
        }
    }

    /// Number of exporter pipelines installed; never more than one
    pub fn exporter_count(&self) -> usize {
        self.exporters.load(Ordering::SeqCst)
    }

    /// The attachment decision, once made
    pub fn status(&self) -> Option<AttachStatus> {
        self.attached.get().map(|a| a.status.clone())
    }

    /// Flush pending spans and shut the pipeline down.
    ///
    /// Only the first call does anything. With the batch processor this
    /// blocks, so call it from a blocking context.
    pub fn shutdown(&self) {
        if self.shut_down.swap(true, Ordering::SeqCst) {
            return;
        }
        let Some(provider) = self.attached.get().and_then(|a| a.provider.as_ref()) else {
            return;
        };

        for result in provider.force_flush() {
            if let Err(e) = result {
                tracing::warn!(error = %e, "Failed to flush spans");
            }
        }
        if let Err(e) = provider.shutdown() {
            tracing::warn!(error = %e, "Failed to shut down tracer provider");
        }
    }
}

impl Default for TelemetryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL: TelemetryRegistry = TelemetryRegistry::new();

/// Attach telemetry for the process
pub fn attach(config: &TelemetryConfig) -> Arc<dyn AgentTracer> {
    GLOBAL.attach(config)
}

pub fn exporter_count() -> usize {
    GLOBAL.exporter_count()
}

pub fn status() -> Option<AttachStatus> {
    GLOBAL.status()
}

/// Flush and stop the process-wide pipeline; a no-op when telemetry is disabled
pub fn shutdown() {
    GLOBAL.shutdown()
}
