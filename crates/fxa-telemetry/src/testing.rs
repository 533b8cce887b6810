//! In-memory span capture for tests.
//!
//! ```ignore
//! let exporter = RecordingExporter::new();
//! let tracer = TelemetryRegistry::new().attach_with(&config, exporter.installer());
//! // ... exercise the agent ...
//! assert_eq!(exporter.spans_named("execute_tool get_exchange_rate").len(), 1);
//! ```

use crate::{ConnectionTarget, TelemetryError, exporter, tracer::AgentIdentity};
use futures::future::BoxFuture;
use opentelemetry::KeyValue;
use opentelemetry_sdk::{
    export::trace::{ExportResult, SpanData, SpanExporter},
    trace::TracerProvider,
};
use std::sync::{Arc, Mutex, PoisonError};

/// Exporter that keeps every finished span in memory
#[derive(Debug, Clone, Default)]
pub struct RecordingExporter {
    spans: Arc<Mutex<Vec<SpanData>>>,
}

impl RecordingExporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spans finished so far, in end order
    pub fn spans(&self) -> Vec<SpanData> {
        self.spans
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn spans_named(&self, name: &str) -> Vec<SpanData> {
        self.spans()
            .into_iter()
            .filter(|span| span.name == name)
            .collect()
    }

    /// Installer for [`crate::TelemetryRegistry::attach_with`] that exports
    /// synchronously into this recorder
    pub fn installer(
        &self,
    ) -> impl FnOnce(&ConnectionTarget, &AgentIdentity) -> Result<TracerProvider, TelemetryError>
    {
        let exporter = self.clone();
        move |_target, identity| {
            Ok(TracerProvider::builder()
                .with_simple_exporter(exporter)
                .with_config(exporter::provider_config(identity))
                .build())
        }
    }
}

impl SpanExporter for RecordingExporter {
    fn export(&mut self, batch: Vec<SpanData>) -> BoxFuture<'static, ExportResult> {
        self.spans
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(batch);
        Box::pin(std::future::ready(Ok(())))
    }
}

/// Look up a string attribute on a recorded span
pub fn attribute(span: &SpanData, key: &str) -> Option<String> {
    span.attributes
        .iter()
        .find(|kv: &&KeyValue| kv.key.as_str() == key)
        .map(|kv| kv.value.as_str().into_owned())
}
