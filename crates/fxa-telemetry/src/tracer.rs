//! Tracer capability
//!
//! [`AgentTracer`] is implemented twice: [`ActiveTracer`] forwards to an
//! OpenTelemetry tracer, [`NoOpTracer`] does nothing. Both hand out
//! [`SpanHandle`]s, which are inert when tracing is off.

use crate::attributes::*;
use fxa_core::TelemetryConfig;
use opentelemetry::{
    Context, KeyValue,
    trace::{SpanKind, Status, TraceContextExt, Tracer as _},
};
use opentelemetry_sdk::trace::Tracer;
use tracing_opentelemetry::OpenTelemetrySpanExt;

/// Identity attached to every span
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentIdentity {
    pub agent_name: String,
    pub agent_id: String,
    pub provider_name: String,
}

impl AgentIdentity {
    pub fn from_config(config: &TelemetryConfig) -> Self {
        Self {
            agent_name: config.agent_name.clone(),
            agent_id: config.agent_id().to_string(),
            provider_name: config.provider_name.clone(),
        }
    }

    fn attributes(&self) -> [KeyValue; 3] {
        [
            KeyValue::new(GEN_AI_AGENT_NAME, self.agent_name.clone()),
            KeyValue::new(GEN_AI_AGENT_ID, self.agent_id.clone()),
            KeyValue::new(GEN_AI_PROVIDER_NAME, self.provider_name.clone()),
        ]
    }
}

/// Span factory shared by the whole process
pub trait AgentTracer: Send + Sync {
    /// Whether spans are exported anywhere
    fn is_enabled(&self) -> bool;

    /// Whether prompts, answers and tool payloads may be recorded
    fn content_enabled(&self) -> bool;

    /// Start a span.
    ///
    /// Without an explicit parent the span is parented to the current
    /// `tracing` span, so it nests under the HTTP request span.
    fn start_span(
        &self,
        name: &str,
        kind: SpanKind,
        parent: Option<&SpanHandle>,
        attributes: Vec<KeyValue>,
    ) -> SpanHandle;

    /// The underlying tracer, for bridging `tracing` spans
    fn otel_tracer(&self) -> Option<Tracer>;
}

/// A started span, or nothing when tracing is disabled
#[derive(Debug, Clone, Default)]
pub struct SpanHandle {
    inner: Option<Context>,
}

impl SpanHandle {
    /// A handle that records nothing
    pub fn disabled() -> Self {
        Self { inner: None }
    }

    pub fn is_recording(&self) -> bool {
        self.inner
            .as_ref()
            .is_some_and(|cx| cx.span().is_recording())
    }

    pub fn set_attribute(&self, attribute: KeyValue) {
        if let Some(cx) = &self.inner {
            cx.span().set_attribute(attribute);
        }
    }

    /// Mark the span as failed
    pub fn record_error(&self, message: impl Into<String>) {
        if let Some(cx) = &self.inner {
            cx.span().set_status(Status::error(message.into()));
        }
    }

    /// Hex trace id, if recording
    pub fn trace_id(&self) -> Option<String> {
        self.inner.as_ref().and_then(|cx| {
            let span_context = cx.span().span_context().clone();
            span_context
                .is_valid()
                .then(|| span_context.trace_id().to_string())
        })
    }

    pub fn end(&self) {
        if let Some(cx) = &self.inner {
            cx.span().end();
        }
    }
}

/// Exporter-backed tracer
pub struct ActiveTracer {
    tracer: Tracer,
    identity: AgentIdentity,
    enable_content: bool,
}

impl ActiveTracer {
    pub fn new(tracer: Tracer, identity: AgentIdentity, enable_content: bool) -> Self {
        Self {
            tracer,
            identity,
            enable_content,
        }
    }
}

impl AgentTracer for ActiveTracer {
    fn is_enabled(&self) -> bool {
        true
    }

    fn content_enabled(&self) -> bool {
        self.enable_content
    }

    fn start_span(
        &self,
        name: &str,
        kind: SpanKind,
        parent: Option<&SpanHandle>,
        attributes: Vec<KeyValue>,
    ) -> SpanHandle {
        let parent_cx = match parent.and_then(|p| p.inner.clone()) {
            Some(cx) => cx,
            None => tracing::Span::current().context(),
        };

        let mut all_attributes = Vec::with_capacity(attributes.len() + 3);
        all_attributes.extend(self.identity.attributes());
        all_attributes.extend(attributes);

        let span = self
            .tracer
            .span_builder(name.to_string())
            .with_kind(kind)
            .with_attributes(all_attributes)
            .start_with_context(&self.tracer, &parent_cx);

        SpanHandle {
            inner: Some(parent_cx.with_span(span)),
        }
    }

    fn otel_tracer(&self) -> Option<Tracer> {
        Some(self.tracer.clone())
    }
}

/// Tracer used when telemetry is not attached
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpTracer;

impl AgentTracer for NoOpTracer {
    fn is_enabled(&self) -> bool {
        false
    }

    fn content_enabled(&self) -> bool {
        false
    }

    fn start_span(
        &self,
        _name: &str,
        _kind: SpanKind,
        _parent: Option<&SpanHandle>,
        _attributes: Vec<KeyValue>,
    ) -> SpanHandle {
        SpanHandle::disabled()
    }

    fn otel_tracer(&self) -> Option<Tracer> {
        None
    }
}
