//! # FXA Telemetry
//!
//! Optional OpenTelemetry tracing for the agent.
//!
//! Telemetry is attached once per process from a [`TelemetryConfig`]. When the
//! connection value is missing, malformed, or names an exporter this build
//! does not include, attachment yields a [`NoOpTracer`] and the rest of the
//! service runs unchanged. Call sites only ever see `Arc<dyn AgentTracer>`.
//!
//! [`TelemetryConfig`]: fxa_core::TelemetryConfig

pub mod connection;
pub mod error;
pub mod exporter;
pub mod logging;
pub mod registry;
pub mod spans;
pub mod testing;
pub mod tracer;

pub use connection::{ConnectionError, ConnectionTarget};
pub use error::TelemetryError;
pub use logging::{LogFormat, init_logging};
pub use registry::{AttachStatus, TelemetryRegistry, attach, exporter_count, shutdown, status};
pub use tracer::{ActiveTracer, AgentIdentity, AgentTracer, NoOpTracer, SpanHandle};

// Re-exported so callers can pick span kinds without depending on opentelemetry
pub use opentelemetry::trace::SpanKind;

/// Span attribute names.
///
/// Names under `gen_ai.*` follow the OpenTelemetry semantic conventions for
/// generative AI; `fx.*` and `fxa.*` are specific to this service.
pub mod attributes {
    // Agent identity, present on every span
    pub const GEN_AI_AGENT_NAME: &str = "gen_ai.agent.name";
    pub const GEN_AI_AGENT_ID: &str = "gen_ai.agent.id";
    pub const GEN_AI_PROVIDER_NAME: &str = "gen_ai.provider.name";

    // Generic AI attributes
    pub const GEN_AI_OPERATION_NAME: &str = "gen_ai.operation.name";
    pub const GEN_AI_SYSTEM: &str = "gen_ai.system";
    pub const GEN_AI_REQUEST_MODEL: &str = "gen_ai.request.model";
    pub const GEN_AI_RESPONSE_FINISH_REASON: &str = "gen_ai.response.finish_reasons";
    pub const GEN_AI_USAGE_INPUT_TOKENS: &str = "gen_ai.usage.input_tokens";
    pub const GEN_AI_USAGE_OUTPUT_TOKENS: &str = "gen_ai.usage.output_tokens";

    // Tool-specific attributes
    pub const GEN_AI_TOOL_NAME: &str = "gen_ai.tool.name";
    pub const GEN_AI_TOOL_DESCRIPTION: &str = "gen_ai.tool.description";
    pub const GEN_AI_TOOL_CALL_ID: &str = "gen_ai.tool.call.id";
    pub const GEN_AI_TOOL_CALL_ARGUMENTS: &str = "gen_ai.tool.call.arguments";
    pub const GEN_AI_TOOL_CALL_RESULT: &str = "gen_ai.tool.call.result";

    // Content, only recorded when content capture is enabled
    pub const FXA_PROMPT: &str = "fxa.prompt";
    pub const FXA_RESPONSE: &str = "fxa.response";
    pub const FXA_PROMPT_LENGTH: &str = "fxa.prompt.length";
    pub const FXA_RESPONSE_LENGTH: &str = "fxa.response.length";

    // Request correlation
    pub const FXA_INVOCATION_ID: &str = "fxa.invocation_id";

    // Exchange-rate lookup
    pub const FX_CURRENCY_BASE: &str = "fx.currency.base";
    pub const FX_CURRENCY_TARGET: &str = "fx.currency.target";

    /// Instrumentation scope name
    pub const SYSTEM_NAME: &str = "fxa";
}
