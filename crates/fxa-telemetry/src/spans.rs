//! Span helpers for agent runs, model turns and tool executions
//!
//! Content (prompt, answer, tool arguments and results) is only recorded when
//! the tracer allows it; otherwise sizes are recorded instead.

use crate::attributes::*;
use crate::tracer::{AgentTracer, SpanHandle};
use opentelemetry::KeyValue;
use opentelemetry::trace::SpanKind;

/// Attributes for the top-level span of one `/invoke` request
#[derive(Debug, Clone)]
pub struct AgentRunAttributes<'a> {
    pub invocation_id: &'a str,
    pub prompt: &'a str,
}

/// Attributes for one model turn
#[derive(Debug, Clone)]
pub struct ChatSpanAttributes<'a> {
    pub invocation_id: &'a str,
    pub model: &'a str,
    pub system: &'a str,
}

/// Attributes for one tool execution
#[derive(Debug, Clone)]
pub struct ToolSpanAttributes<'a> {
    pub invocation_id: &'a str,
    pub tool_name: &'a str,
    pub tool_description: &'a str,
    pub tool_call_id: &'a str,
    /// Identifier-only attributes contributed by the tool itself
    pub tool_attributes: Vec<(&'static str, String)>,
    pub args: &'a serde_json::Value,
}

/// Start the `agent.run` span, parented to the current request span
pub fn start_agent_run(tracer: &dyn AgentTracer, attrs: AgentRunAttributes<'_>) -> SpanHandle {
    let mut attributes = vec![
        KeyValue::new(GEN_AI_OPERATION_NAME, "invoke_agent"),
        KeyValue::new(FXA_INVOCATION_ID, attrs.invocation_id.to_string()),
        KeyValue::new(FXA_PROMPT_LENGTH, attrs.prompt.chars().count() as i64),
    ];
    if tracer.content_enabled() {
        attributes.push(KeyValue::new(FXA_PROMPT, attrs.prompt.to_string()));
    }

    tracer.start_span("agent.run", SpanKind::Server, None, attributes)
}

/// Record the final answer on the `agent.run` span
pub fn record_agent_result(tracer: &dyn AgentTracer, span: &SpanHandle, answer: &str) {
    span.set_attribute(KeyValue::new(
        FXA_RESPONSE_LENGTH,
        answer.chars().count() as i64,
    ));
    if tracer.content_enabled() {
        span.set_attribute(KeyValue::new(FXA_RESPONSE, answer.to_string()));
    }
}

/// Start a `chat <model>` span for one model turn
pub fn start_chat(
    tracer: &dyn AgentTracer,
    parent: &SpanHandle,
    attrs: ChatSpanAttributes<'_>,
) -> SpanHandle {
    tracer.start_span(
        &format!("chat {}", attrs.model),
        SpanKind::Client,
        Some(parent),
        vec![
            KeyValue::new(GEN_AI_OPERATION_NAME, "chat"),
            KeyValue::new(GEN_AI_SYSTEM, attrs.system.to_string()),
            KeyValue::new(GEN_AI_REQUEST_MODEL, attrs.model.to_string()),
            KeyValue::new(FXA_INVOCATION_ID, attrs.invocation_id.to_string()),
        ],
    )
}

/// Record token usage and finish reason of a model turn
pub fn record_chat_response(
    span: &SpanHandle,
    usage: Option<fxa_core::Usage>,
    finish_reason: Option<&str>,
) {
    if let Some(usage) = usage {
        span.set_attribute(KeyValue::new(
            GEN_AI_USAGE_INPUT_TOKENS,
            i64::from(usage.input_tokens),
        ));
        span.set_attribute(KeyValue::new(
            GEN_AI_USAGE_OUTPUT_TOKENS,
            i64::from(usage.output_tokens),
        ));
    }
    if let Some(reason) = finish_reason {
        span.set_attribute(KeyValue::new(
            GEN_AI_RESPONSE_FINISH_REASON,
            reason.to_string(),
        ));
    }
}

/// Start an `execute_tool <name>` span
pub fn start_tool(
    tracer: &dyn AgentTracer,
    parent: &SpanHandle,
    attrs: ToolSpanAttributes<'_>,
) -> SpanHandle {
    let mut attributes = vec![
        KeyValue::new(GEN_AI_OPERATION_NAME, "execute_tool"),
        KeyValue::new(GEN_AI_TOOL_NAME, attrs.tool_name.to_string()),
        KeyValue::new(GEN_AI_TOOL_DESCRIPTION, attrs.tool_description.to_string()),
        KeyValue::new(GEN_AI_TOOL_CALL_ID, attrs.tool_call_id.to_string()),
        KeyValue::new(FXA_INVOCATION_ID, attrs.invocation_id.to_string()),
    ];
    attributes.extend(
        attrs
            .tool_attributes
            .into_iter()
            .map(|(key, value)| KeyValue::new(key, value)),
    );
    if tracer.content_enabled() {
        attributes.push(KeyValue::new(
            GEN_AI_TOOL_CALL_ARGUMENTS,
            safe_serialize(attrs.args),
        ));
    }

    tracer.start_span(
        &format!("execute_tool {}", attrs.tool_name),
        SpanKind::Internal,
        Some(parent),
        attributes,
    )
}

/// Record a tool result; an `error` field marks the span as failed
pub fn record_tool_result(tracer: &dyn AgentTracer, span: &SpanHandle, result: &serde_json::Value) {
    if let Some(error) = result.get("error").and_then(|e| e.as_str()) {
        span.record_error(error);
    }
    if tracer.content_enabled() {
        span.set_attribute(KeyValue::new(GEN_AI_TOOL_CALL_RESULT, safe_serialize(result)));
    }
}

/// Helper to safely serialize to JSON string
pub fn safe_serialize<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "<not serializable>".to_string())
}
