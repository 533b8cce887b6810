use crate::agent::{Agent, Invocation};
use crate::builder::LLMAgentBuilder;
use async_trait::async_trait;
use fxa_core::{
    Content, Error, FunctionCall, FunctionResponse, GenerateConfig, LLM, LLMRequest, Result, Tool,
};
use fxa_telemetry::{
    AgentTracer, SpanHandle,
    spans::{self, ChatSpanAttributes, ToolSpanAttributes},
};
use fxa_tool::DefaultToolContext;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Model turns allowed per invocation before giving up
pub const DEFAULT_MAX_TURNS: usize = 5;

pub const SYSTEM_INSTRUCTION: &str = "You are a helpful assistant that only answers questions \
about currency exchange rates. Always choose the get_exchange_rate tool when you need fresh FX \
data. Decline unrelated requests politely.";

/// Agent that alternates model turns and tool calls until the model answers
pub struct LLMAgent {
    pub(crate) name: String,
    pub(crate) model: Arc<dyn LLM>,
    pub(crate) system_instruction: String,
    pub(crate) tools: BTreeMap<String, Arc<dyn Tool>>,
    pub(crate) tracer: Arc<dyn AgentTracer>,
    pub(crate) generate_config: Option<GenerateConfig>,
    pub(crate) max_turns: usize,
}

impl LLMAgent {
    pub fn builder() -> LLMAgentBuilder {
        LLMAgentBuilder::new()
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Run one tool call. Failures become `{"error": ...}` for the model.
    async fn execute_tool(
        &self,
        call: &FunctionCall,
        invocation: &Invocation,
        parent: &SpanHandle,
    ) -> Value {
        let call_id = call
            .id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        let Some(tool) = self.tools.get(&call.name) else {
            tracing::warn!(
                invocation_id = %invocation.id,
                tool_name = %call.name,
                "Model requested an unknown tool"
            );
            return json!({ "error": format!("Tool '{}' is not available", call.name) });
        };

        let span = spans::start_tool(
            self.tracer.as_ref(),
            parent,
            ToolSpanAttributes {
                invocation_id: &invocation.id,
                tool_name: tool.name(),
                tool_description: tool.description(),
                tool_call_id: &call_id,
                tool_attributes: tool.trace_attributes(&call.args),
                args: &call.args,
            },
        );

        tracing::debug!(
            invocation_id = %invocation.id,
            tool_name = %call.name,
            tool_call_id = %call_id,
            "Executing tool"
        );

        let ctx = Arc::new(DefaultToolContext::new(call_id.clone(), invocation.id.clone()));
        let result = match tool.execute(ctx, call.args.clone()).await {
            Ok(response) => response.result,
            Err(e) => {
                let err = Error::ToolFailed {
                    tool: call.name.clone(),
                    source: anyhow::Error::new(e),
                };
                tracing::warn!(
                    invocation_id = %invocation.id,
                    tool_call_id = %call_id,
                    error = %err,
                    "Tool execution failed"
                );
                json!({ "error": err.to_string() })
            }
        };

        spans::record_tool_result(self.tracer.as_ref(), &span, &result);
        span.end();
        result
    }
}

#[async_trait]
impl Agent for LLMAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, invocation: &Invocation, span: &SpanHandle) -> Result<String> {
        let declarations: Vec<_> = self.tools.values().map(|tool| tool.declaration()).collect();
        let mut conversation = vec![Content::new_user_text(invocation.prompt.clone())];

        tracing::info!(
            invocation_id = %invocation.id,
            agent = %self.name,
            model = %self.model.name(),
            "Starting LLM agent execution"
        );

        for turn in 0..self.max_turns {
            let request = LLMRequest {
                model: self.model.name().to_string(),
                system_instruction: Some(self.system_instruction.clone()),
                contents: conversation.clone(),
                tools: declarations.clone(),
                config: self.generate_config.clone(),
            };

            let chat_span = spans::start_chat(
                self.tracer.as_ref(),
                span,
                ChatSpanAttributes {
                    invocation_id: &invocation.id,
                    model: self.model.name(),
                    system: self.model.system(),
                },
            );

            tracing::debug!(invocation_id = %invocation.id, turn, "Calling LLM");

            let response = match self.model.generate_content(request).await {
                Ok(response) => response,
                Err(e) => {
                    chat_span.record_error(e.to_string());
                    chat_span.end();
                    tracing::error!(
                        invocation_id = %invocation.id,
                        turn,
                        error = %e,
                        "LLM call failed"
                    );
                    return Err(e);
                }
            };

            spans::record_chat_response(
                &chat_span,
                response.usage,
                response.finish_reason.as_deref(),
            );
            chat_span.end();

            let function_calls = response.content.function_calls();

            // No function calls: this is the final answer
            if function_calls.is_empty() {
                let answer = response.content.text().trim().to_string();
                if answer.is_empty() {
                    return Err(Error::llm_error("model returned an empty answer"));
                }
                tracing::info!(
                    invocation_id = %invocation.id,
                    turns = turn + 1,
                    "Agent execution completed"
                );
                return Ok(answer);
            }

            conversation.push(response.content);

            let mut function_responses = Vec::with_capacity(function_calls.len());
            for call in &function_calls {
                let result = self.execute_tool(call, invocation, span).await;
                function_responses.push(FunctionResponse {
                    name: call.name.clone(),
                    response: result,
                    id: call.id.clone(),
                });
            }
            conversation.push(Content::function_responses(function_responses));
        }

        tracing::warn!(
            invocation_id = %invocation.id,
            max_turns = self.max_turns,
            "Model did not produce a final answer"
        );
        Err(Error::llm_error(format!(
            "no final answer after {} model turns",
            self.max_turns
        )))
    }
}
