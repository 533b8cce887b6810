use super::{Content, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// LLM trait - abstraction for language models
#[async_trait]
pub trait LLM: Send + Sync {
    /// Returns the name of the model
    fn name(&self) -> &str;

    /// Returns the backend family (e.g. "openai", "azure.openai", "gcp.gemini")
    fn system(&self) -> &str;

    /// Runs a single completion turn
    async fn generate_content(&self, request: LLMRequest) -> Result<LLMResponse>;
}

/// Tool trait - abstraction for callable tools
#[async_trait]
pub trait Tool: Send + Sync {
    /// Returns the name of the tool
    fn name(&self) -> &str;

    /// Returns a description of what the tool does
    fn description(&self) -> &str;

    /// Returns the JSON schema for the tool's parameters
    fn schema(&self) -> serde_json::Value;

    /// Span attributes derived from the call arguments.
    ///
    /// These are recorded even when content capture is disabled, so they must
    /// only carry identifiers, never free text.
    fn trace_attributes(&self, _params: &serde_json::Value) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    /// Executes the tool with given parameters
    async fn execute(
        &self,
        ctx: Arc<dyn ToolContext>,
        params: serde_json::Value,
    ) -> Result<ToolResponse>;

    /// Declaration sent to the model
    fn declaration(&self) -> ToolDeclaration {
        ToolDeclaration {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.schema(),
        }
    }
}

/// Tool context provided during tool execution
pub trait ToolContext: Send + Sync {
    fn function_call_id(&self) -> &str;
    fn invocation_id(&self) -> &str;
}

/// Function declaration as advertised to a model
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDeclaration {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// Request to an LLM
#[derive(Debug, Clone)]
pub struct LLMRequest {
    pub model: String,
    pub system_instruction: Option<String>,
    pub contents: Vec<Content>,
    pub tools: Vec<ToolDeclaration>,
    pub config: Option<GenerateConfig>,
}

/// Response from an LLM
#[derive(Debug, Clone)]
pub struct LLMResponse {
    pub content: Content,
    pub finish_reason: Option<String>,
    pub usage: Option<Usage>,
}

/// Token accounting reported by the backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Tool execution response
#[derive(Debug, Clone)]
pub struct ToolResponse {
    pub result: serde_json::Value,
}

/// Generation configuration
#[derive(Debug, Clone, Default)]
pub struct GenerateConfig {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub top_p: Option<f32>,
}
