//! Core traits and types for the currency-exchange agent
//!
//! This crate provides the shared vocabulary of the workspace: the message
//! model exchanged with language models, the `LLM` and `Tool` abstractions,
//! configuration loading and the concrete model providers.

pub mod config;
pub mod content;
pub mod error;
pub mod providers;
pub mod traits;

// Re-exports
pub use config::{
    AzureOpenAISettings, ExchangeConfig, FxConfig, GeminiSettings, LlmBackend, ModelConfig,
    OpenAISettings, ProviderKind, ServerConfig, TelemetryConfig,
};
pub use content::{Content, FunctionCall, FunctionResponse, Part};
pub use error::{Error, Result};
pub use traits::{
    GenerateConfig, LLM, LLMRequest, LLMResponse, Tool, ToolContext, ToolDeclaration,
    ToolResponse, Usage,
};
