//! LLM provider implementations
//!
//! # Available Providers
//!
//! - **OpenAI**: chat completions, also used for Azure OpenAI deployments
//! - **Gemini**: Google's `generateContent` API
//!
//! All providers speak function calling, so the agent loop can hand them the
//! tool declarations and read back `FunctionCall` parts.
//!
//! # Example
//!
//! ```ignore
//! use fxa_core::{FxConfig, providers::create_model};
//!
//! let config = FxConfig::load()?;
//! let model = create_model(&config.model.backend()?);
//! ```

pub mod factory;
pub mod gemini;
pub mod openai;

pub use factory::create_model;
pub use gemini::{GeminiAuth, GeminiConfig, GeminiProvider};
pub use openai::{OpenAIAuth, OpenAIConfig, OpenAIProvider};

/// Truncate an error body so a misbehaving backend cannot flood the logs
pub(crate) fn error_excerpt(body: &str) -> &str {
    const MAX: usize = 512;
    if body.len() <= MAX {
        return body;
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
