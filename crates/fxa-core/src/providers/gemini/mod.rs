//! Google Gemini provider
//!
//! Text generation with function declarations through `generateContent`.

pub mod auth;
pub mod provider;
pub mod types;

pub use auth::GeminiAuth;
pub use provider::GeminiProvider;

/// Gemini configuration
#[derive(Clone, Debug)]
pub struct GeminiConfig {
    /// Model name for text generation
    pub model: String,
    /// Base URL for API requests
    pub base_url: String,
}

impl GeminiConfig {
    /// Create default configuration for API key auth
    pub fn default_api_key(model: String) -> Self {
        Self::with_base_url(
            model,
            "https://generativelanguage.googleapis.com/v1beta/models".to_string(),
        )
    }

    /// Create configuration with a custom base URL
    pub fn with_base_url(model: String, base_url: String) -> Self {
        Self {
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}
