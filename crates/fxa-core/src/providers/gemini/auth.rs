//! Gemini authentication strategies

use reqwest::RequestBuilder;

/// Authentication method for Gemini API
#[derive(Clone, Debug)]
pub enum GeminiAuth {
    /// API Key authentication (for generativelanguage.googleapis.com)
    ApiKey(String),
}

impl GeminiAuth {
    /// Apply authentication to a request builder
    pub fn apply(&self, builder: RequestBuilder) -> RequestBuilder {
        match self {
            GeminiAuth::ApiKey(key) => builder.query(&[("key", key.as_str())]),
        }
    }
}
