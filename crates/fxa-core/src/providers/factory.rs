//! Provider factory
//!
//! Turns a resolved [`LlmBackend`] into a ready-to-use model.

use super::{
    gemini::{GeminiAuth, GeminiConfig, GeminiProvider},
    openai::{OpenAIConfig, OpenAIProvider},
};
use crate::{LLM, LlmBackend};
use std::sync::Arc;

/// Create the model for a backend
pub fn create_model(backend: &LlmBackend) -> Arc<dyn LLM> {
    match backend {
        LlmBackend::OpenAI {
            api_key,
            base_url,
            model,
        } => Arc::new(OpenAIProvider::new(OpenAIConfig::openai(
            api_key.clone(),
            model.clone(),
            base_url.clone(),
        ))),
        LlmBackend::AzureOpenAI {
            endpoint,
            deployment,
            api_key,
            api_version,
        } => Arc::new(OpenAIProvider::new(OpenAIConfig::azure(
            endpoint.clone(),
            deployment.clone(),
            api_key.clone(),
            api_version.clone(),
        ))),
        LlmBackend::Gemini {
            api_key,
            model,
            base_url,
        } => Arc::new(GeminiProvider::new(
            GeminiAuth::ApiKey(api_key.clone()),
            GeminiConfig::with_base_url(model.clone(), base_url.clone()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_model_per_backend() {
        let openai = create_model(&LlmBackend::OpenAI {
            api_key: "sk".into(),
            base_url: "https://api.openai.com/v1".into(),
            model: "gpt-4o-mini".into(),
        });
        assert_eq!(openai.name(), "gpt-4o-mini");
        assert_eq!(openai.system(), "openai");

        let azure = create_model(&LlmBackend::AzureOpenAI {
            endpoint: "https://example.openai.azure.com".into(),
            deployment: "gpt-4o".into(),
            api_key: "key".into(),
            api_version: "2024-06-01".into(),
        });
        assert_eq!(azure.name(), "gpt-4o");
        assert_eq!(azure.system(), "az.ai.openai");

        let gemini = create_model(&LlmBackend::Gemini {
            api_key: "key".into(),
            model: "gemini-2.0-flash".into(),
            base_url: "https://generativelanguage.googleapis.com/v1beta/models".into(),
        });
        assert_eq!(gemini.name(), "gemini-2.0-flash");
        assert_eq!(gemini.system(), "gcp.gemini");
    }
}
