//! OpenAI provider
//!
//! Chat completions with function calling. The same wire format serves
//! Azure OpenAI deployments; only the URL layout and the auth header differ.

pub mod provider;
pub mod types;

pub use provider::OpenAIProvider;

/// How requests are authenticated
#[derive(Clone, Debug)]
pub enum OpenAIAuth {
    /// `Authorization: Bearer <key>` (api.openai.com and compatible servers)
    Bearer(String),
    /// `api-key: <key>` (Azure OpenAI)
    AzureApiKey(String),
}

impl OpenAIAuth {
    pub fn apply(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self {
            OpenAIAuth::Bearer(key) => builder.bearer_auth(key),
            OpenAIAuth::AzureApiKey(key) => builder.header("api-key", key),
        }
    }
}

/// OpenAI configuration
#[derive(Clone, Debug)]
pub struct OpenAIConfig {
    /// Model name (or Azure deployment name)
    pub model: String,
    /// Full chat completions URL
    pub url: String,
    pub auth: OpenAIAuth,
    /// Value reported as `gen_ai.system`
    pub system: &'static str,
}

impl OpenAIConfig {
    /// Configuration for api.openai.com or a compatible base URL
    pub fn openai(api_key: String, model: String, base_url: String) -> Self {
        Self {
            model,
            url: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            auth: OpenAIAuth::Bearer(api_key),
            system: "openai",
        }
    }

    /// Configuration for an Azure OpenAI deployment
    pub fn azure(endpoint: String, deployment: String, api_key: String, api_version: String) -> Self {
        Self {
            url: format!(
                "{}/openai/deployments/{}/chat/completions?api-version={}",
                endpoint.trim_end_matches('/'),
                deployment,
                api_version
            ),
            model: deployment,
            auth: OpenAIAuth::AzureApiKey(api_key),
            system: "az.ai.openai",
        }
    }
}
