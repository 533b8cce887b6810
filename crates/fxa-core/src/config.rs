//! Configuration management
//!
//! Configuration is assembled in three layers, later layers winning:
//! 1. Built-in defaults
//! 2. `fxa.toml` (or an explicitly specified file); `${VAR}` references in
//!    string values are resolved against the environment
//! 3. Environment variables
//!
//! The result is read once at startup and is immutable afterwards.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const CONFIG_FILE_NAME: &str = "fxa.toml";

/// Process-wide configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FxConfig {
    #[serde(default)]
    pub model: ModelConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub telemetry: TelemetryConfig,

    #[serde(default)]
    pub exchange: ExchangeConfig,
}

/// Supported model backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderKind {
    #[serde(rename = "openai")]
    OpenAI,
    #[serde(rename = "azure-openai")]
    AzureOpenAI,
    Gemini,
}

impl FromStr for ProviderKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAI),
            "azure-openai" | "azure_openai" | "azure" => Ok(ProviderKind::AzureOpenAI),
            "gemini" | "google" => Ok(ProviderKind::Gemini),
            other => Err(Error::config_error(format!(
                "Unknown LLM provider '{}'. Expected one of: openai, azure-openai, gemini",
                other
            ))),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProviderKind::OpenAI => "openai",
            ProviderKind::AzureOpenAI => "azure-openai",
            ProviderKind::Gemini => "gemini",
        };
        f.write_str(name)
    }
}

/// Model/LLM configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Explicit backend selection; auto-detected from credentials when unset
    pub provider: Option<ProviderKind>,

    #[serde(default)]
    pub openai: OpenAISettings,

    #[serde(default)]
    pub azure_openai: AzureOpenAISettings,

    #[serde(default)]
    pub gemini: GeminiSettings,

    /// Identifier of a pre-built hosted agent. Only used as telemetry identity.
    pub agent_id: Option<String>,

    pub temperature: Option<f32>,

    /// Provider name from the environment that no backend here implements
    #[serde(skip)]
    pub unsupported_provider: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAISettings {
    pub api_key: Option<String>,

    #[serde(default = "default_openai_base_url")]
    pub base_url: String,

    #[serde(default = "default_openai_model")]
    pub model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AzureOpenAISettings {
    pub endpoint: Option<String>,
    pub deployment: Option<String>,
    pub api_key: Option<String>,

    #[serde(default = "default_azure_api_version")]
    pub api_version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiSettings {
    pub api_key: Option<String>,
    pub model_name: Option<String>,

    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,
}

/// A fully specified backend, ready to be turned into a provider
#[derive(Debug, Clone, PartialEq)]
pub enum LlmBackend {
    OpenAI {
        api_key: String,
        base_url: String,
        model: String,
    },
    AzureOpenAI {
        endpoint: String,
        deployment: String,
        api_key: String,
        api_version: String,
    },
    Gemini {
        api_key: String,
        model: String,
        base_url: String,
    },
}

impl LlmBackend {
    pub fn kind(&self) -> ProviderKind {
        match self {
            LlmBackend::OpenAI { .. } => ProviderKind::OpenAI,
            LlmBackend::AzureOpenAI { .. } => ProviderKind::AzureOpenAI,
            LlmBackend::Gemini { .. } => ProviderKind::Gemini,
        }
    }

    /// Model or deployment identifier
    pub fn model(&self) -> &str {
        match self {
            LlmBackend::OpenAI { model, .. } => model,
            LlmBackend::AzureOpenAI { deployment, .. } => deployment,
            LlmBackend::Gemini { model, .. } => model,
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Deadline for a whole `/invoke` request, model turns and tool calls included
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Telemetry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Application Insights connection string or OTLP/HTTP endpoint
    pub connection_string: Option<String>,

    #[serde(default = "default_agent_name")]
    pub agent_name: String,

    /// Defaults to the agent name
    pub agent_id: Option<String>,

    #[serde(default = "default_provider_name")]
    pub provider_name: String,

    /// Record prompts, answers and tool payloads on spans
    #[serde(default = "default_true")]
    pub enable_content: bool,
}

impl TelemetryConfig {
    /// The connection value, if present and non-blank
    pub fn connection_value(&self) -> Option<&str> {
        self.connection_string
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    pub fn agent_id(&self) -> &str {
        self.agent_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or(&self.agent_name)
    }
}

/// Exchange-rate API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeConfig {
    #[serde(default = "default_exchange_api_url")]
    pub api_url: String,

    #[serde(default = "default_exchange_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// First retry delay; doubles on each further attempt
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl Default for OpenAISettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_openai_base_url(),
            model: default_openai_model(),
        }
    }
}

impl Default for AzureOpenAISettings {
    fn default() -> Self {
        Self {
            endpoint: None,
            deployment: None,
            api_key: None,
            api_version: default_azure_api_version(),
        }
    }
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model_name: None,
            base_url: default_gemini_base_url(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            connection_string: None,
            agent_name: default_agent_name(),
            agent_id: None,
            provider_name: default_provider_name(),
            enable_content: true,
        }
    }
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            api_url: default_exchange_api_url(),
            timeout_secs: default_exchange_timeout_secs(),
            max_attempts: default_max_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

impl ModelConfig {
    /// Resolve the backend to use.
    ///
    /// With an explicit `provider` only that backend is considered. Otherwise
    /// the first backend whose credentials are complete wins, in the order
    /// Azure OpenAI, Gemini, OpenAI.
    pub fn backend(&self) -> Result<LlmBackend> {
        if let Some(name) = &self.unsupported_provider {
            return Err(Error::config_error(format!(
                "Unknown LLM provider '{}'. Expected one of: openai, azure-openai, gemini",
                name
            )));
        }
        match self.provider {
            Some(ProviderKind::OpenAI) => self.openai_backend(),
            Some(ProviderKind::AzureOpenAI) => self.azure_backend(),
            Some(ProviderKind::Gemini) => self.gemini_backend(),
            None => self
                .azure_backend()
                .or_else(|_| self.gemini_backend())
                .or_else(|_| self.openai_backend())
                .map_err(|_| {
                    Error::config_error(
                        "no LLM backend configured (set OPENAI_API_KEY, \
                         AZURE_OPENAI_ENDPOINT + AZURE_OPENAI_DEPLOYMENT + AZURE_OPENAI_API_KEY, \
                         or GOOGLE_API_KEY + GOOGLE_MODEL_NAME)",
                    )
                }),
        }
    }

    fn openai_backend(&self) -> Result<LlmBackend> {
        let api_key = require(&self.openai.api_key, "OPENAI_API_KEY")?;
        Ok(LlmBackend::OpenAI {
            api_key,
            base_url: self.openai.base_url.trim_end_matches('/').to_string(),
            model: self.openai.model.clone(),
        })
    }

    fn azure_backend(&self) -> Result<LlmBackend> {
        let endpoint = require(&self.azure_openai.endpoint, "AZURE_OPENAI_ENDPOINT")?;
        let deployment = require(&self.azure_openai.deployment, "AZURE_OPENAI_DEPLOYMENT")?;
        let api_key = require(&self.azure_openai.api_key, "AZURE_OPENAI_API_KEY")?;
        Ok(LlmBackend::AzureOpenAI {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            deployment,
            api_key,
            api_version: self.azure_openai.api_version.clone(),
        })
    }

    fn gemini_backend(&self) -> Result<LlmBackend> {
        let api_key = require(&self.gemini.api_key, "GOOGLE_API_KEY")?;
        let model = require(&self.gemini.model_name, "GOOGLE_MODEL_NAME")?;
        Ok(LlmBackend::Gemini {
            api_key,
            model,
            base_url: self.gemini.base_url.trim_end_matches('/').to_string(),
        })
    }
}

fn require(value: &Option<String>, name: &str) -> Result<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| Error::config_error(format!("{} must be set", name)))
}

impl FxConfig {
    /// Load configuration from `fxa.toml` (if found) and the process environment
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration from a specific file, then overlay the environment.
    ///
    /// An explicitly given file must exist; the implicit `fxa.toml` is optional.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => Some(p.to_path_buf()),
            None => Self::find_config_file(),
        };

        let mut config = match config_path {
            Some(path) => {
                tracing::debug!(path = %path.display(), "Loading configuration file");
                let contents = fs::read_to_string(&path).map_err(|e| {
                    Error::config_error(format!(
                        "Failed to read config file {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                Self::from_toml_str(&contents, |key| env::var(key).ok())?
            }
            None => Self::default(),
        };

        config.apply_env_with(|key| env::var(key).ok())?;
        Ok(config)
    }

    /// Parse a TOML document, resolving `${VAR}` references with `lookup`
    pub fn from_toml_str(contents: &str, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut value: toml::Value = toml::from_str(contents)
            .map_err(|e| Error::config_error(format!("Failed to parse config file: {}", e)))?;
        resolve_env_refs(&mut value, &lookup);
        value
            .try_into()
            .map_err(|e| Error::config_error(format!("Invalid configuration: {}", e)))
    }

    /// Find fxa.toml by searching current directory and parents
    fn find_config_file() -> Option<PathBuf> {
        let mut current = env::current_dir().ok()?;

        loop {
            let config_path = current.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return Some(config_path);
            }

            if !current.pop() {
                return None;
            }
        }
    }

    /// Overlay environment variables. Blank values are treated as unset.
    pub fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        // Model
        if let Some(provider) = var("FXA_LLM_PROVIDER") {
            match provider.parse() {
                Ok(kind) => {
                    self.model.provider = Some(kind);
                    self.model.unsupported_provider = None;
                }
                Err(e) => {
                    tracing::warn!(provider = %provider, error = %e, "Ignoring unknown LLM provider");
                    self.model.unsupported_provider = Some(provider.trim().to_string());
                }
            }
        }
        set_opt(&mut self.model.openai.api_key, var("OPENAI_API_KEY"));
        set(&mut self.model.openai.base_url, var("OPENAI_BASE_URL"));
        set(&mut self.model.openai.model, var("OPENAI_MODEL"));
        set_opt(&mut self.model.azure_openai.endpoint, var("AZURE_OPENAI_ENDPOINT"));
        set_opt(&mut self.model.azure_openai.deployment, var("AZURE_OPENAI_DEPLOYMENT"));
        set_opt(&mut self.model.azure_openai.api_key, var("AZURE_OPENAI_API_KEY"));
        set(&mut self.model.azure_openai.api_version, var("AZURE_OPENAI_API_VERSION"));
        set_opt(&mut self.model.gemini.api_key, var("GOOGLE_API_KEY"));
        set_opt(&mut self.model.gemini.model_name, var("GOOGLE_MODEL_NAME"));
        set_opt(&mut self.model.agent_id, var("AZURE_AI_AGENT_ID"));
        if let Some(temperature) = var("FXA_LLM_TEMPERATURE") {
            self.model.temperature = Some(parse_number(&temperature, "FXA_LLM_TEMPERATURE")?);
        }

        // Telemetry
        set_opt(
            &mut self.telemetry.connection_string,
            var("APPLICATION_INSIGHTS_CONNECTION_STRING")
                .or_else(|| var("OTEL_EXPORTER_OTLP_ENDPOINT")),
        );
        set(&mut self.telemetry.agent_name, var("APPLICATION_INSIGHTS_AGENT_NAME"));
        set_opt(&mut self.telemetry.agent_id, var("APPLICATION_INSIGHTS_AGENT_ID"));
        set(
            &mut self.telemetry.provider_name,
            var("APPLICATION_INSIGHTS_PROVIDER_NAME"),
        );
        if let Some(flag) = var("APPLICATION_INSIGHTS_ENABLE_CONTENT") {
            self.telemetry.enable_content = parse_bool(&flag);
        }
        // A hosted agent id stands in when no telemetry id is given
        let telemetry_id_unset = self
            .telemetry
            .agent_id
            .as_deref()
            .is_none_or(|id| id.trim().is_empty());
        if telemetry_id_unset {
            if let Some(hosted) = self.model.agent_id.as_deref().map(str::trim).filter(|id| !id.is_empty()) {
                self.telemetry.agent_id = Some(hosted.to_string());
            }
        }

        // Exchange API
        set(&mut self.exchange.api_url, var("FXA_EXCHANGE_API_URL"));
        if let Some(secs) = var("FXA_EXCHANGE_TIMEOUT_SECS") {
            self.exchange.timeout_secs = parse_number(&secs, "FXA_EXCHANGE_TIMEOUT_SECS")?;
        }

        // Server
        set(
            &mut self.server.host,
            var("BIND_HOST").or_else(|| var("HOST")),
        );
        if let Some(port) = var("PORT") {
            self.server.port = parse_number(&port, "PORT")?;
        }
        if let Some(secs) = var("FXA_REQUEST_TIMEOUT_SECS") {
            self.server.request_timeout_secs = parse_number(&secs, "FXA_REQUEST_TIMEOUT_SECS")?;
        }

        Ok(())
    }

    /// Create test-friendly defaults (no credentials, telemetry disabled)
    pub fn test_defaults() -> Self {
        let mut config = Self::default();
        config.exchange.retry_backoff_ms = 0;
        config
    }
}

fn set(target: &mut String, value: Option<String>) {
    if let Some(value) = value {
        *target = value;
    }
}

fn set_opt(target: &mut Option<String>, value: Option<String>) {
    if value.is_some() {
        *target = value;
    }
}

fn parse_number<T: FromStr>(value: &str, name: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::config_error(format!("{} has an invalid value: '{}'", name, value)))
}

/// `1`, `true`, `yes` and `on` (any case) are true; everything else is false
pub fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Resolve `${VAR_NAME}` string values in place. Unknown variables become empty.
fn resolve_env_refs(value: &mut toml::Value, lookup: &impl Fn(&str) -> Option<String>) {
    match value {
        toml::Value::String(s) => {
            if let Some(var_name) = s.strip_prefix("${").and_then(|rest| rest.strip_suffix('}')) {
                *s = lookup(var_name).unwrap_or_default();
            }
        }
        toml::Value::Array(items) => {
            for item in items {
                resolve_env_refs(item, lookup);
            }
        }
        toml::Value::Table(table) => {
            for (_, item) in table.iter_mut() {
                resolve_env_refs(item, lookup);
            }
        }
        _ => {}
    }
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_azure_api_version() -> String {
    "2024-06-01".to_string()
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta/models".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_agent_name() -> String {
    "fxa-currency-exchange-agent".to_string()
}

fn default_provider_name() -> String {
    "fxa".to_string()
}

fn default_true() -> bool {
    true
}

fn default_exchange_api_url() -> String {
    "https://api.frankfurter.app".to_string()
}

fn default_exchange_timeout_secs() -> u64 {
    5
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    250
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = FxConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.exchange.api_url, "https://api.frankfurter.app");
        assert!(config.telemetry.enable_content);
        assert!(config.telemetry.connection_value().is_none());
        assert_eq!(config.telemetry.agent_id(), "fxa-currency-exchange-agent");
    }

    #[test]
    fn test_no_credentials_means_no_backend() {
        let config = FxConfig::default();
        let err = config.model.backend().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_env_selects_openai() {
        let mut config = FxConfig::default();
        config
            .apply_env_with(lookup(&[("OPENAI_API_KEY", "sk-test"), ("OPENAI_MODEL", "gpt-4o")]))
            .unwrap();

        let backend = config.model.backend().unwrap();
        assert_eq!(backend.kind(), ProviderKind::OpenAI);
        assert_eq!(backend.model(), "gpt-4o");
    }

    #[test]
    fn test_auto_detect_prefers_complete_azure() {
        let mut config = FxConfig::default();
        config
            .apply_env_with(lookup(&[
                ("OPENAI_API_KEY", "sk-test"),
                ("AZURE_OPENAI_ENDPOINT", "https://example.openai.azure.com/"),
                ("AZURE_OPENAI_DEPLOYMENT", "gpt-4o"),
                ("AZURE_OPENAI_API_KEY", "azure-key"),
            ]))
            .unwrap();

        match config.model.backend().unwrap() {
            LlmBackend::AzureOpenAI { endpoint, deployment, .. } => {
                assert_eq!(endpoint, "https://example.openai.azure.com");
                assert_eq!(deployment, "gpt-4o");
            }
            other => panic!("unexpected backend: {:?}", other),
        }
    }

    #[test]
    fn test_incomplete_azure_falls_through_to_openai() {
        let mut config = FxConfig::default();
        config
            .apply_env_with(lookup(&[
                ("OPENAI_API_KEY", "sk-test"),
                ("AZURE_OPENAI_ENDPOINT", "https://example.openai.azure.com"),
            ]))
            .unwrap();

        assert_eq!(config.model.backend().unwrap().kind(), ProviderKind::OpenAI);
    }

    #[test]
    fn test_explicit_provider_without_credentials_is_error() {
        let mut config = FxConfig::default();
        config
            .apply_env_with(lookup(&[("FXA_LLM_PROVIDER", "gemini"), ("OPENAI_API_KEY", "sk")]))
            .unwrap();

        let err = config.model.backend().unwrap_err();
        assert!(err.to_string().contains("GOOGLE_API_KEY"));
    }

    #[test]
    fn test_unknown_provider_leaves_no_backend() {
        let mut config = FxConfig::default();
        config
            .apply_env_with(lookup(&[("FXA_LLM_PROVIDER", "bedrock"), ("OPENAI_API_KEY", "sk")]))
            .unwrap();

        // Loading succeeds; the backend lookup fails so the runtime degrades
        let err = config.model.backend().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("bedrock"));
    }

    #[test]
    fn test_hosted_agent_id_is_telemetry_identity() {
        let mut config = FxConfig::default();
        config
            .apply_env_with(lookup(&[("AZURE_AI_AGENT_ID", "asst_prebuilt123")]))
            .unwrap();
        assert_eq!(config.model.agent_id.as_deref(), Some("asst_prebuilt123"));
        assert_eq!(config.telemetry.agent_id(), "asst_prebuilt123");

        // An explicit telemetry id still wins
        let mut config = FxConfig::default();
        config
            .apply_env_with(lookup(&[
                ("AZURE_AI_AGENT_ID", "asst_prebuilt123"),
                ("APPLICATION_INSIGHTS_AGENT_ID", "fxa-aca"),
            ]))
            .unwrap();
        assert_eq!(config.telemetry.agent_id(), "fxa-aca");
    }

    #[test]
    fn test_telemetry_env() {
        let mut config = FxConfig::default();
        config
            .apply_env_with(lookup(&[
                ("APPLICATION_INSIGHTS_CONNECTION_STRING", "InstrumentationKey=abc"),
                ("APPLICATION_INSIGHTS_AGENT_NAME", "gcp-cloud-run-exchange-agent"),
                ("APPLICATION_INSIGHTS_PROVIDER_NAME", "gcp.cloud_run"),
                ("APPLICATION_INSIGHTS_ENABLE_CONTENT", "off"),
            ]))
            .unwrap();

        assert_eq!(config.telemetry.connection_value(), Some("InstrumentationKey=abc"));
        assert_eq!(config.telemetry.agent_id(), "gcp-cloud-run-exchange-agent");
        assert_eq!(config.telemetry.provider_name, "gcp.cloud_run");
        assert!(!config.telemetry.enable_content);
    }

    #[test]
    fn test_blank_connection_string_is_unset() {
        let config = FxConfig {
            telemetry: TelemetryConfig {
                connection_string: Some("   ".to_string()),
                ..TelemetryConfig::default()
            },
            ..FxConfig::default()
        };
        assert!(config.telemetry.connection_value().is_none());
    }

    #[test]
    fn test_invalid_port() {
        let mut config = FxConfig::default();
        let err = config.apply_env_with(lookup(&[("PORT", "eighty")])).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_parse_bool() {
        for truthy in ["1", "true", "YES", " on "] {
            assert!(parse_bool(truthy), "{truthy}");
        }
        for falsy in ["0", "false", "no", "off", "maybe"] {
            assert!(!parse_bool(falsy), "{falsy}");
        }
    }

    #[test]
    fn test_toml_with_env_references() {
        let contents = r#"
            [model]
            provider = "openai"

            [model.openai]
            api_key = "${FXA_TEST_OPENAI_KEY}"
            model = "gpt-4o"

            [server]
            port = 9090

            [telemetry]
            connection_string = "${MISSING_VAR}"
            agent_name = "aca-currency-exchange-agent"
        "#;

        let config =
            FxConfig::from_toml_str(contents, lookup(&[("FXA_TEST_OPENAI_KEY", "sk-file")]))
                .unwrap();

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.model.provider, Some(ProviderKind::OpenAI));
        assert!(config.telemetry.connection_value().is_none());
        match config.model.backend().unwrap() {
            LlmBackend::OpenAI { api_key, model, .. } => {
                assert_eq!(api_key, "sk-file");
                assert_eq!(model, "gpt-4o");
            }
            other => panic!("unexpected backend: {:?}", other),
        }
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let result = FxConfig::load_from(Some(Path::new("/nonexistent/fxa.toml")));
        assert!(result.is_err());
    }
}
