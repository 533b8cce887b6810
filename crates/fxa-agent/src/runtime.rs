use crate::agent::{Agent, Invocation};
use crate::fallback::FallbackAgent;
use crate::llm_agent::LLMAgent;
use fxa_core::{Error, FxConfig, GenerateConfig, Result, providers::create_model};
use fxa_telemetry::{
    AgentTracer,
    spans::{self, AgentRunAttributes},
};
use fxa_tool::ExchangeRateTool;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// The agent chosen at startup, shared by all requests
#[derive(Clone)]
pub struct AgentRuntime {
    agent: Arc<dyn Agent>,
    tracer: Arc<dyn AgentTracer>,
    degraded: bool,
    request_timeout: Duration,
}

impl AgentRuntime {
    pub fn new(agent: Arc<dyn Agent>, tracer: Arc<dyn AgentTracer>, degraded: bool) -> Self {
        Self {
            agent,
            tracer,
            degraded,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Build the runtime from configuration.
    ///
    /// Missing model credentials are not fatal: the runtime starts in degraded
    /// mode and answers with the configuration notice.
    pub fn from_config(config: &FxConfig, tracer: Arc<dyn AgentTracer>) -> Result<Self> {
        let agent_name = config.telemetry.agent_name.clone();
        let timeout = Duration::from_secs(config.server.request_timeout_secs);

        let runtime = match config.model.backend() {
            Ok(backend) => {
                let tool = ExchangeRateTool::from_config(&config.exchange)?;
                let model = create_model(&backend);
                tracing::info!(
                    provider = %backend.kind(),
                    model = %backend.model(),
                    "LLM backend configured"
                );

                let mut builder = LLMAgent::builder()
                    .name(agent_name)
                    .model(model)
                    .tool(Arc::new(tool))
                    .tracer(tracer.clone());
                if let Some(temperature) = config.model.temperature {
                    builder = builder.generate_config(GenerateConfig {
                        temperature: Some(temperature),
                        ..GenerateConfig::default()
                    });
                }

                Self::new(Arc::new(builder.build()?), tracer, false)
            }
            Err(e) => {
                tracing::warn!(error = %e, "No LLM backend configured, serving fallback answers");
                Self::new(Arc::new(FallbackAgent::new(agent_name)), tracer, true)
            }
        };

        Ok(runtime.with_request_timeout(timeout))
    }

    /// Whether the fallback agent is serving requests
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    pub fn agent_name(&self) -> &str {
        self.agent.name()
    }

    pub fn tracer(&self) -> &Arc<dyn AgentTracer> {
        &self.tracer
    }

    /// Run one invocation inside an `agent.run` span, bounded by the request timeout
    pub async fn invoke(&self, invocation: &Invocation) -> Result<String> {
        let span = spans::start_agent_run(
            self.tracer.as_ref(),
            AgentRunAttributes {
                invocation_id: &invocation.id,
                prompt: &invocation.prompt,
            },
        );

        let result = match tokio::time::timeout(
            self.request_timeout,
            self.agent.run(invocation, &span),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout(self.request_timeout)),
        };

        match &result {
            Ok(answer) => spans::record_agent_result(self.tracer.as_ref(), &span, answer),
            Err(e) => {
                span.record_error(e.to_string());
                tracing::error!(invocation_id = %invocation.id, error = %e, "Invocation failed");
            }
        }
        span.end();

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use fxa_core::ProviderKind;
    use fxa_telemetry::{
        ActiveTracer, AgentIdentity, NoOpTracer, SpanHandle, SpanKind,
        attributes::{FXA_INVOCATION_ID, FXA_RESPONSE_LENGTH},
        testing::{RecordingExporter, attribute},
    };
    use opentelemetry::trace::{Status, TracerProvider as _};
    use opentelemetry_sdk::trace::TracerProvider;

    struct SlowAgent;

    #[async_trait]
    impl Agent for SlowAgent {
        fn name(&self) -> &str {
            "slow"
        }

        async fn run(&self, _invocation: &Invocation, _span: &SpanHandle) -> Result<String> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok("too late".to_string())
        }
    }

    fn recording() -> (Arc<dyn AgentTracer>, RecordingExporter, TracerProvider) {
        let recorder = RecordingExporter::new();
        let provider = TracerProvider::builder()
            .with_simple_exporter(recorder.clone())
            .build();
        let tracer = ActiveTracer::new(
            provider.tracer("fxa"),
            AgentIdentity {
                agent_name: "fxa-test".to_string(),
                agent_id: "fxa-test".to_string(),
                provider_name: "fxa".to_string(),
            },
            true,
        );
        (Arc::new(tracer), recorder, provider)
    }

    #[tokio::test]
    async fn test_missing_backend_is_degraded() {
        let config = FxConfig::test_defaults();
        let runtime = AgentRuntime::from_config(&config, Arc::new(NoOpTracer)).unwrap();

        assert!(runtime.is_degraded());
        let answer = runtime.invoke(&Invocation::new("hello")).await.unwrap();
        assert!(answer.ends_with("You asked: hello"));
    }

    #[tokio::test]
    async fn test_configured_backend_uses_llm_agent() {
        let mut config = FxConfig::test_defaults();
        config.model.provider = Some(ProviderKind::OpenAI);
        config.model.openai.api_key = Some("sk-test".to_string());

        let runtime = AgentRuntime::from_config(&config, Arc::new(NoOpTracer)).unwrap();
        assert!(!runtime.is_degraded());
        assert_eq!(runtime.agent_name(), config.telemetry.agent_name);
    }

    #[tokio::test]
    async fn test_unknown_provider_is_degraded() {
        let mut config = FxConfig::test_defaults();
        config
            .apply_env_with(|key| match key {
                "FXA_LLM_PROVIDER" => Some("bedrock".to_string()),
                "OPENAI_API_KEY" => Some("sk-test".to_string()),
                _ => None,
            })
            .unwrap();

        let runtime = AgentRuntime::from_config(&config, Arc::new(NoOpTracer)).unwrap();
        assert!(runtime.is_degraded());
    }

    #[tokio::test]
    async fn test_agent_run_span_wraps_invocation() {
        let (tracer, recorder, _provider) = recording();
        let runtime = AgentRuntime::new(Arc::new(FallbackAgent::new("fxa-test")), tracer, true);

        let invocation = Invocation::with_id("inv-42", "hi");
        let answer = runtime.invoke(&invocation).await.unwrap();

        let spans = recorder.spans_named("agent.run");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].span_kind, SpanKind::Server);
        assert_eq!(attribute(&spans[0], FXA_INVOCATION_ID).as_deref(), Some("inv-42"));
        assert_eq!(
            attribute(&spans[0], FXA_RESPONSE_LENGTH),
            Some(answer.chars().count().to_string())
        );
    }

    #[tokio::test]
    async fn test_request_timeout() {
        let (tracer, recorder, _provider) = recording();
        let runtime = AgentRuntime::new(Arc::new(SlowAgent), tracer, false)
            .with_request_timeout(Duration::from_millis(50));

        let err = runtime.invoke(&Invocation::new("hi")).await.unwrap_err();
        assert!(matches!(err, Error::Timeout(d) if d == Duration::from_millis(50)));

        let spans = recorder.spans_named("agent.run");
        assert!(matches!(spans[0].status, Status::Error { .. }));
    }
}
