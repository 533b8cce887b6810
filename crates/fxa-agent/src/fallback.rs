use crate::agent::{Agent, Invocation};
use async_trait::async_trait;
use fxa_core::Result;
use fxa_telemetry::SpanHandle;

const FALLBACK_NOTICE: &str = "LLM backend configuration is not set for this deployment.\n\
Set FXA_LLM_PROVIDER and the matching credentials (for example OPENAI_API_KEY,\n\
AZURE_OPENAI_ENDPOINT + AZURE_OPENAI_DEPLOYMENT, or GOOGLE_API_KEY +\n\
GOOGLE_MODEL_NAME) to enable model responses.";

/// Answers every prompt with a configuration notice
#[derive(Debug, Clone)]
pub struct FallbackAgent {
    name: String,
}

impl FallbackAgent {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn answer(prompt: &str) -> String {
        format!("{}\nYou asked: {}", FALLBACK_NOTICE, prompt)
    }
}

#[async_trait]
impl Agent for FallbackAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, invocation: &Invocation, _span: &SpanHandle) -> Result<String> {
        tracing::debug!(invocation_id = %invocation.id, "Serving fallback answer");
        Ok(Self::answer(&invocation.prompt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fallback_echoes_prompt() {
        let agent = FallbackAgent::new("fallback");
        let answer = agent
            .run(&Invocation::new("Convert 100 USD to EUR"), &SpanHandle::disabled())
            .await
            .unwrap();

        assert!(answer.starts_with("LLM backend configuration is not set for this deployment."));
        assert!(answer.ends_with("You asked: Convert 100 USD to EUR"));
    }
}
