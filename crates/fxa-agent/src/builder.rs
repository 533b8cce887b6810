use crate::llm_agent::{DEFAULT_MAX_TURNS, LLMAgent, SYSTEM_INSTRUCTION};
use fxa_core::{Error, GenerateConfig, LLM, Result, Tool};
use fxa_telemetry::{AgentTracer, NoOpTracer};
use std::collections::BTreeMap;
use std::sync::Arc;

pub struct LLMAgentBuilder {
    name: Option<String>,
    model: Option<Arc<dyn LLM>>,
    tools: BTreeMap<String, Arc<dyn Tool>>,
    tracer: Option<Arc<dyn AgentTracer>>,
    generate_config: Option<GenerateConfig>,
}

impl LLMAgentBuilder {
    pub fn new() -> Self {
        Self {
            name: None,
            model: None,
            tools: BTreeMap::new(),
            tracer: None,
            generate_config: None,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn model(mut self, model: Arc<dyn LLM>) -> Self {
        self.model = Some(model);
        self
    }

    pub fn tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.insert(tool.name().to_string(), tool);
        self
    }

    pub fn tracer(mut self, tracer: Arc<dyn AgentTracer>) -> Self {
        self.tracer = Some(tracer);
        self
    }

    pub fn generate_config(mut self, config: GenerateConfig) -> Self {
        self.generate_config = Some(config);
        self
    }

    pub fn build(self) -> Result<LLMAgent> {
        let name = self
            .name
            .ok_or_else(|| Error::config_error("Agent name is required"))?;
        let model = self
            .model
            .ok_or_else(|| Error::config_error("Model is required"))?;
        Ok(LLMAgent {
            name,
            model,
            system_instruction: SYSTEM_INSTRUCTION.to_string(),
            tools: self.tools,
            tracer: self.tracer.unwrap_or_else(|| Arc::new(NoOpTracer)),
            generate_config: self.generate_config,
            max_turns: DEFAULT_MAX_TURNS,
        })
    }
}

impl Default for LLMAgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_and_model_are_required() {
        let missing_name = LLMAgentBuilder::new().build().err().unwrap();
        assert!(matches!(missing_name, Error::Config(_)));
        assert!(missing_name.to_string().contains("name"));

        let missing_model = LLMAgentBuilder::new().name("fxa").build().err().unwrap();
        assert!(missing_model.to_string().contains("Model"));
    }
}
