use async_trait::async_trait;
use fxa_core::Result;
use fxa_telemetry::SpanHandle;

/// One `/invoke` request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// UUID v4 correlation id
    pub id: String,
    pub prompt: String,
}

impl Invocation {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self::with_id(uuid::Uuid::new_v4().to_string(), prompt)
    }

    pub fn with_id(id: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            prompt: prompt.into(),
        }
    }
}

/// Agent trait - turns a prompt into a text answer
#[async_trait]
pub trait Agent: Send + Sync {
    fn name(&self) -> &str;

    /// Answer one invocation. `span` is the invocation's `agent.run` span;
    /// nested spans hang off it.
    async fn run(&self, invocation: &Invocation, span: &SpanHandle) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invocation_ids_are_unique_uuids() {
        let a = Invocation::new("hi");
        let b = Invocation::new("hi");
        assert_ne!(a.id, b.id);
        assert!(uuid::Uuid::parse_str(&a.id).is_ok());
    }
}
