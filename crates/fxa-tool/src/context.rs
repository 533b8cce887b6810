use fxa_core::ToolContext;

/// Default implementation of ToolContext
#[derive(Debug, Clone)]
pub struct DefaultToolContext {
    function_call_id: String,
    invocation_id: String,
}

impl DefaultToolContext {
    pub fn new(function_call_id: impl Into<String>, invocation_id: impl Into<String>) -> Self {
        Self {
            function_call_id: function_call_id.into(),
            invocation_id: invocation_id.into(),
        }
    }
}

impl ToolContext for DefaultToolContext {
    fn function_call_id(&self) -> &str {
        &self.function_call_id
    }

    fn invocation_id(&self) -> &str {
        &self.invocation_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_context_creation() {
        let ctx = DefaultToolContext::new("call-123", "inv-456");

        assert_eq!(ctx.function_call_id(), "call-123");
        assert_eq!(ctx.invocation_id(), "inv-456");
    }
}
