use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("LLM request failed: {0}")]
    LLMError(String),

    #[error("Tool '{tool}' execution failed: {source}")]
    ToolFailed {
        tool: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Telemetry error: {0}")]
    Telemetry(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Helper for creating configuration errors
    ///
    /// # Example
    /// ```
    /// use fxa_core::Error;
    /// let err = Error::config_error("Missing deployment name");
    /// ```
    pub fn config_error(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Helper for creating LLM backend errors
    pub fn llm_error(msg: impl Into<String>) -> Self {
        Error::LLMError(msg.into())
    }

    /// Helper for creating client-side validation errors
    ///
    /// # Example
    /// ```
    /// use fxa_core::Error;
    /// let err = Error::invalid_request("prompt must not be empty");
    /// assert!(err.is_client_error());
    /// ```
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Error::InvalidRequest(msg.into())
    }

    /// Helper for creating general errors with a message
    pub fn message(msg: impl Into<String>) -> Self {
        Error::Other(anyhow::anyhow!("{}", msg.into()))
    }

    /// Whether the error was caused by the caller rather than by this service
    /// or one of its backends.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::InvalidRequest(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_classification() {
        assert!(Error::invalid_request("empty").is_client_error());
        assert!(!Error::llm_error("boom").is_client_error());
        assert!(!Error::config_error("missing").is_client_error());
    }

    #[test]
    fn test_tool_failed_display() {
        let err = Error::ToolFailed {
            tool: "get_exchange_rate".to_string(),
            source: anyhow::anyhow!("timed out"),
        };
        assert_eq!(
            err.to_string(),
            "Tool 'get_exchange_rate' execution failed: timed out"
        );
    }
}
