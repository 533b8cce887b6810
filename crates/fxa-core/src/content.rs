use serde::{Deserialize, Serialize};

pub const ROLE_USER: &str = "user";
pub const ROLE_MODEL: &str = "model";
pub const ROLE_FUNCTION: &str = "function";

/// Content represents a message with multiple parts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    pub fn new_user_text(text: impl Into<String>) -> Self {
        Self {
            role: ROLE_USER.to_string(),
            parts: vec![Part::Text { text: text.into() }],
        }
    }

    pub fn new_model_text(text: impl Into<String>) -> Self {
        Self {
            role: ROLE_MODEL.to_string(),
            parts: vec![Part::Text { text: text.into() }],
        }
    }

    /// Wrap tool results so they can be sent back to the model.
    pub fn function_responses(responses: Vec<FunctionResponse>) -> Self {
        Self {
            role: ROLE_FUNCTION.to_string(),
            parts: responses
                .into_iter()
                .map(|function_response| Part::FunctionResponse { function_response })
                .collect(),
        }
    }

    /// Concatenated text of all text parts.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| match part {
                Part::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }

    /// Function calls requested by the model in this message.
    pub fn function_calls(&self) -> Vec<FunctionCall> {
        self.parts
            .iter()
            .filter_map(|part| match part {
                Part::FunctionCall { function_call } => Some(function_call.clone()),
                _ => None,
            })
            .collect()
    }
}

fn default_role() -> String {
    ROLE_MODEL.to_string()
}

/// Part represents a single part of content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    FunctionCall {
        #[serde(rename = "functionCall")]
        function_call: FunctionCall,
    },
    FunctionResponse {
        #[serde(rename = "functionResponse")]
        function_response: FunctionResponse,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub args: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionResponse {
    pub name: String,
    pub response: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_joins_text_parts_only() {
        let content = Content {
            role: ROLE_MODEL.to_string(),
            parts: vec![
                Part::Text { text: "1 USD".to_string() },
                Part::FunctionCall {
                    function_call: FunctionCall {
                        name: "get_exchange_rate".to_string(),
                        args: json!({}),
                        id: None,
                    },
                },
                Part::Text { text: " = 0.92 EUR".to_string() },
            ],
        };

        assert_eq!(content.text(), "1 USD = 0.92 EUR");
        assert_eq!(content.function_calls().len(), 1);
    }

    #[test]
    fn test_deserialize_gemini_parts() {
        let raw = json!({
            "role": "model",
            "parts": [
                {"functionCall": {"name": "get_exchange_rate", "args": {"currency_from": "USD"}}},
                {"text": "done", "thoughtSignature": "abc"}
            ]
        });

        let content: Content = serde_json::from_value(raw).unwrap();
        let calls = content.function_calls();
        assert_eq!(calls[0].name, "get_exchange_rate");
        assert_eq!(calls[0].args["currency_from"], "USD");
        assert_eq!(content.text(), "done");
    }

    #[test]
    fn test_missing_parts_defaults_to_empty() {
        let content: Content = serde_json::from_value(json!({"role": "model"})).unwrap();
        assert!(content.parts.is_empty());
        assert_eq!(content.text(), "");
    }
}
