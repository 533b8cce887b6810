//! OpenAI provider implementation

use super::{OpenAIConfig, types::*};
use crate::{
    Content, Error, FunctionCall, LLMRequest, LLMResponse, Part, Result, Usage,
    content::{ROLE_FUNCTION, ROLE_MODEL, ROLE_USER},
    providers::error_excerpt,
};
use async_trait::async_trait;
use reqwest::Client;

/// OpenAI chat completions provider
pub struct OpenAIProvider {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider
    pub fn new(config: OpenAIConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    /// Create a provider sharing an existing HTTP client
    pub fn with_client(client: Client, config: OpenAIConfig) -> Self {
        Self { client, config }
    }

    /// Convert the conversation to OpenAI messages
    fn convert_contents_to_messages(
        system_instruction: Option<String>,
        contents: Vec<Content>,
    ) -> Vec<OpenAIMessage> {
        let mut messages = Vec::with_capacity(contents.len() + 1);

        if let Some(system) = system_instruction {
            messages.push(OpenAIMessage {
                role: "system".to_string(),
                content: Some(system),
                ..Default::default()
            });
        }

        for content in contents {
            match content.role.as_str() {
                ROLE_FUNCTION => {
                    // One `tool` message per function response
                    for part in content.parts {
                        if let Part::FunctionResponse { function_response } = part {
                            messages.push(OpenAIMessage {
                                role: "tool".to_string(),
                                content: Some(function_response.response.to_string()),
                                tool_call_id: Some(
                                    function_response.id.unwrap_or(function_response.name),
                                ),
                                ..Default::default()
                            });
                        }
                    }
                }
                ROLE_MODEL => {
                    let text = content.text();
                    let tool_calls = content
                        .function_calls()
                        .into_iter()
                        .map(|call| OpenAIToolCall {
                            id: call.id.unwrap_or_else(|| call.name.clone()),
                            kind: "function".to_string(),
                            function: OpenAIFunctionCall {
                                name: call.name,
                                arguments: call.args.to_string(),
                            },
                        })
                        .collect();
                    messages.push(OpenAIMessage {
                        role: "assistant".to_string(),
                        content: (!text.is_empty()).then_some(text),
                        tool_calls,
                        ..Default::default()
                    });
                }
                _ => messages.push(OpenAIMessage {
                    role: ROLE_USER.to_string(),
                    content: Some(content.text()),
                    ..Default::default()
                }),
            }
        }

        messages
    }

    /// Convert an OpenAI assistant message to the content model
    fn convert_message_to_content(message: OpenAIMessage) -> Content {
        let mut parts = Vec::new();

        if let Some(text) = message.content.filter(|t| !t.is_empty()) {
            parts.push(Part::Text { text });
        }

        for call in message.tool_calls {
            // Keep unparseable arguments verbatim so the tool can report them
            let args = serde_json::from_str(&call.function.arguments)
                .unwrap_or(serde_json::Value::String(call.function.arguments));
            parts.push(Part::FunctionCall {
                function_call: FunctionCall {
                    name: call.function.name,
                    args,
                    id: Some(call.id),
                },
            });
        }

        Content {
            role: ROLE_MODEL.to_string(),
            parts,
        }
    }
}

#[async_trait]
impl crate::LLM for OpenAIProvider {
    fn name(&self) -> &str {
        &self.config.model
    }

    fn system(&self) -> &str {
        self.config.system
    }

    async fn generate_content(&self, request: LLMRequest) -> Result<LLMResponse> {
        let tools = request
            .tools
            .into_iter()
            .map(|decl| OpenAITool {
                kind: "function",
                function: OpenAIFunctionDef {
                    name: decl.name,
                    description: decl.description,
                    parameters: decl.parameters,
                },
            })
            .collect();

        let openai_req = OpenAIRequest {
            model: self.config.model.clone(),
            messages: Self::convert_contents_to_messages(
                request.system_instruction,
                request.contents,
            ),
            tools,
            temperature: request.config.as_ref().and_then(|c| c.temperature),
            max_tokens: request.config.as_ref().and_then(|c| c.max_tokens),
            top_p: request.config.as_ref().and_then(|c| c.top_p),
        };

        let response = self
            .config
            .auth
            .apply(self.client.post(&self.config.url))
            .json(&openai_req)
            .send()
            .await
            .map_err(|e| Error::llm_error(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(Error::llm_error(format!(
                "OpenAI API error {}: {}",
                status,
                error_excerpt(&error_text)
            )));
        }

        let openai_resp: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| Error::llm_error(format!("Failed to parse response: {}", e)))?;

        let choice = openai_resp
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::llm_error("OpenAI response contained no choices"))?;

        Ok(LLMResponse {
            content: Self::convert_message_to_content(choice.message),
            finish_reason: choice.finish_reason,
            usage: openai_resp.usage.map(|u| Usage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FunctionResponse, LLM, ToolDeclaration};
    use mockito::Matcher;
    use serde_json::json;

    fn request() -> LLMRequest {
        LLMRequest {
            model: "gpt-4o-mini".to_string(),
            system_instruction: Some("You convert currencies.".to_string()),
            contents: vec![Content::new_user_text("Convert 100 USD to EUR")],
            tools: vec![ToolDeclaration {
                name: "get_exchange_rate".to_string(),
                description: "Get the exchange rate".to_string(),
                parameters: json!({"type": "object"}),
            }],
            config: None,
        }
    }

    #[test]
    fn test_tool_round_trip_messages() {
        let contents = vec![
            Content::new_user_text("hi"),
            Content {
                role: ROLE_MODEL.to_string(),
                parts: vec![Part::FunctionCall {
                    function_call: FunctionCall {
                        name: "get_exchange_rate".to_string(),
                        args: json!({"currency_from": "USD"}),
                        id: Some("call_1".to_string()),
                    },
                }],
            },
            Content::function_responses(vec![FunctionResponse {
                name: "get_exchange_rate".to_string(),
                response: json!({"rate": 0.92}),
                id: Some("call_1".to_string()),
            }]),
        ];

        let messages = OpenAIProvider::convert_contents_to_messages(None, contents);
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].role, "assistant");
        assert!(messages[1].content.is_none());
        assert_eq!(messages[1].tool_calls[0].id, "call_1");
        assert_eq!(messages[2].role, "tool");
        assert_eq!(messages[2].tool_call_id.as_deref(), Some("call_1"));
    }

    #[tokio::test]
    async fn test_generate_content_parses_tool_calls() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_body(Matcher::AllOf(vec![
                Matcher::PartialJson(json!({"model": "gpt-4o-mini"})),
                Matcher::Regex(r#""name":"get_exchange_rate""#.to_string()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "choices": [{
                        "message": {
                            "role": "assistant",
                            "content": null,
                            "tool_calls": [{
                                "id": "call_abc",
                                "type": "function",
                                "function": {
                                    "name": "get_exchange_rate",
                                    "arguments": "{\"currency_from\":\"USD\",\"currency_to\":\"EUR\"}"
                                }
                            }]
                        },
                        "finish_reason": "tool_calls"
                    }],
                    "usage": {"prompt_tokens": 42, "completion_tokens": 7}
                })
                .to_string(),
            )
            .create_async()
            .await;

        let provider = OpenAIProvider::new(OpenAIConfig::openai(
            "sk-test".into(),
            "gpt-4o-mini".into(),
            server.url(),
        ));
        let response = provider.generate_content(request()).await.unwrap();

        mock.assert_async().await;
        let calls = response.content.function_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].id.as_deref(), Some("call_abc"));
        assert_eq!(calls[0].args["currency_to"], "EUR");
        assert_eq!(response.usage.map(|u| u.input_tokens), Some(42));
    }

    #[tokio::test]
    async fn test_azure_uses_api_key_header() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/openai/deployments/gpt-4o/chat/completions")
            .match_query(Matcher::UrlEncoded("api-version".into(), "2024-06-01".into()))
            .match_header("api-key", "azure-key")
            .with_status(200)
            .with_body(
                json!({
                    "choices": [{
                        "message": {"role": "assistant", "content": "100 USD is 92 EUR."},
                        "finish_reason": "stop"
                    }]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let provider = OpenAIProvider::new(OpenAIConfig::azure(
            server.url(),
            "gpt-4o".into(),
            "azure-key".into(),
            "2024-06-01".into(),
        ));
        let response = provider.generate_content(request()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(response.content.text(), "100 USD is 92 EUR.");
    }

    #[tokio::test]
    async fn test_non_success_status_is_llm_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(429)
            .with_body("rate limited")
            .create_async()
            .await;

        let provider = OpenAIProvider::new(OpenAIConfig::openai(
            "sk-test".into(),
            "gpt-4o-mini".into(),
            server.url(),
        ));
        let err = provider.generate_content(request()).await.unwrap_err();

        assert!(matches!(err, Error::LLMError(_)));
        assert!(err.to_string().contains("429"));
    }
}
