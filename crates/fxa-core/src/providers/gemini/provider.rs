//! Gemini provider implementation

use super::{GeminiConfig, auth::GeminiAuth, types::*};
use crate::{
    Content, Error, LLMRequest, LLMResponse, Result, Usage,
    content::{ROLE_FUNCTION, ROLE_USER},
    providers::error_excerpt,
};
use async_trait::async_trait;
use reqwest::Client;

/// Gemini `generateContent` provider
pub struct GeminiProvider {
    client: Client,
    auth: GeminiAuth,
    config: GeminiConfig,
}

impl GeminiProvider {
    /// Create a new Gemini provider
    pub fn new(auth: GeminiAuth, config: GeminiConfig) -> Self {
        Self::with_client(Client::new(), auth, config)
    }

    /// Create a provider sharing an existing HTTP client
    pub fn with_client(client: Client, auth: GeminiAuth, config: GeminiConfig) -> Self {
        Self {
            client,
            auth,
            config,
        }
    }

    fn build_url(&self) -> String {
        format!("{}/{}:generateContent", self.config.base_url, self.config.model)
    }

    /// Gemini only knows `user` and `model`; tool results travel as user turns
    fn normalize_roles(contents: Vec<Content>) -> Vec<Content> {
        contents
            .into_iter()
            .map(|mut content| {
                if content.role == ROLE_FUNCTION {
                    content.role = ROLE_USER.to_string();
                }
                content
            })
            .collect()
    }
}

#[async_trait]
impl crate::LLM for GeminiProvider {
    fn name(&self) -> &str {
        &self.config.model
    }

    fn system(&self) -> &str {
        "gcp.gemini"
    }

    async fn generate_content(&self, request: LLMRequest) -> Result<LLMResponse> {
        let tools = if request.tools.is_empty() {
            vec![]
        } else {
            vec![GeminiTool {
                function_declarations: request
                    .tools
                    .into_iter()
                    .map(|decl| GeminiFunctionDeclaration {
                        name: decl.name,
                        description: decl.description,
                        parameters: decl.parameters,
                    })
                    .collect(),
            }]
        };

        let gemini_req = GeminiRequest {
            contents: Self::normalize_roles(request.contents),
            generation_config: request.config.map(|c| GenerationConfig {
                temperature: c.temperature,
                max_output_tokens: c.max_tokens,
                top_p: c.top_p,
            }),
            system_instruction: request.system_instruction.map(|text| SystemInstruction {
                parts: vec![SystemPart { text }],
            }),
            tools,
        };

        let response = self
            .auth
            .apply(self.client.post(self.build_url()))
            .json(&gemini_req)
            .send()
            .await
            .map_err(|e| Error::llm_error(format!("Request failed: {}", e)))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| Error::llm_error(format!("Failed to read response: {}", e)))?;

        let gemini_resp: GeminiResponse = match serde_json::from_str(&response_text) {
            Ok(parsed) => parsed,
            Err(_) if !status.is_success() => {
                return Err(Error::llm_error(format!(
                    "Gemini API error {}: {}",
                    status,
                    error_excerpt(&response_text)
                )));
            }
            Err(e) => {
                return Err(Error::llm_error(format!("Failed to parse response: {}", e)));
            }
        };

        if let Some(error) = gemini_resp.error {
            return Err(Error::llm_error(format!(
                "Gemini API error: {} (code: {})",
                error.message,
                error.code.unwrap_or(status.as_u16() as i32)
            )));
        }
        if !status.is_success() {
            return Err(Error::llm_error(format!("Gemini API error {}", status)));
        }

        let candidate = gemini_resp
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| Error::llm_error("Gemini response contained no candidates"))?;

        Ok(LLMResponse {
            content: candidate.content,
            finish_reason: candidate.finish_reason,
            usage: gemini_resp.usage_metadata.map(|u| Usage {
                input_tokens: u.prompt_token_count.unwrap_or(0),
                output_tokens: u.candidates_token_count.unwrap_or(0),
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

    fn provider(base_url: String) -> GeminiProvider {
        GeminiProvider::new(
            GeminiAuth::ApiKey("test-key".to_string()),
            GeminiConfig::with_base_url("gemini-2.0-flash".to_string(), base_url),
        )
    }

    #[tokio::test]
    async fn test_generate_content_with_function_call() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/gemini-2.0-flash:generateContent")
            .match_query(Matcher::UrlEncoded("key".into(), "test-key".into()))
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#""systemInstruction""#.to_string()),
                Matcher::Regex(r#""functionDeclarations""#.to_string()),
            ]))
            .with_status(200)
            .with_body(
                json!({
                    "candidates": [{
                        "content": {
                            "role": "model",
                            "parts": [{"functionCall": {
                                "name": "get_exchange_rate",
                                "args": {"currency_from": "USD", "currency_to": "EUR"}
                            }}]
                        },
                        "finishReason": "STOP"
                    }],
                    "usageMetadata": {"promptTokenCount": 30, "candidatesTokenCount": 5}
                })
                .to_string(),
            )
            .create_async()
            .await;

        let request = LLMRequest {
            model: "gemini-2.0-flash".to_string(),
            system_instruction: Some("You convert currencies.".to_string()),
            contents: vec![Content::new_user_text("Convert 100 USD to EUR")],
            tools: vec![ToolDeclaration {
                name: "get_exchange_rate".to_string(),
                description: "Get the exchange rate".to_string(),
                parameters: json!({"type": "object"}),
            }],
            config: None,
        };
        let response = provider(server.url()).generate_content(request).await.unwrap();

        mock.assert_async().await;
        let calls = response.content.function_calls();
        assert_eq!(calls[0].name, "get_exchange_rate");
        assert_eq!(calls[0].args["currency_to"], "EUR");
        assert_eq!(response.usage.map(|u| u.output_tokens), Some(5));
    }

    #[tokio::test]
    async fn test_api_error_body_is_llm_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/gemini-2.0-flash:generateContent")
            .match_query(Matcher::Any)
            .with_status(400)
            .with_body(json!({"error": {"code": 400, "message": "API key not valid"}}).to_string())
            .create_async()
            .await;

        let request = LLMRequest {
            model: "gemini-2.0-flash".to_string(),
            system_instruction: None,
            contents: vec![Content::new_user_text("hi")],
            tools: vec![],
            config: None,
        };
        let err = provider(server.url()).generate_content(request).await.unwrap_err();
        assert!(err.to_string().contains("API key not valid"));
    }

    #[test]
    fn test_function_role_becomes_user() {
        let contents = GeminiProvider::normalize_roles(vec![Content::function_responses(vec![
            FunctionResponse {
                name: "get_exchange_rate".to_string(),
                response: json!({"rate": 0.92}),
                id: None,
            },
        ])]);
        assert_eq!(contents[0].role, ROLE_USER);
    }
}
