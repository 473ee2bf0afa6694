//! OpenAI-compatible chat completions adapter
//!
//! Speaks the `/chat/completions` protocol with JSON response format, which
//! covers OpenAI itself as well as Ollama, OpenRouter and similar servers.

use super::http::{self, HttpProviderSettings};
use super::parser;
use super::prompt::ExtractionPrompt;
use async_trait::async_trait;
use council_application::{ProviderAdapter, ProviderError, ProviderExtraction};
use council_domain::{ExtractionRequest, TokenUsage};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

/// Adapter for any OpenAI-compatible endpoint
pub struct OpenAiCompatibleAdapter {
    client: reqwest::Client,
    settings: HttpProviderSettings,
}

impl OpenAiCompatibleAdapter {
    pub fn new(client: reqwest::Client, settings: HttpProviderSettings) -> Self {
        Self { client, settings }
    }

    fn request_body<'a>(
        &'a self,
        model: &'a str,
        system: &'a str,
        user: &'a str,
    ) -> ChatRequest<'a> {
        ChatRequest {
            model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            max_tokens: self.settings.max_tokens,
            temperature: 0.0,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        }
    }

    fn parse_response(&self, body: &str) -> Result<ProviderExtraction, ProviderError> {
        let response: ChatResponse = serde_json::from_str(body).map_err(|e| {
            ProviderError::MalformedResponse(format!("unexpected response body: {}", e))
        })?;

        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                ProviderError::MalformedResponse("response has no message content".to_string())
            })?;

        let usage = response
            .usage
            .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens));

        parser::build_output(&text, usage, &self.settings.pricing)
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiCompatibleAdapter {
    fn name(&self) -> &str {
        &self.settings.name
    }

    async fn extract(
        &self,
        request: &ExtractionRequest,
        model: Option<&str>,
    ) -> Result<ProviderExtraction, ProviderError> {
        let model = self.settings.model(model);
        let user = ExtractionPrompt::user(request, self.settings.max_text_chars);
        let body = self.request_body(model, ExtractionPrompt::system(), &user);

        debug!(
            provider = %self.settings.name,
            model,
            prompt_chars = user.len(),
            "Sending chat completion request"
        );

        let mut builder = self
            .client
            .post(self.settings.endpoint("chat/completions"))
            .json(&body);
        if let Some(key) = &self.settings.api_key {
            builder = builder.bearer_auth(key);
        }

        let text = http::send(builder).await?;
        self.parse_response(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::parser::Pricing;

    fn adapter() -> OpenAiCompatibleAdapter {
        let settings = HttpProviderSettings::new("openai", "https://api.openai.com/v1", "gpt-4o-mini")
            .with_pricing(Pricing::new(0.15, 0.60));
        OpenAiCompatibleAdapter::new(reqwest::Client::new(), settings)
    }

    #[test]
    fn test_request_body_shape() {
        let adapter = adapter();
        let body = adapter.request_body("gpt-4o", "sys", "usr");
        let value = serde_json::to_value(&body).unwrap();

        assert_eq!(value["model"], "gpt-4o");
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "usr");
        assert_eq!(value["response_format"]["type"], "json_object");
        assert_eq!(value["max_tokens"], 4096);
    }

    #[test]
    fn test_parse_response_with_usage() {
        let body = serde_json::json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": "{\"thesis\": \"Weights reduce bias\", \"confidence\": 0.7}"
                }
            }],
            "usage": {"prompt_tokens": 10000, "completion_tokens": 1000}
        })
        .to_string();

        let output = adapter().parse_response(&body).unwrap();
        assert_eq!(output.extraction.thesis, "Weights reduce bias");
        assert_eq!(output.confidence, 0.7);
        assert_eq!(output.usage, Some(TokenUsage::new(10_000, 1_000)));
        assert!((output.cost - 0.0021).abs() < 1e-12);
    }

    #[test]
    fn test_parse_response_without_choices_is_malformed() {
        let err = adapter().parse_response(r#"{"choices": []}"#).unwrap_err();
        assert!(matches!(err, ProviderError::MalformedResponse(_)));

        let err = adapter().parse_response("<html>gateway</html>").unwrap_err();
        assert!(matches!(err, ProviderError::MalformedResponse(_)));
    }

    #[test]
    fn test_name_is_registration_name() {
        assert_eq!(adapter().name(), "openai");
    }
}
