//! Anthropic Messages API adapter

use super::http::{self, HttpProviderSettings};
use super::parser;
use super::prompt::ExtractionPrompt;
use async_trait::async_trait;
use council_application::{ProviderAdapter, ProviderError, ProviderExtraction};
use council_domain::{ExtractionRequest, TokenUsage};
use serde::{Deserialize, Serialize};
use tracing::debug;

const API_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    system: &'a str,
    messages: Vec<Message<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
}

/// Adapter for the Anthropic Messages API
pub struct AnthropicAdapter {
    client: reqwest::Client,
    settings: HttpProviderSettings,
}

impl AnthropicAdapter {
    pub fn new(client: reqwest::Client, settings: HttpProviderSettings) -> Self {
        Self { client, settings }
    }

    fn request_body<'a>(&'a self, model: &'a str, system: &'a str, user: &'a str) -> MessagesRequest<'a> {
        MessagesRequest {
            model,
            system,
            messages: vec![Message {
                role: "user",
                content: user,
            }],
            max_tokens: self.settings.max_tokens,
            temperature: 0.0,
        }
    }

    fn parse_response(&self, body: &str) -> Result<ProviderExtraction, ProviderError> {
        let response: MessagesResponse = serde_json::from_str(body).map_err(|e| {
            ProviderError::MalformedResponse(format!("unexpected response body: {}", e))
        })?;

        let text: String = response
            .content
            .into_iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text),
                ContentBlock::Other => None,
            })
            .collect::<Vec<_>>()
            .join("");
        if text.trim().is_empty() {
            return Err(ProviderError::MalformedResponse(
                "response has no text content".to_string(),
            ));
        }

        let usage = response
            .usage
            .map(|u| TokenUsage::new(u.input_tokens, u.output_tokens));

        parser::build_output(&text, usage, &self.settings.pricing)
    }
}

#[async_trait]
impl ProviderAdapter for AnthropicAdapter {
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
            "Sending messages request"
        );

        let mut builder = self
            .client
            .post(self.settings.endpoint("v1/messages"))
            .header("anthropic-version", API_VERSION)
            .json(&body);
        if let Some(key) = &self.settings.api_key {
            builder = builder.header("x-api-key", key);
        }

        let text = http::send(builder).await?;
        self.parse_response(&text)
    }
}
