//! HTTP plumbing shared by the provider adapters

use super::parser::Pricing;
use super::prompt::DEFAULT_MAX_TEXT_CHARS;
use council_application::ProviderError;
use reqwest::StatusCode;
use std::time::Duration;

/// Client-side request timeout; the council enforces the per-provider bound
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(600);

/// Connection settings of one HTTP provider
#[derive(Debug, Clone)]
pub struct HttpProviderSettings {
    /// Name the adapter is registered under
    pub name: String,
    pub base_url: String,
    /// Model used when the council does not override it
    pub default_model: String,
    pub api_key: Option<String>,
    pub max_tokens: u32,
    pub pricing: Pricing,
    pub max_text_chars: usize,
}

impl HttpProviderSettings {
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        default_model: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            default_model: default_model.into(),
            api_key: None,
            max_tokens: 4096,
            pricing: Pricing::default(),
            max_text_chars: DEFAULT_MAX_TEXT_CHARS,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_pricing(mut self, pricing: Pricing) -> Self {
        self.pricing = pricing;
        self
    }

    /// `base_url` joined with `path`, without doubled slashes
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn model<'a>(&'a self, model_override: Option<&'a str>) -> &'a str {
        model_override.unwrap_or(&self.default_model)
    }
}

pub fn build_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(DEFAULT_HTTP_TIMEOUT)
        .user_agent(concat!("paper-council/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Map a non-success HTTP status to the provider error taxonomy.
pub fn status_error(status: StatusCode, body: &str) -> ProviderError {
    let detail = format!("HTTP {}: {}", status.as_u16(), snippet(body));
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::Auth(detail),
        StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited(detail),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => ProviderError::Timeout,
        _ => ProviderError::Network(detail),
    }
}

/// Map a transport-level failure to the provider error taxonomy.
pub fn transport_error(error: reqwest::Error) -> ProviderError {
    if error.is_timeout() {
        ProviderError::Timeout
    } else if error.is_decode() {
        ProviderError::MalformedResponse(error.to_string())
    } else {
        ProviderError::Network(error.to_string())
    }
}

/// Send a prepared request and return the body of a successful response.
pub async fn send(request: reqwest::RequestBuilder) -> Result<String, ProviderError> {
    let response = request.send().await.map_err(transport_error)?;
    let status = response.status();
    let body = response.text().await.map_err(transport_error)?;
    if !status.is_success() {
        return Err(status_error(status, &body));
    }
    Ok(body)
}

fn snippet(body: &str) -> &str {
    let body = body.trim();
    match body.char_indices().nth(200) {
        Some((end, _)) => &body[..end],
        None => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, "bad key"),
            ProviderError::Auth(_)
        ));
        assert!(matches!(
            status_error(StatusCode::FORBIDDEN, ""),
            ProviderError::Auth(_)
        ));
        assert!(matches!(
            status_error(StatusCode::TOO_MANY_REQUESTS, "slow down"),
            ProviderError::RateLimited(_)
        ));
        assert!(matches!(
            status_error(StatusCode::GATEWAY_TIMEOUT, ""),
            ProviderError::Timeout
        ));
        assert!(matches!(
            status_error(StatusCode::INTERNAL_SERVER_ERROR, "boom"),
            ProviderError::Network(_)
        ));
        assert!(matches!(
            status_error(StatusCode::BAD_REQUEST, "unknown model"),
            ProviderError::Network(_)
        ));
    }

    #[test]
    fn test_status_detail_is_truncated() {
        let body = "x".repeat(1000);
        let ProviderError::Network(detail) = status_error(StatusCode::BAD_GATEWAY, &body) else {
            panic!("expected network error");
        };
        assert!(detail.starts_with("HTTP 502: "));
        assert_eq!(detail.len(), "HTTP 502: ".len() + 200);
    }

    #[test]
    fn test_endpoint_join() {
        let settings = HttpProviderSettings::new("openai", "https://api.openai.com/v1/", "m");
        assert_eq!(
            settings.endpoint("/chat/completions"),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn test_model_override() {
        let settings = HttpProviderSettings::new("openai", "http://x", "gpt-4o-mini");
        assert_eq!(settings.model(None), "gpt-4o-mini");
        assert_eq!(settings.model(Some("gpt-4o")), "gpt-4o");
    }
}
