//! Provider adapter port
//!
//! Defines the single capability every LLM backend offers to the council:
//! extract a [`StructuredExtraction`] from a paper.

use async_trait::async_trait;
use council_domain::{ExtractionRequest, ProviderErrorKind, StructuredExtraction, TokenUsage};
use thiserror::Error;

/// Errors an adapter can report for one extraction call
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout")]
    Timeout,
}

impl ProviderError {
    /// Audit-trail category of this error
    pub fn kind(&self) -> ProviderErrorKind {
        match self {
            ProviderError::Auth(_) => ProviderErrorKind::AuthError,
            ProviderError::RateLimited(_) => ProviderErrorKind::RateLimited,
            ProviderError::MalformedResponse(_) => ProviderErrorKind::MalformedResponse,
            ProviderError::Network(_) => ProviderErrorKind::NetworkError,
            ProviderError::Timeout => ProviderErrorKind::Timeout,
        }
    }
}

/// Successful output of an adapter call
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderExtraction {
    pub extraction: StructuredExtraction,
    pub confidence: f64,
    /// Estimated cost of the call in USD
    pub cost: f64,
    pub usage: Option<TokenUsage>,
}

impl ProviderExtraction {
    /// Wrap an extraction, taking its self-reported confidence.
    pub fn new(extraction: StructuredExtraction, cost: f64) -> Self {
        let confidence = extraction.confidence;
        Self {
            extraction,
            confidence,
            cost,
            usage: None,
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = Some(usage);
        self
    }
}

/// Uniform capability wrapping one LLM backend.
///
/// Implementations (adapters) live in the infrastructure layer. The council
/// bounds every call with the provider's configured timeout, so an adapter
/// does not need its own; retries and backoff, if any, belong here rather
/// than in the council.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Name the adapter is registered under; matches `ProviderConfig::name`
    fn name(&self) -> &str;

    /// Extract a structured summary of the paper.
    ///
    /// `model` overrides the adapter's default model when set.
    async fn extract(
        &self,
        request: &ExtractionRequest,
        model: Option<&str>,
    ) -> Result<ProviderExtraction, ProviderError>;
}
