//! Per-provider outcome of a council round.
//!
//! One [`ProviderResponse`] is produced for every configured provider in
//! every round, whether the provider succeeded, failed or never answered.
//! Together they form the audit trail returned to callers.

use crate::extraction::StructuredExtraction;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Why a provider call failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderErrorKind {
    /// Credentials missing or rejected
    AuthError,
    /// Provider quota or rate limit hit
    RateLimited,
    /// Payload could not be parsed or failed schema validation
    MalformedResponse,
    /// Transport-level failure or unexpected HTTP status
    NetworkError,
    /// Provider did not answer in time
    Timeout,
    /// The adapter itself crashed (panicked task)
    Internal,
}

impl ProviderErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderErrorKind::AuthError => "auth_error",
            ProviderErrorKind::RateLimited => "rate_limited",
            ProviderErrorKind::MalformedResponse => "malformed_response",
            ProviderErrorKind::NetworkError => "network_error",
            ProviderErrorKind::Timeout => "timeout",
            ProviderErrorKind::Internal => "internal",
        }
    }
}

impl std::fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Token counts reported by a provider for one call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    pub fn new(input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }

    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}

/// Outcome of a single provider call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProviderOutcome {
    Success {
        /// Raw extraction exactly as the provider returned it
        extraction: StructuredExtraction,
        confidence: f64,
        /// Estimated cost of the call in USD
        cost: f64,
        #[serde(with = "duration_ms")]
        elapsed: Duration,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        usage: Option<TokenUsage>,
    },
    Failure {
        kind: ProviderErrorKind,
        message: String,
        #[serde(with = "duration_ms")]
        elapsed: Duration,
    },
    Timeout {
        #[serde(with = "duration_ms")]
        elapsed: Duration,
    },
}

/// Response of one provider in one round (Value Object)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderResponse {
    pub provider: String,
    #[serde(flatten)]
    pub outcome: ProviderOutcome,
}

impl ProviderResponse {
    pub fn success(
        provider: impl Into<String>,
        extraction: StructuredExtraction,
        confidence: f64,
        cost: f64,
        elapsed: Duration,
    ) -> Self {
        Self {
            provider: provider.into(),
            outcome: ProviderOutcome::Success {
                extraction,
                confidence,
                cost,
                elapsed,
                usage: None,
            },
        }
    }

    pub fn failure(
        provider: impl Into<String>,
        kind: ProviderErrorKind,
        message: impl Into<String>,
        elapsed: Duration,
    ) -> Self {
        Self {
            provider: provider.into(),
            outcome: ProviderOutcome::Failure {
                kind,
                message: message.into(),
                elapsed,
            },
        }
    }

    pub fn timeout(provider: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            provider: provider.into(),
            outcome: ProviderOutcome::Timeout { elapsed },
        }
    }

    /// Attach token usage to a successful response; no-op otherwise.
    pub fn with_usage(mut self, tokens: TokenUsage) -> Self {
        if let ProviderOutcome::Success { usage, .. } = &mut self.outcome {
            *usage = Some(tokens);
        }
        self
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, ProviderOutcome::Success { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self.outcome, ProviderOutcome::Timeout { .. })
    }

    pub fn extraction(&self) -> Option<&StructuredExtraction> {
        match &self.outcome {
            ProviderOutcome::Success { extraction, .. } => Some(extraction),
            _ => None,
        }
    }

    pub fn confidence(&self) -> Option<f64> {
        match &self.outcome {
            ProviderOutcome::Success { confidence, .. } => Some(*confidence),
            _ => None,
        }
    }

    /// Cost of the call; failed and timed-out calls count as zero.
    pub fn cost(&self) -> f64 {
        match &self.outcome {
            ProviderOutcome::Success { cost, .. } => *cost,
            _ => 0.0,
        }
    }

    pub fn elapsed(&self) -> Duration {
        match &self.outcome {
            ProviderOutcome::Success { elapsed, .. }
            | ProviderOutcome::Failure { elapsed, .. }
            | ProviderOutcome::Timeout { elapsed } => *elapsed,
        }
    }

    /// Short status label: `success`, `timeout` or the failure kind
    pub fn status_label(&self) -> &'static str {
        match &self.outcome {
            ProviderOutcome::Success { .. } => "success",
            ProviderOutcome::Failure { kind, .. } => kind.as_str(),
            ProviderOutcome::Timeout { .. } => "timeout",
        }
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
