//! Council configuration from TOML (`[council]` section)
//!
//! Example configuration:
//!
//! ```toml
//! [council]
//! min_responses = 2
//! fallback_to_single = true
//! parallel = true
//! timeout_seconds = 300
//!
//! [[council.providers]]
//! name = "openai"
//! kind = "openai"
//! weight = 1.5
//! model = "gpt-4o-mini"
//!
//! [[council.providers]]
//! name = "local"
//! kind = "ollama"
//! model = "llama3.1:8b"
//! ```

use council_domain::council::{
    DEFAULT_COUNCIL_TIMEOUT, DEFAULT_MIN_RESPONSES, DEFAULT_PROVIDER_TIMEOUT, DEFAULT_WEIGHT,
};
use council_domain::{CouncilConfig, ProviderConfig};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use super::ConfigValidationError;

/// Backend protocol of a configured provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// OpenAI chat completions (and compatible endpoints)
    #[default]
    OpenAi,
    /// Anthropic Messages API
    Anthropic,
    /// Local Ollama server via its OpenAI-compatible endpoint; no API key
    Ollama,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::Ollama => "ollama",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "https://api.openai.com/v1",
            ProviderKind::Anthropic => "https://api.anthropic.com",
            ProviderKind::Ollama => "http://localhost:11434/v1",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "gpt-4o-mini",
            ProviderKind::Anthropic => "claude-3-5-haiku-latest",
            ProviderKind::Ollama => "llama3.1:8b",
        }
    }

    /// Environment variable holding the API key, if the backend needs one
    pub fn default_api_key_env(&self) -> Option<&'static str> {
        match self {
            ProviderKind::OpenAi => Some("OPENAI_API_KEY"),
            ProviderKind::Anthropic => Some("ANTHROPIC_API_KEY"),
            ProviderKind::Ollama => None,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAi),
            "anthropic" | "claude" => Ok(ProviderKind::Anthropic),
            "ollama" => Ok(ProviderKind::Ollama),
            other => Err(format!("unknown provider kind: {}", other)),
        }
    }
}

/// One `[[council.providers]]` entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProviderConfig {
    /// Unique provider name; defaults to the kind
    pub name: Option<String>,
    pub kind: ProviderKind,
    /// Reliability weight for averaging and tie-breaks
    pub weight: f64,
    /// Per-call timeout in seconds
    pub timeout_seconds: u64,
    /// Model override; the adapter default is used when absent
    pub model: Option<String>,
    pub base_url: Option<String>,
    /// Environment variable holding the API key
    pub api_key_env: Option<String>,
    /// Direct API key (not recommended; use `api_key_env` instead)
    pub api_key: Option<String>,
    /// USD per million input tokens
    pub input_price_per_mtok: f64,
    /// USD per million output tokens
    pub output_price_per_mtok: f64,
    /// Maximum tokens per response
    pub max_tokens: u32,
}

impl Default for FileProviderConfig {
    fn default() -> Self {
        Self {
            name: None,
            kind: ProviderKind::default(),
            weight: DEFAULT_WEIGHT,
            timeout_seconds: DEFAULT_PROVIDER_TIMEOUT.as_secs(),
            model: None,
            base_url: None,
            api_key_env: None,
            api_key: None,
            input_price_per_mtok: 0.0,
            output_price_per_mtok: 0.0,
            max_tokens: 4096,
        }
    }
}

impl FileProviderConfig {
    pub fn new(kind: ProviderKind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }

    /// Name the provider is registered under
    pub fn provider_name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.kind.as_str())
    }

    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or(self.kind.default_base_url())
    }

    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(self.kind.default_model())
    }

    pub fn api_key_env(&self) -> Option<&str> {
        self.api_key_env
            .as_deref()
            .or(self.kind.default_api_key_env())
    }

    pub fn to_provider_config(&self) -> Result<ProviderConfig, ConfigValidationError> {
        if self.timeout_seconds == 0 {
            return Err(ConfigValidationError::InvalidProviderTimeout(
                self.provider_name().to_string(),
            ));
        }
        let mut provider = ProviderConfig::new(self.provider_name())
            .with_weight(self.weight)
            .with_timeout(Duration::from_secs(self.timeout_seconds));
        if let Some(model) = &self.model {
            provider = provider.with_model(model.clone());
        }
        Ok(provider)
    }
}

/// Raw council configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCouncilConfig {
    pub min_responses: usize,
    pub fallback_to_single: bool,
    pub parallel: bool,
    /// Overall round deadline in seconds
    pub timeout_seconds: u64,
    pub providers: Vec<FileProviderConfig>,
}

impl Default for FileCouncilConfig {
    fn default() -> Self {
        Self {
            min_responses: DEFAULT_MIN_RESPONSES,
            fallback_to_single: true,
            parallel: true,
            timeout_seconds: DEFAULT_COUNCIL_TIMEOUT.as_secs(),
            providers: Vec::new(),
        }
    }
}

impl FileCouncilConfig {
    /// Convert into a validated domain configuration.
    pub fn to_council_config(&self) -> Result<CouncilConfig, ConfigValidationError> {
        if self.providers.is_empty() {
            return Err(ConfigValidationError::NoProviders);
        }
        if self.timeout_seconds == 0 {
            return Err(ConfigValidationError::InvalidTimeout);
        }

        let providers = self
            .providers
            .iter()
            .map(FileProviderConfig::to_provider_config)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CouncilConfig::builder()
            .providers(providers)
            .min_responses(self.min_responses)
            .fallback_to_single(self.fallback_to_single)
            .parallel(self.parallel)
            .timeout(Duration::from_secs(self.timeout_seconds))
            .build()?)
    }
}
