//! Council configuration value objects.
//!
//! [`CouncilConfig`] is validated once by [`CouncilConfigBuilder::build`];
//! every other component can rely on its invariants:
//!
//! - at least one provider, names non-empty and unique
//! - weights positive and finite
//! - per-provider and overall timeouts non-zero
//! - `1 <= min_responses <= providers.len()`

use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;

/// Default reliability weight of a provider
pub const DEFAULT_WEIGHT: f64 = 1.0;
/// Default per-call timeout of a provider
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(120);
/// Default deadline for a whole council round
pub const DEFAULT_COUNCIL_TIMEOUT: Duration = Duration::from_secs(300);
/// Default quorum
pub const DEFAULT_MIN_RESPONSES: usize = 2;

/// Configuration errors detected when a council is built
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CouncilConfigError {
    #[error("No providers configured for the council")]
    NoProviders,

    #[error("Provider name cannot be empty")]
    EmptyProviderName,

    #[error("Duplicate provider name: {0}")]
    DuplicateProvider(String),

    #[error("Invalid weight {weight} for provider {provider}: must be positive and finite")]
    InvalidWeight { provider: String, weight: f64 },

    #[error("Timeout for provider {0} cannot be zero")]
    ZeroProviderTimeout(String),

    #[error("Council timeout cannot be zero")]
    ZeroTimeout,

    #[error("min_responses must be at least 1")]
    ZeroMinResponses,

    #[error("min_responses ({min}) exceeds the number of configured providers ({providers})")]
    MinResponsesExceedsProviders { min: usize, providers: usize },
}

/// One participating provider
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConfig {
    /// Unique key; also the name the adapter is registered under
    pub name: String,
    /// Reliability multiplier used for averaging and tie-breaks
    pub weight: f64,
    /// Bound on a single `extract` call
    pub timeout: Duration,
    /// Model to request instead of the adapter's default
    pub model: Option<String>,
}

impl ProviderConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            weight: DEFAULT_WEIGHT,
            timeout: DEFAULT_PROVIDER_TIMEOUT,
            model: None,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// Validated configuration of a council round.
///
/// Built through [`CouncilConfig::builder`]; read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct CouncilConfig {
    providers: Vec<ProviderConfig>,
    min_responses: usize,
    fallback_to_single: bool,
    parallel: bool,
    timeout: Duration,
}

impl CouncilConfig {
    pub fn builder() -> CouncilConfigBuilder {
        CouncilConfigBuilder::default()
    }

    /// Providers in configuration order
    pub fn providers(&self) -> &[ProviderConfig] {
        &self.providers
    }

    pub fn provider(&self, name: &str) -> Option<&ProviderConfig> {
        self.providers.iter().find(|p| p.name == name)
    }

    pub fn min_responses(&self) -> usize {
        self.min_responses
    }

    pub fn fallback_to_single(&self) -> bool {
        self.fallback_to_single
    }

    pub fn parallel(&self) -> bool {
        self.parallel
    }

    /// Overall round deadline
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Rebuild the config keeping only the named providers.
    ///
    /// `min_responses` is lowered to the remaining provider count when the
    /// selection leaves fewer providers than the quorum.
    pub fn restricted_to(&self, names: &[String]) -> Result<CouncilConfig, CouncilConfigError> {
        let providers: Vec<ProviderConfig> = self
            .providers
            .iter()
            .filter(|p| names.iter().any(|n| n == &p.name))
            .cloned()
            .collect();
        let min_responses = self.min_responses.min(providers.len().max(1));

        CouncilConfigBuilder {
            providers,
            min_responses,
            fallback_to_single: self.fallback_to_single,
            parallel: self.parallel,
            timeout: self.timeout,
        }
        .build()
    }

    /// Return a builder pre-filled with this configuration.
    pub fn to_builder(&self) -> CouncilConfigBuilder {
        CouncilConfigBuilder {
            providers: self.providers.clone(),
            min_responses: self.min_responses,
            fallback_to_single: self.fallback_to_single,
            parallel: self.parallel,
            timeout: self.timeout,
        }
    }
}

/// Builder for [`CouncilConfig`]
#[derive(Debug, Clone)]
pub struct CouncilConfigBuilder {
    providers: Vec<ProviderConfig>,
    min_responses: usize,
    fallback_to_single: bool,
    parallel: bool,
    timeout: Duration,
}

impl Default for CouncilConfigBuilder {
    fn default() -> Self {
        Self {
            providers: Vec::new(),
            min_responses: DEFAULT_MIN_RESPONSES,
            fallback_to_single: true,
            parallel: true,
            timeout: DEFAULT_COUNCIL_TIMEOUT,
        }
    }
}

impl CouncilConfigBuilder {
    pub fn provider(mut self, provider: ProviderConfig) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn providers(mut self, providers: impl IntoIterator<Item = ProviderConfig>) -> Self {
        self.providers.extend(providers);
        self
    }

    pub fn min_responses(mut self, min_responses: usize) -> Self {
        self.min_responses = min_responses;
        self
    }

    pub fn fallback_to_single(mut self, enabled: bool) -> Self {
        self.fallback_to_single = enabled;
        self
    }

    pub fn parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<CouncilConfig, CouncilConfigError> {
        if self.providers.is_empty() {
            return Err(CouncilConfigError::NoProviders);
        }

        let mut seen = HashSet::new();
        for provider in &self.providers {
            if provider.name.trim().is_empty() {
                return Err(CouncilConfigError::EmptyProviderName);
            }
            if !seen.insert(provider.name.as_str()) {
                return Err(CouncilConfigError::DuplicateProvider(provider.name.clone()));
            }
            if !provider.weight.is_finite() || provider.weight <= 0.0 {
                return Err(CouncilConfigError::InvalidWeight {
                    provider: provider.name.clone(),
                    weight: provider.weight,
                });
            }
            if provider.timeout.is_zero() {
                return Err(CouncilConfigError::ZeroProviderTimeout(provider.name.clone()));
            }
        }

        if self.timeout.is_zero() {
            return Err(CouncilConfigError::ZeroTimeout);
        }
        if self.min_responses == 0 {
            return Err(CouncilConfigError::ZeroMinResponses);
        }
        if self.min_responses > self.providers.len() {
            return Err(CouncilConfigError::MinResponsesExceedsProviders {
                min: self.min_responses,
                providers: self.providers.len(),
            });
        }

        Ok(CouncilConfig {
            providers: self.providers,
            min_responses: self.min_responses,
            fallback_to_single: self.fallback_to_single,
            parallel: self.parallel,
            timeout: self.timeout,
        })
    }
}
