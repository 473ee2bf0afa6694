//! Building adapters from the file configuration

use super::anthropic::AnthropicAdapter;
use super::http::{self, HttpProviderSettings};
use super::openai::OpenAiCompatibleAdapter;
use super::parser::Pricing;
use crate::config::{FileCouncilConfig, FileProviderConfig, ProviderKind};
use council_application::ProviderAdapter;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Errors raised while turning configuration into adapters
#[derive(Debug, Error)]
pub enum AdapterBuildError {
    #[error("provider '{provider}': API key not found (set ${env} or api_key)")]
    MissingApiKey { provider: String, env: String },

    #[error("provider '{provider}': no API key configured (set api_key_env or api_key)")]
    NoApiKeySource { provider: String },

    #[error("failed to create HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Builds one adapter per configured provider, sharing a single HTTP client
pub struct AdapterFactory<E = fn(&str) -> Option<String>> {
    client: reqwest::Client,
    env: E,
}

impl AdapterFactory {
    /// Factory reading API keys from the process environment
    pub fn new() -> Result<Self, AdapterBuildError> {
        Ok(Self {
            client: http::build_client()?,
            env: |name| std::env::var(name).ok(),
        })
    }
}

impl<E> AdapterFactory<E>
where
    E: Fn(&str) -> Option<String>,
{
    /// Factory resolving environment variables through `env`
    pub fn with_env(client: reqwest::Client, env: E) -> Self {
        Self { client, env }
    }

    pub fn build(
        &self,
        config: &FileProviderConfig,
    ) -> Result<Arc<dyn ProviderAdapter>, AdapterBuildError> {
        let settings = self.settings(config)?;
        info!(
            "Configured provider {} ({} at {}, model {})",
            settings.name,
            config.kind,
            settings.base_url,
            settings.default_model
        );

        let adapter: Arc<dyn ProviderAdapter> = match config.kind {
            ProviderKind::OpenAi | ProviderKind::Ollama => {
                Arc::new(OpenAiCompatibleAdapter::new(self.client.clone(), settings))
            }
            ProviderKind::Anthropic => {
                Arc::new(AnthropicAdapter::new(self.client.clone(), settings))
            }
        };
        Ok(adapter)
    }

    /// Adapters for every provider of the council, in configuration order
    pub fn build_all(
        &self,
        council: &FileCouncilConfig,
    ) -> Result<Vec<Arc<dyn ProviderAdapter>>, AdapterBuildError> {
        council.providers.iter().map(|p| self.build(p)).collect()
    }

    fn settings(
        &self,
        config: &FileProviderConfig,
    ) -> Result<HttpProviderSettings, AdapterBuildError> {
        let mut settings =
            HttpProviderSettings::new(config.provider_name(), config.base_url(), config.model())
                .with_max_tokens(config.max_tokens)
                .with_pricing(Pricing::new(
                    config.input_price_per_mtok,
                    config.output_price_per_mtok,
                ));

        if let Some(key) = self.api_key(config)? {
            settings = settings.with_api_key(key);
        }
        Ok(settings)
    }

    fn api_key(&self, config: &FileProviderConfig) -> Result<Option<String>, AdapterBuildError> {
        if let Some(key) = &config.api_key {
            return Ok(Some(key.clone()));
        }

        match config.api_key_env() {
            Some(env) => match (self.env)(env) {
                Some(key) if !key.trim().is_empty() => Ok(Some(key)),
                _ => Err(AdapterBuildError::MissingApiKey {
                    provider: config.provider_name().to_string(),
                    env: env.to_string(),
                }),
            },
            None if config.kind == ProviderKind::Ollama => Ok(None),
            None => Err(AdapterBuildError::NoApiKeySource {
                provider: config.provider_name().to_string(),
            }),
        }
    }
}
