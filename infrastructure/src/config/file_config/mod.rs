//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into validated domain types.

mod council;
mod logging;
mod output;

pub use council::{FileCouncilConfig, FileProviderConfig, ProviderKind};
pub use logging::FileLoggingConfig;
pub use output::{FileOutputConfig, FileOutputFormat};

use council_domain::{CouncilConfig, CouncilConfigError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("no providers configured; add at least one [[council.providers]] entry")]
    NoProviders,

    #[error("[council] timeout_seconds cannot be 0")]
    InvalidTimeout,

    #[error("provider '{0}': timeout_seconds cannot be 0")]
    InvalidProviderTimeout(String),

    #[error(transparent)]
    Council(#[from] CouncilConfigError),
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Council settings and providers
    pub council: FileCouncilConfig,
    /// Output settings
    pub output: FileOutputConfig,
    /// Logging settings
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validated domain configuration of the council.
    pub fn to_council_config(&self) -> Result<CouncilConfig, ConfigValidationError> {
        self.council.to_council_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use council_domain::OutputFormat;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[council]
min_responses = 2
fallback_to_single = false
timeout_seconds = 240

[[council.providers]]
name = "openai"
kind = "openai"
weight = 1.5
model = "gpt-4o-mini"
api_key_env = "OPENAI_API_KEY"
input_price_per_mtok = 0.15
output_price_per_mtok = 0.60

[[council.providers]]
name = "claude"
kind = "anthropic"

[[council.providers]]
name = "local"
kind = "ollama"
weight = 0.5

[output]
format = "full"
color = false

[logging]
round_log = "rounds.jsonl"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.council.providers.len(), 3);
        assert!(!config.council.fallback_to_single);
        assert_eq!(config.council.providers[0].input_price_per_mtok, 0.15);
        assert_eq!(config.council.providers[1].kind, ProviderKind::Anthropic);
        assert_eq!(config.output.format, Some(OutputFormat::Full));
        assert!(!config.output.color);
        assert_eq!(config.logging.round_log.as_deref(), Some("rounds.jsonl"));

        let council = config.to_council_config().unwrap();
        assert_eq!(council.providers().len(), 3);
        assert_eq!(council.provider("local").unwrap().weight, 0.5);
    }

    #[test]
    fn test_deserialize_partial_config() {
        let toml_str = r#"
[output]
format = "json"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        // Defaults should apply
        assert_eq!(config.council, FileCouncilConfig::default());
        assert!(config.output.color);
        assert!(config.logging.round_log.is_none());
    }

    #[test]
    fn test_default_config_has_no_providers() {
        let config = FileConfig::default();
        assert!(matches!(
            config.to_council_config(),
            Err(ConfigValidationError::NoProviders)
        ));
    }
}
