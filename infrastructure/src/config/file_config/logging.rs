//! Logging configuration from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw logging configuration from TOML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL file receiving one record per provider response and round;
    /// a leading `~/` is expanded to the home directory
    pub round_log: Option<String>,
    /// Default log file for diagnostic output
    pub file: Option<String>,
}

impl FileLoggingConfig {
    pub fn round_log_path(&self) -> Option<PathBuf> {
        self.round_log.as_deref().map(expand_home)
    }

    pub fn file_path(&self) -> Option<PathBuf> {
        self.file.as_deref().map(expand_home)
    }
}

fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_log_path_expands_home() {
        let config = FileLoggingConfig {
            round_log: Some("~/rounds.jsonl".to_string()),
            file: None,
        };
        let path = config.round_log_path().unwrap();
        if let Some(home) = dirs::home_dir() {
            assert_eq!(path, home.join("rounds.jsonl"));
        }
        assert!(config.file_path().is_none());
    }

    #[test]
    fn test_plain_path_is_kept() {
        let config = FileLoggingConfig {
            round_log: Some("logs/rounds.jsonl".to_string()),
            file: None,
        };
        assert_eq!(
            config.round_log_path(),
            Some(PathBuf::from("logs/rounds.jsonl"))
        );
    }
}
