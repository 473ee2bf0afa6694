//! Infrastructure layer for paper-council
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: HTTP provider adapters, configuration file
//! loading and the JSONL round logger.

pub mod config;
pub mod logging;
pub mod providers;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileConfig, FileCouncilConfig, FileLoggingConfig,
    FileOutputConfig, FileOutputFormat, FileProviderConfig, ProviderKind,
};
pub use logging::JsonlRoundLogger;
pub use providers::{
    AdapterBuildError, AdapterFactory, AnthropicAdapter, HttpProviderSettings,
    OpenAiCompatibleAdapter, Pricing,
};
