//! LLM provider adapters
//!
//! Concrete implementations of the [`ProviderAdapter`](council_application::ProviderAdapter)
//! port over HTTP. Every adapter sends the same extraction prompt and parses
//! the reply with the same validation, so the council sees one uniform
//! capability regardless of backend.

pub mod anthropic;
pub mod factory;
pub mod http;
pub mod openai;
pub mod parser;
pub mod prompt;

pub use anthropic::AnthropicAdapter;
pub use factory::{AdapterBuildError, AdapterFactory};
pub use http::HttpProviderSettings;
pub use openai::OpenAiCompatibleAdapter;
pub use parser::Pricing;
pub use prompt::ExtractionPrompt;
