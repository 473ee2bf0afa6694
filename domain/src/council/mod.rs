//! Council round types: configuration, per-provider responses and the
//! round result.
//!
//! A round flows through these types in order:
//!
//! ```text
//! CouncilConfig ──▶ ProviderResponse × N (audit trail) ──▶ ConsensusResult
//! ```

pub mod config;
pub mod response;
pub mod result;

pub use config::{
    CouncilConfig, CouncilConfigBuilder, CouncilConfigError, DEFAULT_COUNCIL_TIMEOUT,
    DEFAULT_MIN_RESPONSES, DEFAULT_PROVIDER_TIMEOUT, DEFAULT_WEIGHT, ProviderConfig,
};
pub use response::{ProviderErrorKind, ProviderOutcome, ProviderResponse, TokenUsage};
pub use result::{ConsensusKind, ConsensusResult, CouncilFailure};
