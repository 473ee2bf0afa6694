//! Domain layer for paper-council
//!
//! This crate contains the value objects of a council round and the
//! consensus merge. It performs no I/O and has no dependency on the
//! application, infrastructure or presentation layers.
//!
//! # Core Concepts
//!
//! ## Council
//!
//! A council is the set of LLM providers asked to extract the same paper.
//! Each provider answers independently; the round succeeds when at least
//! `min_responses` of them return a valid extraction.
//!
//! ## Consensus
//!
//! Successful extractions are merged field by field:
//!
//! - **Long-form text** (thesis, conclusions): longest value
//! - **Set-like lists** (keywords, limitations, ...): case-insensitive union
//! - **Structured lists** (key findings, claims, questions): union keyed on text
//! - **Confidence**: weighted mean using provider reliability weights
//!
//! ## Fallback
//!
//! Below quorum, a single provider's extraction may be passed through
//! verbatim. [`ConsensusKind`] tells callers which path produced a result.

pub mod config;
pub mod consensus;
pub mod council;
pub mod extraction;
pub mod paper;

// Re-export commonly used types
pub use config::OutputFormat;
pub use consensus::{ConsensusBuilder, MergedExtraction};
pub use council::{
    ConsensusKind, ConsensusResult, CouncilConfig, CouncilConfigBuilder, CouncilConfigError,
    CouncilFailure, ProviderConfig, ProviderErrorKind, ProviderOutcome, ProviderResponse,
    TokenUsage,
};
pub use extraction::{KeyClaim, KeyFinding, Methodology, StructuredExtraction};
pub use paper::{ExtractionRequest, ItemType};
