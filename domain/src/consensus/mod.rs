//! Consensus building
//!
//! Turns the successful responses of a council round into a single
//! extraction. Failures and timeouts never reach this module; they stay in
//! the audit trail only.
//!
//! ```text
//! ProviderResponse[] ──filter Success──▶ Contribution[] (config order, weights)
//!                                              │
//!                      ┌───────────────────────┼──────────────────────┐
//!                      ▼                       ▼                      ▼
//!               longest_text             union_set / keyed     weighted_confidence
//!                      └───────────────────────┼──────────────────────┘
//!                                              ▼
//!                                     MergedExtraction
//! ```

pub mod builder;
pub mod merge;

pub use builder::{ConsensusBuilder, MergedExtraction};
pub use merge::{Contribution, Keyed};
