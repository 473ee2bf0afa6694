//! Port definitions
//!
//! Interfaces the council depends on, implemented by the infrastructure and
//! presentation layers.

pub mod progress;
pub mod provider_adapter;
pub mod round_logger;
