//! Application layer for paper-council
//!
//! This crate contains the council use case and its port definitions.
//! It depends only on the domain layer.

pub mod ports;
pub mod use_cases;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use ports::{
    progress::{CouncilProgressNotifier, NoProgress},
    provider_adapter::{ProviderAdapter, ProviderError, ProviderExtraction},
    round_logger::{NoRoundLogger, RoundEvent, RoundLogger},
};
pub use use_cases::collect::ResponseCollector;
pub use use_cases::dispatch::{DispatchTarget, Dispatched, Dispatcher, ResponseStream};
pub use use_cases::run_council::{RunCouncilError, RunCouncilUseCase};
