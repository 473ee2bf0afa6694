//! Progress notification port
//!
//! Defines the interface for reporting progress during a council round.

use council_domain::{ConsensusResult, ProviderResponse};

/// Callback for progress updates during a council round
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (progress bars, plain text, ...).
pub trait CouncilProgressNotifier: Send + Sync {
    /// Called once the providers of the round are resolved
    fn on_round_start(&self, paper_id: &str, total_providers: usize);

    /// Called as each provider response is collected, in completion order
    fn on_provider_complete(&self, response: &ProviderResponse);

    /// Called when the round result has been assembled
    fn on_round_complete(&self, _result: &ConsensusResult) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl CouncilProgressNotifier for NoProgress {
    fn on_round_start(&self, _paper_id: &str, _total_providers: usize) {}
    fn on_provider_complete(&self, _response: &ProviderResponse) {}
}
