//! Response Collector
//!
//! Gathers the dispatcher's stream into exactly one response per configured
//! provider, in configuration order. Collection is wait-all-or-deadline:
//! reaching quorum is noted but never ends the round early.

use super::dispatch::{Dispatched, ResponseStream};
use council_domain::{CouncilConfig, ProviderResponse};
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Write-once accumulation of the responses of one round
pub struct ResponseCollector {
    providers: Vec<String>,
    slots: Vec<Option<ProviderResponse>>,
    min_responses: usize,
    successes: usize,
    started: Instant,
}

impl ResponseCollector {
    pub fn new(config: &CouncilConfig, started: Instant) -> Self {
        let providers: Vec<String> = config.providers().iter().map(|p| p.name.clone()).collect();
        Self {
            slots: vec![None; providers.len()],
            providers,
            min_responses: config.min_responses(),
            successes: 0,
            started,
        }
    }

    /// Store a response in its slot.
    ///
    /// Returns the stored response, or `None` when the slot was already
    /// written or the index is unknown; such writes are ignored.
    pub fn record(&mut self, dispatched: Dispatched) -> Option<&ProviderResponse> {
        let Dispatched { index, response } = dispatched;

        let Some(slot) = self.slots.get_mut(index) else {
            warn!(
                "Ignoring response from {} for unknown slot {}",
                response.provider, index
            );
            return None;
        };
        if slot.is_some() {
            warn!("Ignoring duplicate response from {}", response.provider);
            return None;
        }

        if response.is_success() {
            self.successes += 1;
            if self.successes == self.min_responses {
                info!(
                    "Quorum of {} reached; waiting for remaining providers",
                    self.min_responses
                );
            }
        }

        let stored: &ProviderResponse = slot.insert(response);
        Some(stored)
    }

    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    pub fn success_count(&self) -> usize {
        self.successes
    }

    /// Drain `stream` until every provider answered or `deadline` passed.
    ///
    /// `on_response` sees each response as it is stored, in completion order,
    /// followed by the timeouts recorded for providers the deadline cut off.
    /// The stream is left with whatever is still in flight; dropping it
    /// abandons that work.
    pub async fn collect<F>(
        mut self,
        stream: &mut ResponseStream,
        deadline: Instant,
        mut on_response: F,
    ) -> Vec<ProviderResponse>
    where
        F: FnMut(&ProviderResponse),
    {
        while !self.is_complete() {
            match tokio::time::timeout_at(deadline, stream.next()).await {
                Ok(Some(dispatched)) => {
                    if let Some(response) = self.record(dispatched) {
                        on_response(response);
                    }
                }
                Ok(None) => {
                    debug!("Dispatcher finished with providers still missing");
                    break;
                }
                Err(_) => {
                    warn!(
                        "Council deadline reached with {} of {} providers answered",
                        self.slots.iter().filter(|s| s.is_some()).count(),
                        self.slots.len()
                    );
                    break;
                }
            }
        }

        self.close(on_response)
    }

    /// Close the round, recording every missing provider as a timeout.
    pub fn finish(self) -> Vec<ProviderResponse> {
        self.close(|_| {})
    }

    fn close<F>(self, mut on_filled: F) -> Vec<ProviderResponse>
    where
        F: FnMut(&ProviderResponse),
    {
        let elapsed = self.started.elapsed();
        self.slots
            .into_iter()
            .zip(self.providers)
            .map(|(slot, provider)| match slot {
                Some(response) => response,
                None => {
                    debug!("Recording {} as timed out after {:?}", provider, elapsed);
                    let response = ProviderResponse::timeout(provider, elapsed);
                    on_filled(&response);
                    response
                }
            })
            .collect()
    }
}
