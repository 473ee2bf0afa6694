//! Run Council use case
//!
//! Orchestrates one council round: dispatch to every provider, collect
//! against the deadline, then apply the quorum check and merge.

use super::collect::ResponseCollector;
use super::dispatch::{DispatchTarget, Dispatcher};
use crate::ports::progress::{CouncilProgressNotifier, NoProgress};
use crate::ports::provider_adapter::ProviderAdapter;
use crate::ports::round_logger::{NoRoundLogger, RoundEvent, RoundLogger};
use council_domain::{ConsensusResult, CouncilConfig, ExtractionRequest, ProviderResponse};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Errors that prevent a round from producing a [`ConsensusResult`]
///
/// Provider failures and missed quorum are not errors; they are reported
/// inside the result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunCouncilError {
    #[error("No adapter registered for provider '{0}'")]
    UnknownProvider(String),

    #[error("Council round cancelled")]
    Cancelled,
}

/// Use case for running a council round
pub struct RunCouncilUseCase {
    adapters: HashMap<String, Arc<dyn ProviderAdapter>>,
    cancellation_token: Option<CancellationToken>,
    round_logger: Arc<dyn RoundLogger>,
}

impl RunCouncilUseCase {
    /// Register adapters under their own names; a later adapter with the
    /// same name replaces an earlier one.
    pub fn new(adapters: Vec<Arc<dyn ProviderAdapter>>) -> Self {
        let adapters = adapters
            .into_iter()
            .map(|adapter| (adapter.name().to_string(), adapter))
            .collect();
        Self {
            adapters,
            cancellation_token: None,
            round_logger: Arc::new(NoRoundLogger),
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    pub fn with_round_logger(mut self, logger: Arc<dyn RoundLogger>) -> Self {
        self.round_logger = logger;
        self
    }

    /// Execute a round with default (no-op) progress
    pub async fn execute(
        &self,
        request: ExtractionRequest,
        config: &CouncilConfig,
    ) -> Result<ConsensusResult, RunCouncilError> {
        self.execute_with_progress(request, config, &NoProgress)
            .await
    }

    /// Execute a round with progress callbacks
    pub async fn execute_with_progress(
        &self,
        request: ExtractionRequest,
        config: &CouncilConfig,
        progress: &dyn CouncilProgressNotifier,
    ) -> Result<ConsensusResult, RunCouncilError> {
        let targets = self.resolve(config)?;
        let paper_id = request.paper_id.clone();

        info!(
            "Starting council round for {} with {} providers ({}, quorum {})",
            paper_id,
            targets.len(),
            if config.parallel() { "parallel" } else { "sequential" },
            config.min_responses()
        );
        progress.on_round_start(&paper_id, targets.len());

        let started = Instant::now();
        let deadline = started + config.timeout();
        let mut stream = Dispatcher::new(Arc::new(request)).dispatch(targets, config.parallel());

        let collecting = ResponseCollector::new(config, started).collect(
            &mut stream,
            deadline,
            |response| {
                progress.on_provider_complete(response);
                self.log_response(&paper_id, response);
            },
        );

        let responses = match &self.cancellation_token {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => {
                    warn!("Council round for {} cancelled", paper_id);
                    return Err(RunCouncilError::Cancelled);
                }
                responses = collecting => responses,
            },
            None => collecting.await,
        };
        // Abandon anything the deadline cut off
        drop(stream);

        let result = ConsensusResult::assemble(paper_id, responses, config);
        info!(
            "Council round for {} finished: success={}, {}/{} providers succeeded, cost ${:.4}",
            result.paper_id,
            result.success,
            result.success_count(),
            result.provider_responses.len(),
            result.total_cost
        );
        self.log_result(&result, started);
        progress.on_round_complete(&result);

        Ok(result)
    }

    /// Pair every configured provider with its adapter, in configuration order.
    fn resolve(&self, config: &CouncilConfig) -> Result<Vec<DispatchTarget>, RunCouncilError> {
        config
            .providers()
            .iter()
            .enumerate()
            .map(|(index, provider)| {
                self.adapters
                    .get(&provider.name)
                    .map(|adapter| DispatchTarget::new(index, provider.clone(), Arc::clone(adapter)))
                    .ok_or_else(|| RunCouncilError::UnknownProvider(provider.name.clone()))
            })
            .collect()
    }

    fn log_response(&self, paper_id: &str, response: &ProviderResponse) {
        self.round_logger.log(RoundEvent::new(
            "provider_response",
            serde_json::json!({
                "paper_id": paper_id,
                "provider": response.provider,
                "status": response.status_label(),
                "elapsed_ms": response.elapsed().as_millis() as u64,
                "confidence": response.confidence(),
                "cost": response.cost(),
            }),
        ));
    }

    fn log_result(&self, result: &ConsensusResult, started: Instant) {
        self.round_logger.log(RoundEvent::new(
            "round_complete",
            serde_json::json!({
                "paper_id": result.paper_id,
                "success": result.success,
                "kind": result.kind,
                "consensus_confidence": result.consensus_confidence,
                "total_cost": result.total_cost,
                "successes": result.success_count(),
                "providers": result.provider_responses.len(),
                "failure_reason": result.failure_reason.as_ref().map(|f| f.to_string()),
                "elapsed_ms": started.elapsed().as_millis() as u64,
            }),
        ));
    }
}
