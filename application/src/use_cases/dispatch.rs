//! Dispatcher
//!
//! Runs `extract` on every provider of a round and yields the responses as
//! they become available. Each provider is isolated: an error, a timeout or
//! even a panic inside one adapter becomes that provider's response and never
//! disturbs the others.

use crate::ports::provider_adapter::{ProviderAdapter, ProviderError};
use council_domain::{ExtractionRequest, ProviderConfig, ProviderErrorKind, ProviderResponse};
use futures::FutureExt;
use std::any::Any;
use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// One provider to call, with its position in the configuration
#[derive(Clone)]
pub struct DispatchTarget {
    pub index: usize,
    pub config: ProviderConfig,
    pub adapter: Arc<dyn ProviderAdapter>,
}

impl DispatchTarget {
    pub fn new(index: usize, config: ProviderConfig, adapter: Arc<dyn ProviderAdapter>) -> Self {
        Self {
            index,
            config,
            adapter,
        }
    }
}

/// A response tagged with the configuration index of its provider
#[derive(Debug, Clone)]
pub struct Dispatched {
    pub index: usize,
    pub response: ProviderResponse,
}

/// Fans an extraction request out to the providers of a round
pub struct Dispatcher {
    request: Arc<ExtractionRequest>,
}

impl Dispatcher {
    pub fn new(request: Arc<ExtractionRequest>) -> Self {
        Self { request }
    }

    /// Start the round.
    ///
    /// In parallel mode every provider is spawned immediately on its own task.
    /// In sequential mode nothing runs until the stream is polled; providers
    /// are then called one at a time, in configuration order, on the polling
    /// task.
    pub fn dispatch(&self, targets: Vec<DispatchTarget>, parallel: bool) -> ResponseStream {
        if !parallel {
            debug!("Dispatching {} providers sequentially", targets.len());
            return ResponseStream::Sequential {
                request: Arc::clone(&self.request),
                pending: targets.into(),
            };
        }

        debug!("Dispatching {} providers in parallel", targets.len());
        let mut join_set = JoinSet::new();
        for target in targets {
            let request = Arc::clone(&self.request);
            join_set.spawn(async move {
                let response = invoke(&request, &target.config, target.adapter.as_ref()).await;
                Dispatched {
                    index: target.index,
                    response,
                }
            });
        }
        ResponseStream::Parallel(join_set)
    }
}

/// Responses of a round in completion order
///
/// Dropping the stream abandons every call still in flight: spawned tasks are
/// aborted and a pending sequential call is dropped.
pub enum ResponseStream {
    Parallel(JoinSet<Dispatched>),
    Sequential {
        request: Arc<ExtractionRequest>,
        pending: VecDeque<DispatchTarget>,
    },
}

impl ResponseStream {
    /// Next available response, or `None` once every provider has answered.
    ///
    /// Dropping the returned future never causes a provider to be called
    /// twice. In parallel mode no completed response is lost. In sequential
    /// mode the provider being called is abandoned and the next poll moves on
    /// to the following one.
    pub async fn next(&mut self) -> Option<Dispatched> {
        match self {
            ResponseStream::Parallel(join_set) => loop {
                match join_set.join_next().await? {
                    Ok(dispatched) => return Some(dispatched),
                    // Panics are caught inside the task, so only an aborted
                    // task ends up here.
                    Err(e) => warn!("Provider task did not complete: {}", e),
                }
            },
            ResponseStream::Sequential { request, pending } => {
                let target = pending.pop_front()?;
                let response = invoke(&**request, &target.config, target.adapter.as_ref()).await;
                Some(Dispatched {
                    index: target.index,
                    response,
                })
            }
        }
    }
}

/// Call one adapter under its per-provider timeout and turn whatever happens
/// into a [`ProviderResponse`].
pub async fn invoke(
    request: &ExtractionRequest,
    config: &ProviderConfig,
    adapter: &dyn ProviderAdapter,
) -> ProviderResponse {
    let name = config.name.as_str();
    debug!("Calling provider {}", name);

    let started = Instant::now();
    let call = AssertUnwindSafe(adapter.extract(request, config.model.as_deref())).catch_unwind();
    let outcome = tokio::time::timeout(config.timeout, call).await;
    let elapsed = started.elapsed();

    match outcome {
        Ok(Ok(Ok(output))) => {
            info!(
                "Provider {} succeeded in {:?} (confidence {:.2})",
                name, elapsed, output.confidence
            );
            let response = ProviderResponse::success(
                name,
                output.extraction,
                output.confidence,
                output.cost,
                elapsed,
            );
            match output.usage {
                Some(usage) => response.with_usage(usage),
                None => response,
            }
        }
        Ok(Ok(Err(ProviderError::Timeout))) => {
            warn!("Provider {} reported a timeout after {:?}", name, elapsed);
            ProviderResponse::timeout(name, elapsed)
        }
        Ok(Ok(Err(e))) => {
            warn!("Provider {} failed: {}", name, e);
            ProviderResponse::failure(name, e.kind(), e.to_string(), elapsed)
        }
        Ok(Err(payload)) => {
            let message = panic_message(payload.as_ref());
            warn!("Provider {} panicked: {}", name, message);
            ProviderResponse::failure(name, ProviderErrorKind::Internal, message, elapsed)
        }
        Err(_) => {
            warn!(
                "Provider {} exceeded its {:?} timeout",
                name, config.timeout
            );
            ProviderResponse::timeout(name, elapsed)
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("adapter panicked: {}", message)
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("adapter panicked: {}", message)
    } else {
        "adapter panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ScriptedAdapter, request};
    use council_domain::ProviderOutcome;
    use std::time::Duration;

    fn target(index: usize, adapter: ScriptedAdapter, timeout: Duration) -> DispatchTarget {
        let config = ProviderConfig::new(adapter.name()).with_timeout(timeout);
        DispatchTarget::new(index, config, Arc::new(adapter))
    }

    async fn drain(mut stream: ResponseStream) -> Vec<Dispatched> {
        let mut out = Vec::new();
        while let Some(dispatched) = stream.next().await {
            out.push(dispatched);
        }
        out
    }

    #[tokio::test(start_paused = true)]
    async fn test_invoke_success_measures_elapsed() {
        let adapter = ScriptedAdapter::succeed("openai", 0.8, 0.01).after(Duration::from_secs(2));
        let config = ProviderConfig::new("openai").with_model("gpt-4o-mini");

        let response = invoke(&request(), &config, &adapter).await;

        assert!(response.is_success());
        assert_eq!(response.confidence(), Some(0.8));
        assert_eq!(response.cost(), 0.01);
        assert_eq!(response.elapsed(), Duration::from_secs(2));
        assert_eq!(adapter.models(), vec![Some("gpt-4o-mini".to_string())]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invoke_maps_errors_to_failures() {
        let adapter = ScriptedAdapter::fail("openai", ProviderError::RateLimited("429".into()));
        let response = invoke(&request(), &ProviderConfig::new("openai"), &adapter).await;

        match response.outcome {
            ProviderOutcome::Failure { kind, message, .. } => {
                assert_eq!(kind, ProviderErrorKind::RateLimited);
                assert!(message.contains("429"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_invoke_adapter_timeout_is_timeout_outcome() {
        let adapter = ScriptedAdapter::fail("openai", ProviderError::Timeout);
        let response = invoke(&request(), &ProviderConfig::new("openai"), &adapter).await;
        assert!(response.is_timeout());
    }

    #[tokio::test(start_paused = true)]
    async fn test_invoke_enforces_provider_timeout() {
        let adapter = ScriptedAdapter::hang("slow");
        let config = ProviderConfig::new("slow").with_timeout(Duration::from_secs(5));

        let response = invoke(&request(), &config, &adapter).await;

        assert!(response.is_timeout());
        assert_eq!(response.elapsed(), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_invoke_contains_panics() {
        let adapter = ScriptedAdapter::panic("broken");
        let response = invoke(&request(), &ProviderConfig::new("broken"), &adapter).await;

        match response.outcome {
            ProviderOutcome::Failure { kind, message, .. } => {
                assert_eq!(kind, ProviderErrorKind::Internal);
                assert!(message.contains("broken adapter exploded"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_parallel_yields_in_completion_order() {
        let timeout = Duration::from_secs(60);
        let targets = vec![
            target(0, ScriptedAdapter::succeed("a", 0.5, 0.0).after(Duration::from_secs(3)), timeout),
            target(1, ScriptedAdapter::succeed("b", 0.5, 0.0).after(Duration::from_secs(1)), timeout),
            target(2, ScriptedAdapter::succeed("c", 0.5, 0.0).after(Duration::from_secs(2)), timeout),
        ];

        let started = Instant::now();
        let stream = Dispatcher::new(Arc::new(request())).dispatch(targets, true);
        let out = drain(stream).await;

        let order: Vec<usize> = out.iter().map(|d| d.index).collect();
        assert_eq!(order, vec![1, 2, 0]);
        // Concurrent: total time is the slowest provider, not the sum
        assert_eq!(started.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sequential_runs_in_configuration_order() {
        let timeout = Duration::from_secs(60);
        let targets = vec![
            target(0, ScriptedAdapter::succeed("a", 0.5, 0.0).after(Duration::from_secs(3)), timeout),
            target(1, ScriptedAdapter::succeed("b", 0.5, 0.0).after(Duration::from_secs(1)), timeout),
            target(2, ScriptedAdapter::fail("c", ProviderError::Auth("401".into())), timeout),
        ];

        let started = Instant::now();
        let stream = Dispatcher::new(Arc::new(request())).dispatch(targets, false);
        let out = drain(stream).await;

        let order: Vec<usize> = out.iter().map(|d| d.index).collect();
        assert_eq!(order, vec![0, 1, 2]);
        assert_eq!(started.elapsed(), Duration::from_secs(4));
        assert_eq!(out[2].response.status_label(), "auth_error");
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_failure_does_not_abort_siblings() {
        let timeout = Duration::from_secs(10);
        let targets = vec![
            target(0, ScriptedAdapter::panic("a"), timeout),
            target(1, ScriptedAdapter::hang("b"), timeout),
            target(2, ScriptedAdapter::succeed("c", 0.7, 0.02), timeout),
        ];

        let stream = Dispatcher::new(Arc::new(request())).dispatch(targets, true);
        let mut out = drain(stream).await;
        out.sort_by_key(|d| d.index);

        assert_eq!(out.len(), 3);
        assert_eq!(out[0].response.status_label(), "internal");
        assert!(out[1].response.is_timeout());
        assert!(out[2].response.is_success());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sequential_is_lazy() {
        let adapter = Arc::new(ScriptedAdapter::succeed("a", 0.5, 0.0));
        let targets = vec![DispatchTarget::new(
            0,
            ProviderConfig::new("a"),
            adapter.clone() as Arc<dyn ProviderAdapter>,
        )];

        let mut stream = Dispatcher::new(Arc::new(request())).dispatch(targets, false);
        assert_eq!(adapter.calls(), 0);

        assert!(stream.next().await.is_some());
        assert!(stream.next().await.is_none());
        assert_eq!(adapter.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sequential_abandoned_call_is_not_repeated() {
        let slow = Arc::new(ScriptedAdapter::succeed("slow", 0.5, 0.0).after(Duration::from_secs(10)));
        let next = Arc::new(ScriptedAdapter::succeed("next", 0.5, 0.0));
        let targets = vec![
            DispatchTarget::new(0, ProviderConfig::new("slow"), slow.clone() as Arc<dyn ProviderAdapter>),
            DispatchTarget::new(1, ProviderConfig::new("next"), next.clone() as Arc<dyn ProviderAdapter>),
        ];

        let mut stream = Dispatcher::new(Arc::new(request())).dispatch(targets, false);
        let cut = tokio::time::timeout(Duration::from_secs(1), stream.next()).await;
        assert!(cut.is_err());

        let dispatched = stream.next().await.unwrap();
        assert_eq!(dispatched.index, 1);
        assert!(stream.next().await.is_none());
        assert_eq!((slow.calls(), next.calls()), (1, 1));
    }
}
