//! Scripted provider adapters for use case tests.

use crate::ports::provider_adapter::{ProviderAdapter, ProviderError, ProviderExtraction};
use async_trait::async_trait;
use council_domain::{ExtractionRequest, StructuredExtraction};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// What a scripted adapter does when called
#[derive(Clone)]
pub enum Script {
    Succeed { confidence: f64, cost: f64 },
    Fail(ProviderError),
    Hang,
    Panic,
}

/// Adapter replaying a fixed script after an optional delay
pub struct ScriptedAdapter {
    name: String,
    script: Script,
    delay: Duration,
    keywords: Vec<String>,
    calls: AtomicUsize,
    models: Mutex<Vec<Option<String>>>,
}

impl ScriptedAdapter {
    fn with_script(name: &str, script: Script) -> Self {
        Self {
            name: name.to_string(),
            script,
            delay: Duration::ZERO,
            keywords: Vec::new(),
            calls: AtomicUsize::new(0),
            models: Mutex::new(Vec::new()),
        }
    }

    pub fn succeed(name: &str, confidence: f64, cost: f64) -> Self {
        Self::with_script(name, Script::Succeed { confidence, cost })
    }

    pub fn fail(name: &str, error: ProviderError) -> Self {
        Self::with_script(name, Script::Fail(error))
    }

    pub fn hang(name: &str) -> Self {
        Self::with_script(name, Script::Hang)
    }

    pub fn panic(name: &str) -> Self {
        Self::with_script(name, Script::Panic)
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_keywords(mut self, keywords: &[&str]) -> Self {
        self.keywords = keywords.iter().map(|k| k.to_string()).collect();
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn models(&self) -> Vec<Option<String>> {
        self.models.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProviderAdapter for ScriptedAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn extract(
        &self,
        request: &ExtractionRequest,
        model: Option<&str>,
    ) -> Result<ProviderExtraction, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.models.lock().unwrap().push(model.map(str::to_string));

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        match &self.script {
            Script::Succeed { confidence, cost } => {
                let extraction = StructuredExtraction {
                    thesis: format!("{} reading of {}", self.name, request.title),
                    keywords: self.keywords.clone(),
                    confidence: *confidence,
                    ..Default::default()
                };
                Ok(ProviderExtraction::new(extraction, *cost))
            }
            Script::Fail(error) => Err(error.clone()),
            Script::Hang => std::future::pending().await,
            Script::Panic => panic!("{} adapter exploded", self.name),
        }
    }
}

pub fn request() -> ExtractionRequest {
    ExtractionRequest::new("paper-1", "Sampling Bias in Survey Research", "Full text.")
}
