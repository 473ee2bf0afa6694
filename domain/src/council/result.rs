//! Result of a council round and the quorum decision that produces it.

use super::config::CouncilConfig;
use super::response::ProviderResponse;
use crate::consensus::ConsensusBuilder;
use crate::extraction::StructuredExtraction;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a round produced no usable extraction
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum CouncilFailure {
    #[error("Insufficient responses: {received} of {required} required providers succeeded")]
    InsufficientResponses { required: usize, received: usize },
}

/// How the consensus extraction was obtained
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConsensusKind {
    /// Quorum met; responses of these providers were merged
    Merged { contributors: Vec<String> },
    /// Quorum missed; one provider's response is passed through verbatim
    Fallback { provider: String },
    /// No usable extraction
    Failed,
}

/// Outcome of one council round (Value Object)
///
/// Callers must branch on [`ConsensusResult::success`]. The audit trail in
/// `provider_responses` is always complete, one entry per configured
/// provider in configuration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusResult {
    pub paper_id: String,
    pub success: bool,
    pub kind: ConsensusKind,
    /// Merged extraction; empty when the round failed
    pub consensus: StructuredExtraction,
    pub consensus_confidence: f64,
    pub provider_responses: Vec<ProviderResponse>,
    /// Sum of the costs of successful responses
    pub total_cost: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<CouncilFailure>,
}

impl ConsensusResult {
    /// Apply the quorum check and build the result of a round.
    ///
    /// Pure function of its inputs: the same responses and configuration
    /// always yield an identical result.
    ///
    /// - successes >= `min_responses`: merged consensus
    /// - fewer, fallback enabled, at least one success: the highest-weighted
    ///   success (earliest on ties) is returned verbatim
    /// - otherwise: failure with [`CouncilFailure::InsufficientResponses`]
    pub fn assemble(
        paper_id: impl Into<String>,
        responses: Vec<ProviderResponse>,
        config: &CouncilConfig,
    ) -> Self {
        let paper_id = paper_id.into();
        let total_cost = total_cost(&responses);
        let builder = ConsensusBuilder::new(config);
        let successes = responses.iter().filter(|r| r.is_success()).count();

        if successes >= config.min_responses()
            && let Some(merged) = builder.build(&responses)
        {
            return Self {
                paper_id,
                success: true,
                kind: ConsensusKind::Merged {
                    contributors: merged.contributors,
                },
                consensus: merged.extraction,
                consensus_confidence: merged.confidence,
                provider_responses: responses,
                total_cost,
                failure_reason: None,
            };
        }

        if config.fallback_to_single() {
            let best = builder
                .contributions(&responses)
                .into_iter()
                .reduce(|best, c| if c.outranks(&best) { c } else { best })
                .map(|c| (c.provider.to_string(), c.extraction.clone(), c.confidence));

            if let Some((provider, extraction, confidence)) = best {
                return Self {
                    paper_id,
                    success: true,
                    kind: ConsensusKind::Fallback { provider },
                    consensus: extraction,
                    consensus_confidence: confidence,
                    provider_responses: responses,
                    total_cost,
                    failure_reason: None,
                };
            }
        }

        Self {
            paper_id,
            success: false,
            kind: ConsensusKind::Failed,
            consensus: StructuredExtraction::default(),
            consensus_confidence: 0.0,
            provider_responses: responses,
            total_cost,
            failure_reason: Some(CouncilFailure::InsufficientResponses {
                required: config.min_responses(),
                received: successes,
            }),
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self.kind, ConsensusKind::Fallback { .. })
    }

    pub fn success_count(&self) -> usize {
        self.provider_responses
            .iter()
            .filter(|r| r.is_success())
            .count()
    }
}

/// Costs are summed in configuration order so the float result is stable.
fn total_cost(responses: &[ProviderResponse]) -> f64 {
    responses
        .iter()
        .filter(|r| r.is_success())
        .map(|r| r.cost())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::council::{ProviderConfig, ProviderErrorKind};
    use std::time::Duration;

    fn config(min_responses: usize, fallback: bool) -> CouncilConfig {
        CouncilConfig::builder()
            .provider(ProviderConfig::new("openai").with_weight(2.0))
            .provider(ProviderConfig::new("anthropic"))
            .provider(ProviderConfig::new("ollama"))
            .min_responses(min_responses)
            .fallback_to_single(fallback)
            .build()
            .unwrap()
    }

    fn extraction(thesis: &str, confidence: f64, keywords: &[&str]) -> StructuredExtraction {
        StructuredExtraction {
            thesis: thesis.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            confidence,
            ..Default::default()
        }
    }

    fn success(provider: &str, confidence: f64, cost: f64) -> ProviderResponse {
        ProviderResponse::success(
            provider,
            extraction(&format!("Thesis by {}", provider), confidence, &["Bias"]),
            confidence,
            cost,
            Duration::from_millis(100),
        )
    }

    fn failure(provider: &str) -> ProviderResponse {
        ProviderResponse::failure(
            provider,
            ProviderErrorKind::NetworkError,
            "connection reset",
            Duration::from_millis(3),
        )
    }

    #[test]
    fn test_total_cost_excludes_failures() {
        let responses = vec![
            failure("openai"),
            success("anthropic", 0.7, 0.02),
            success("ollama", 0.5, 0.05),
        ];
        let result = ConsensusResult::assemble("p1", responses, &config(2, false));

        assert!(result.success);
        assert!((result.total_cost - 0.07).abs() < 1e-12);
        assert_eq!(result.provider_responses.len(), 3);
    }

    #[test]
    fn test_merged_when_quorum_met() {
        let responses = vec![
            success("openai", 0.9, 0.01),
            success("anthropic", 0.6, 0.01),
            failure("ollama"),
        ];
        let result = ConsensusResult::assemble("p1", responses, &config(2, false));

        assert!(result.success);
        assert!(!result.is_fallback());
        assert_eq!(
            result.kind,
            ConsensusKind::Merged {
                contributors: vec!["openai".to_string(), "anthropic".to_string()]
            }
        );
        assert!((result.consensus_confidence - 0.8).abs() < 1e-9);
        assert!(result.failure_reason.is_none());
    }

    #[test]
    fn test_insufficient_without_fallback() {
        let responses = vec![
            success("openai", 0.9, 0.01),
            failure("anthropic"),
            ProviderResponse::timeout("ollama", Duration::from_secs(5)),
        ];
        let result = ConsensusResult::assemble("p1", responses, &config(2, false));

        assert!(!result.success);
        assert_eq!(result.kind, ConsensusKind::Failed);
        assert_eq!(
            result.failure_reason,
            Some(CouncilFailure::InsufficientResponses {
                required: 2,
                received: 1
            })
        );
        assert_eq!(result.consensus, StructuredExtraction::default());
        assert_eq!(result.consensus_confidence, 0.0);
        assert!((result.total_cost - 0.01).abs() < 1e-12);
        assert_eq!(result.provider_responses.len(), 3);
    }

    #[test]
    fn test_fallback_is_verbatim() {
        let raw = extraction("  Raw thesis  ", 0.35, &["Bias", "bias", "Scope"]);
        let responses = vec![
            failure("openai"),
            ProviderResponse::success("anthropic", raw.clone(), 0.42, 0.03, Duration::from_millis(9)),
            ProviderResponse::timeout("ollama", Duration::from_secs(5)),
        ];
        let result = ConsensusResult::assemble("p1", responses, &config(2, true));

        assert!(result.success);
        assert!(result.is_fallback());
        assert_eq!(
            result.kind,
            ConsensusKind::Fallback {
                provider: "anthropic".to_string()
            }
        );
        // No dedup, no trimming, response confidence copied as-is
        assert_eq!(result.consensus, raw);
        assert_eq!(result.consensus_confidence, 0.42);
        assert!(result.failure_reason.is_none());
    }

    #[test]
    fn test_fallback_prefers_highest_weight() {
        let responses = vec![
            success("openai", 0.5, 0.0),
            failure("anthropic"),
            success("ollama", 0.9, 0.0),
        ];
        let result = ConsensusResult::assemble("p1", responses, &config(3, true));

        assert_eq!(
            result.kind,
            ConsensusKind::Fallback {
                provider: "openai".to_string()
            }
        );
    }

    #[test]
    fn test_fallback_impossible_without_successes() {
        let responses = vec![
            failure("openai"),
            failure("anthropic"),
            ProviderResponse::timeout("ollama", Duration::from_secs(5)),
        ];
        let result = ConsensusResult::assemble("p1", responses, &config(2, true));

        assert!(!result.success);
        assert_eq!(
            result.failure_reason,
            Some(CouncilFailure::InsufficientResponses {
                required: 2,
                received: 0
            })
        );
        assert_eq!(result.total_cost, 0.0);
    }

    #[test]
    fn test_assemble_is_deterministic() {
        let responses = vec![
            success("openai", 0.9, 0.013),
            success("anthropic", 0.6, 0.021),
            ProviderResponse::success(
                "ollama",
                extraction("Another thesis of equal len", 0.3, &["SCOPE", "bias"]),
                0.3,
                0.0,
                Duration::from_millis(7),
            ),
        ];
        let config = config(2, true);

        let first = ConsensusResult::assemble("p1", responses.clone(), &config);
        let second = ConsensusResult::assemble("p1", responses, &config);

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_failure_reason_serialized_only_on_failure() {
        let responses = vec![
            success("openai", 0.9, 0.0),
            success("anthropic", 0.9, 0.0),
            failure("ollama"),
        ];
        let ok = ConsensusResult::assemble("p1", responses, &config(2, false));
        let value = serde_json::to_value(&ok).unwrap();
        assert!(value.get("failure_reason").is_none());
        assert_eq!(value["kind"]["kind"], "merged");

        let responses = vec![failure("openai"), failure("anthropic"), failure("ollama")];
        let failed = ConsensusResult::assemble("p1", responses, &config(2, false));
        let value = serde_json::to_value(&failed).unwrap();
        assert_eq!(value["failure_reason"]["reason"], "insufficient_responses");
        assert_eq!(value["success"], false);
    }
}
