//! Consensus builder: merges successful provider responses into one
//! [`StructuredExtraction`].

use super::merge::{
    Contribution, longest_text, union_keyed, union_set, weighted_confidence,
};
use crate::council::{CouncilConfig, DEFAULT_WEIGHT, ProviderOutcome, ProviderResponse};
use crate::extraction::{Methodology, StructuredExtraction};

/// Output of a successful merge
#[derive(Debug, Clone, PartialEq)]
pub struct MergedExtraction {
    pub extraction: StructuredExtraction,
    /// Weighted mean of the contributors' self-reported confidences
    pub confidence: f64,
    /// Providers whose responses were merged, in configuration order
    pub contributors: Vec<String>,
}

/// Merges the successful responses of a round using the configured
/// provider weights.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use council_domain::consensus::ConsensusBuilder;
/// use council_domain::council::{CouncilConfig, ProviderConfig, ProviderResponse};
/// use council_domain::extraction::StructuredExtraction;
///
/// let config = CouncilConfig::builder()
///     .provider(ProviderConfig::new("a").with_weight(2.0))
///     .provider(ProviderConfig::new("b"))
///     .build()
///     .unwrap();
///
/// let extraction = |confidence| StructuredExtraction {
///     thesis: "Thesis".to_string(),
///     confidence,
///     ..Default::default()
/// };
/// let responses = vec![
///     ProviderResponse::success("a", extraction(0.9), 0.9, 0.0, Duration::ZERO),
///     ProviderResponse::success("b", extraction(0.6), 0.6, 0.0, Duration::ZERO),
/// ];
///
/// let merged = ConsensusBuilder::new(&config).build(&responses).unwrap();
/// assert!((merged.confidence - 0.8).abs() < 1e-9);
/// ```
pub struct ConsensusBuilder<'c> {
    config: &'c CouncilConfig,
}

impl<'c> ConsensusBuilder<'c> {
    pub fn new(config: &'c CouncilConfig) -> Self {
        Self { config }
    }

    /// Successful responses paired with their weight and configuration
    /// position, sorted into configuration order.
    ///
    /// Responses from providers missing in the configuration get the default
    /// weight and rank after every configured provider.
    pub fn contributions<'r>(&self, responses: &'r [ProviderResponse]) -> Vec<Contribution<'r>> {
        let providers = self.config.providers();

        let mut contributions: Vec<Contribution<'r>> = responses
            .iter()
            .enumerate()
            .filter_map(|(index, response)| {
                let ProviderOutcome::Success {
                    extraction,
                    confidence,
                    ..
                } = &response.outcome
                else {
                    return None;
                };

                let (order, weight) = providers
                    .iter()
                    .position(|p| p.name == response.provider)
                    .map(|position| (position, providers[position].weight))
                    .unwrap_or((providers.len() + index, DEFAULT_WEIGHT));

                Some(Contribution {
                    provider: response.provider.as_str(),
                    weight,
                    order,
                    confidence: *confidence,
                    extraction,
                })
            })
            .collect();

        contributions.sort_by_key(|c| c.order);
        contributions
    }

    /// Merge every successful response.
    ///
    /// Returns `None` when there is no successful response to merge.
    pub fn build(&self, responses: &[ProviderResponse]) -> Option<MergedExtraction> {
        let contributions = self.contributions(responses);
        if contributions.is_empty() {
            return None;
        }

        let confidence = weighted_confidence(&contributions);
        let extraction = merge_extraction(&contributions, confidence);

        Some(MergedExtraction {
            extraction,
            confidence,
            contributors: contributions
                .iter()
                .map(|c| c.provider.to_string())
                .collect(),
        })
    }
}

fn merge_extraction(contributions: &[Contribution<'_>], confidence: f64) -> StructuredExtraction {
    StructuredExtraction {
        thesis: longest_text(contributions, |e| e.thesis.as_str()),
        research_questions: union_keyed(contributions, |e| e.research_questions.as_slice()),
        methodology: merge_methodology(contributions),
        key_findings: union_keyed(contributions, |e| e.key_findings.as_slice()),
        key_claims: union_keyed(contributions, |e| e.key_claims.as_slice()),
        conclusions: longest_text(contributions, |e| e.conclusions.as_str()),
        limitations: union_set(contributions, |e| e.limitations.as_slice()),
        future_directions: union_set(contributions, |e| e.future_directions.as_slice()),
        keywords: union_set(contributions, |e| e.keywords.as_slice()),
        discipline_tags: union_set(contributions, |e| e.discipline_tags.as_slice()),
        confidence,
    }
}

fn merge_methodology(contributions: &[Contribution<'_>]) -> Methodology {
    Methodology {
        approach: longest_text(contributions, |e| e.methodology.approach.as_str()),
        data_sources: union_set(contributions, |e| e.methodology.data_sources.as_slice()),
        analysis_methods: union_set(contributions, |e| {
            e.methodology.analysis_methods.as_slice()
        }),
    }
}
