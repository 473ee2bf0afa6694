//! Turning raw model output into a validated extraction

use council_application::{ProviderError, ProviderExtraction};
use council_domain::{StructuredExtraction, TokenUsage};
use serde::{Deserialize, Serialize};

/// Per-million-token prices of a provider, in USD
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Pricing {
    pub input_per_mtok: f64,
    pub output_per_mtok: f64,
}

impl Pricing {
    pub fn new(input_per_mtok: f64, output_per_mtok: f64) -> Self {
        Self {
            input_per_mtok,
            output_per_mtok,
        }
    }

    pub fn cost(&self, usage: &TokenUsage) -> f64 {
        (usage.input_tokens as f64 * self.input_per_mtok
            + usage.output_tokens as f64 * self.output_per_mtok)
            / 1_000_000.0
    }
}

/// Parse model text into an extraction.
///
/// Accepts a bare JSON object, a fenced ```json block, or an object embedded
/// in surrounding prose. The result must pass schema validation.
pub fn parse_extraction(text: &str) -> Result<StructuredExtraction, ProviderError> {
    let json = extract_json_object(text).ok_or_else(|| {
        ProviderError::MalformedResponse("response contains no JSON object".to_string())
    })?;

    let extraction: StructuredExtraction = serde_json::from_str(json)
        .map_err(|e| ProviderError::MalformedResponse(format!("invalid extraction JSON: {}", e)))?;

    extraction
        .validate()
        .map_err(ProviderError::MalformedResponse)?;

    Ok(extraction)
}

/// Build the adapter output from model text and reported token usage.
pub fn build_output(
    text: &str,
    usage: Option<TokenUsage>,
    pricing: &Pricing,
) -> Result<ProviderExtraction, ProviderError> {
    let extraction = parse_extraction(text)?;
    let cost = usage.as_ref().map(|u| pricing.cost(u)).unwrap_or(0.0);
    let output = ProviderExtraction::new(extraction, cost);
    Ok(match usage {
        Some(usage) => output.with_usage(usage),
        None => output,
    })
}

fn extract_json_object(text: &str) -> Option<&str> {
    let text = strip_code_fence(text.trim());
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the info string (e.g. "json") on the opening fence line
    let body = rest.split_once('\n').map_or(rest, |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}
