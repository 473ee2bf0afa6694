//! Output formatter trait

use council_domain::ConsensusResult;

/// Trait for formatting council results
pub trait OutputFormatter {
    /// Format the complete result
    fn format(&self, result: &ConsensusResult) -> String;

    /// Format as JSON
    fn format_json(&self, result: &ConsensusResult) -> String;

    /// Format headline and provider statuses only (concise output)
    fn format_summary(&self, result: &ConsensusResult) -> String;
}
