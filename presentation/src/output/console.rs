//! Console output formatter for council results

use crate::output::formatter::OutputFormatter;
use colored::Colorize;
use council_domain::{
    ConsensusKind, ConsensusResult, ProviderOutcome, ProviderResponse, StructuredExtraction,
};

/// Formats council results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete council result
    pub fn format(result: &ConsensusResult) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Paper Council Results"));
        output.push('\n');

        output.push_str(&format!(
            "{} {}\n",
            "Paper:".cyan().bold(),
            result.paper_id
        ));
        output.push_str(&format!(
            "{} {}\n\n",
            "Outcome:".cyan().bold(),
            Self::outcome(result)
        ));

        if result.success {
            output.push_str(&Self::section_header("Consensus Extraction"));
            output.push_str(&Self::extraction(&result.consensus));
        }

        output.push_str(&Self::section_header("Provider Responses"));
        for response in &result.provider_responses {
            output.push_str(&Self::status_line(response));
            output.push('\n');
        }

        output.push_str(&format!(
            "\n{} {:.2}    {} ${:.4}\n",
            "Confidence:".cyan().bold(),
            result.consensus_confidence,
            "Total cost:".cyan().bold(),
            result.total_cost
        ));

        output.push_str(&Self::footer());
        output
    }

    /// Format as JSON
    pub fn format_json(result: &ConsensusResult) -> String {
        serde_json::to_string_pretty(result).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format the headline, thesis and provider statuses
    pub fn format_summary(result: &ConsensusResult) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{}\n\n",
            format!("=== {} ===", result.paper_id).cyan().bold()
        ));
        output.push_str(&format!("{}\n", Self::outcome(result)));
        output.push_str(&format!(
            "{} {:.2}  {} ${:.4}\n\n",
            "confidence".dimmed(),
            result.consensus_confidence,
            "cost".dimmed(),
            result.total_cost
        ));

        for response in &result.provider_responses {
            output.push_str(&Self::status_line(response));
            output.push('\n');
        }

        if result.success && !result.consensus.thesis.is_empty() {
            output.push_str(&format!(
                "\n{} {}\n",
                "Thesis:".bold(),
                result.consensus.thesis
            ));
        }

        output
    }

    fn outcome(result: &ConsensusResult) -> String {
        match (&result.kind, &result.failure_reason) {
            (ConsensusKind::Merged { contributors }, _) => format!(
                "{} from {}",
                "Consensus".green().bold(),
                contributors.join(", ")
            ),
            (ConsensusKind::Fallback { provider }, _) => format!(
                "{} to {} (quorum not met)",
                "Fallback".yellow().bold(),
                provider
            ),
            (ConsensusKind::Failed, Some(reason)) => {
                format!("{}: {}", "FAILED".red().bold(), reason)
            }
            (ConsensusKind::Failed, None) => "FAILED".red().bold().to_string(),
        }
    }

    fn status_line(response: &ProviderResponse) -> String {
        let elapsed = format!("{:>7.2}s", response.elapsed().as_secs_f64());
        match &response.outcome {
            ProviderOutcome::Success {
                confidence, cost, ..
            } => format!(
                "  {} {:<12} {:<18} {}  conf {:.2}  ${:.4}",
                "v".green(),
                response.provider,
                response.status_label(),
                elapsed,
                confidence,
                cost
            ),
            ProviderOutcome::Failure { message, .. } => format!(
                "  {} {:<12} {:<18} {}  {}",
                "x".red(),
                response.provider,
                response.status_label(),
                elapsed,
                message.dimmed()
            ),
            ProviderOutcome::Timeout { .. } => format!(
                "  {} {:<12} {:<18} {}",
                "x".yellow(),
                response.provider,
                response.status_label(),
                elapsed
            ),
        }
    }

    fn extraction(extraction: &StructuredExtraction) -> String {
        let mut output = String::new();

        output.push_str(&Self::field("Thesis", &extraction.thesis));
        output.push_str(&Self::list("Research questions", &extraction.research_questions));

        let methodology = &extraction.methodology;
        if !methodology.is_empty() {
            output.push_str(&format!("\n{}\n", "Methodology:".cyan().bold()));
            if !methodology.approach.is_empty() {
                output.push_str(&format!("{}\n", Self::indent(&methodology.approach, "  ")));
            }
            if !methodology.data_sources.is_empty() {
                output.push_str(&format!(
                    "  {} {}\n",
                    "data:".dimmed(),
                    methodology.data_sources.join(", ")
                ));
            }
            if !methodology.analysis_methods.is_empty() {
                output.push_str(&format!(
                    "  {} {}\n",
                    "analysis:".dimmed(),
                    methodology.analysis_methods.join(", ")
                ));
            }
        }

        let findings: Vec<String> = extraction
            .key_findings
            .iter()
            .map(|f| match &f.evidence_type {
                Some(evidence) => format!("{} [{}]", f.finding, evidence),
                None => f.finding.clone(),
            })
            .collect();
        output.push_str(&Self::list("Key findings", &findings));

        let claims: Vec<String> = extraction
            .key_claims
            .iter()
            .map(|c| match &c.support {
                Some(support) => format!("{} (support: {})", c.claim, support),
                None => c.claim.clone(),
            })
            .collect();
        output.push_str(&Self::list("Key claims", &claims));

        output.push_str(&Self::field("Conclusions", &extraction.conclusions));
        output.push_str(&Self::list("Limitations", &extraction.limitations));
        output.push_str(&Self::list("Future directions", &extraction.future_directions));

        if !extraction.keywords.is_empty() {
            output.push_str(&format!(
                "\n{} {}\n",
                "Keywords:".cyan().bold(),
                extraction.keywords.join(", ")
            ));
        }
        if !extraction.discipline_tags.is_empty() {
            output.push_str(&format!(
                "{} {}\n",
                "Disciplines:".cyan().bold(),
                extraction.discipline_tags.join(", ")
            ));
        }

        output
    }

    fn field(label: &str, value: &str) -> String {
        if value.is_empty() {
            return String::new();
        }
        format!(
            "\n{}\n{}\n",
            format!("{}:", label).cyan().bold(),
            Self::indent(value, "  ")
        )
    }

    fn list(label: &str, items: &[String]) -> String {
        if items.is_empty() {
            return String::new();
        }
        let mut output = format!("\n{}\n", format!("{}:", label).cyan().bold());
        for item in items {
            output.push_str(&format!("  * {}\n", item));
        }
        output
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format(&self, result: &ConsensusResult) -> String {
        Self::format(result)
    }

    fn format_json(&self, result: &ConsensusResult) -> String {
        Self::format_json(result)
    }

    fn format_summary(&self, result: &ConsensusResult) -> String {
        Self::format_summary(result)
    }
}
