//! Progress reporting for council rounds

use colored::Colorize;
use council_application::ports::progress::CouncilProgressNotifier;
use council_domain::{ConsensusKind, ConsensusResult, ProviderResponse};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::Mutex;

/// Reports progress during a council round with a progress bar
///
/// Drawn on stderr so that stdout only carries the formatted result.
pub struct ProgressReporter {
    multi: MultiProgress,
    round_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            round_bar: Mutex::new(None),
        }
    }

    fn round_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn provider_status(response: &ProviderResponse) -> String {
        if response.is_success() {
            format!("{} {}", "v".green(), response.provider)
        } else {
            format!(
                "{} {} ({})",
                "x".red(),
                response.provider,
                response.status_label()
            )
        }
    }

    fn round_summary(result: &ConsensusResult) -> String {
        match &result.kind {
            ConsensusKind::Merged { contributors } => {
                format!("{} ({} merged)", "consensus".green(), contributors.len())
            }
            ConsensusKind::Fallback { provider } => {
                format!("{} to {}", "fallback".yellow(), provider)
            }
            ConsensusKind::Failed => "failed".red().to_string(),
        }
    }

    #[cfg(test)]
    fn hidden() -> Self {
        Self {
            multi: MultiProgress::with_draw_target(indicatif::ProgressDrawTarget::hidden()),
            round_bar: Mutex::new(None),
        }
    }

    #[cfg(test)]
    fn position(&self) -> Option<u64> {
        self.round_bar
            .lock()
            .ok()
            .and_then(|bar| bar.as_ref().map(ProgressBar::position))
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl CouncilProgressNotifier for ProgressReporter {
    fn on_round_start(&self, paper_id: &str, total_providers: usize) {
        let pb = self.multi.add(ProgressBar::new(total_providers as u64));
        pb.set_style(Self::round_style());
        pb.set_prefix(paper_id.to_string());
        pb.set_message("Querying providers...");

        if let Ok(mut bar) = self.round_bar.lock() {
            *bar = Some(pb);
        }
    }

    fn on_provider_complete(&self, response: &ProviderResponse) {
        if let Ok(bar) = self.round_bar.lock()
            && let Some(pb) = bar.as_ref()
        {
            pb.set_message(Self::provider_status(response));
            pb.inc(1);
        }
    }

    fn on_round_complete(&self, result: &ConsensusResult) {
        if let Ok(mut bar) = self.round_bar.lock()
            && let Some(pb) = bar.take()
        {
            pb.finish_with_message(Self::round_summary(result));
        }
    }
}

/// Simple line-based progress (no progress bar)
pub struct SimpleProgress;

impl CouncilProgressNotifier for SimpleProgress {
    fn on_round_start(&self, paper_id: &str, total_providers: usize) {
        eprintln!(
            "{} {} ({} providers)",
            "->".cyan(),
            paper_id.bold(),
            total_providers
        );
    }

    fn on_provider_complete(&self, response: &ProviderResponse) {
        if response.is_success() {
            eprintln!("  {} {}", "v".green(), response.provider);
        } else {
            eprintln!(
                "  {} {} ({})",
                "x".red(),
                response.provider,
                response.status_label()
            );
        }
    }

    fn on_round_complete(&self, result: &ConsensusResult) {
        eprintln!("  {}", ProgressReporter::round_summary(result));
    }
}
