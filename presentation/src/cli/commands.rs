//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for council results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Full report with the consensus and every provider response
    Full,
    /// Consensus headline and per-provider status lines
    Summary,
    /// The complete result as JSON
    Json,
}

impl From<council_domain::OutputFormat> for OutputFormat {
    fn from(format: council_domain::OutputFormat) -> Self {
        match format {
            council_domain::OutputFormat::Full => OutputFormat::Full,
            council_domain::OutputFormat::Summary => OutputFormat::Summary,
            council_domain::OutputFormat::Json => OutputFormat::Json,
        }
    }
}

impl From<OutputFormat> for council_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Full => council_domain::OutputFormat::Full,
            OutputFormat::Summary => council_domain::OutputFormat::Summary,
            OutputFormat::Json => council_domain::OutputFormat::Json,
        }
    }
}

/// CLI arguments for paper-council
#[derive(Parser, Debug)]
#[command(name = "paper-council")]
#[command(
    author,
    version,
    about = "Paper Council - Multiple LLMs extract a paper and merge their answers"
)]
#[command(long_about = r#"
Paper Council sends the same extraction request to several LLM providers,
waits for all of them (or the round deadline), and merges the successful
answers into one consensus extraction with a weighted confidence.

The request is a JSON file with paper_id, title, authors, year, item_type
and text. Use "-" to read it from stdin.

Configuration files are loaded from (in priority order):
1. --config <path>      Explicit config file
2. ./council.toml       Project-level config
3. ~/.config/paper-council/config.toml   Global config
4. PAPER_COUNCIL_* environment variables

Exit status: 0 on success, 2 when the round misses its quorum, 1 on errors.

Example:
  paper-council paper.json
  paper-council -p openai -p claude --min-responses 2 paper.json
  cat paper.json | paper-council --output json -
"#)]
pub struct Cli {
    /// Extraction request JSON file, or "-" for stdin
    #[arg(value_name = "REQUEST", required_unless_present = "show_config")]
    pub request: Option<PathBuf>,

    /// Restrict the round to these providers (can be specified multiple times)
    #[arg(short, long, value_name = "NAME")]
    pub provider: Vec<String>,

    /// Call providers one at a time instead of concurrently
    #[arg(long)]
    pub sequential: bool,

    /// Override the quorum threshold
    #[arg(long, value_name = "N")]
    pub min_responses: Option<usize>,

    /// Fail instead of falling back to a single response below quorum
    #[arg(long)]
    pub no_fallback: bool,

    /// Output format (defaults to [output].format, then summary)
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Write diagnostic logs to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

impl Cli {
    /// Whether the request should be read from stdin
    pub fn reads_stdin(&self) -> bool {
        self.request
            .as_deref()
            .is_some_and(|path| path.as_os_str() == "-")
    }
}
