//! Output format value object

use serde::{Deserialize, Serialize};

/// Output format for council results
///
/// Shared by the configuration file and the command line, so it lives with
/// the other cross-layer value objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Full report with the consensus and every provider response
    Full,
    /// Consensus headline and per-provider status lines (default)
    #[default]
    Summary,
    /// The complete result as JSON
    Json,
}
