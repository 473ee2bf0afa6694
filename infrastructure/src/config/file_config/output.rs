//! `[output]` section: how round results are printed

use council_domain::OutputFormat;
use serde::{Deserialize, Serialize};

pub use council_domain::OutputFormat as FileOutputFormat;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    /// Unset means the command line decides, falling back to summary
    pub format: Option<OutputFormat>,
    /// ANSI colors in the full and summary reports
    pub color: bool,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            format: None,
            color: true,
        }
    }
}

impl FileOutputConfig {
    /// Format to print with; an explicit choice overrides the file.
    pub fn resolve_format(&self, explicit: Option<OutputFormat>) -> OutputFormat {
        explicit.or(self.format).unwrap_or_default()
    }
}
