//! Output format value object

use serde::{Deserialize, Serialize};

/// How a finished run is rendered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Model results, every consensus section and the analytics report
    Full,
    /// Only the synthesis section and the analytics summary
    #[default]
    Synthesis,
    /// The enriched analytics as JSON
    Json,
}

impl OutputFormat {
    /// Whether per-model responses and intermediate sections are printed
    pub fn shows_progress_sections(&self) -> bool {
        matches!(self, OutputFormat::Full)
    }
}
