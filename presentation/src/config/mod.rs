//! Presentation-level configuration
//!
//! Settles how a run is rendered from the command line and the file
//! configuration, in that order of precedence.

use polyllm_domain::OutputFormat;

/// Resolved output settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Colored terminal output
    pub color: bool,
    /// Spinners and per-turn status lines
    pub show_progress: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            color: true,
            show_progress: true,
        }
    }
}

impl OutputConfig {
    pub fn resolve(
        cli_format: Option<OutputFormat>,
        file_format: Option<OutputFormat>,
        color: bool,
        quiet: bool,
    ) -> Self {
        let format = cli_format.or(file_format).unwrap_or_default();
        Self {
            format,
            color,
            // JSON output must stay machine-readable on stdout.
            show_progress: !quiet && format != OutputFormat::Json,
        }
    }

    /// Apply the color choice process-wide.
    pub fn apply_color(&self) {
        if !self.color {
            colored::control::set_override(false);
        }
    }
}
