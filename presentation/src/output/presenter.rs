//! Console implementation of the consensus presenter port

use crate::config::OutputConfig;
use crate::output::console::ConsoleFormatter;
use indicatif::{ProgressBar, ProgressStyle};
use polyllm_application::ConsensusPresenter;
use polyllm_domain::{
    CodenameMapping, ConsensusSection, EnrichedAnalytics, OutputFormat, SectionResult,
};
use std::sync::Mutex;
use std::time::Duration;

/// Prints sections and analytics as the pipeline produces them.
///
/// What gets printed depends on the output format: `full` shows every
/// section and the complete report, `synthesis` only the final section and
/// the summary, `json` nothing but the analytics document.
pub struct ConsolePresenter {
    config: OutputConfig,
    turn_spinner: Mutex<Option<ProgressBar>>,
}

impl ConsolePresenter {
    pub fn new(config: OutputConfig) -> Self {
        Self {
            config,
            turn_spinner: Mutex::new(None),
        }
    }

    fn shows_section(&self, section: ConsensusSection) -> bool {
        match self.config.format {
            OutputFormat::Full => true,
            OutputFormat::Synthesis => section == ConsensusSection::Synthesis,
            OutputFormat::Json => false,
        }
    }

    /// Text printed for a finished section, if any
    pub fn render_section(&self, section: &SectionResult) -> Option<String> {
        self.shows_section(section.section)
            .then(|| ConsoleFormatter::format_section(section))
    }

    /// Text printed once analytics are ready
    pub fn render_analytics(&self, analytics: &EnrichedAnalytics, prompt: &str) -> String {
        match self.config.format {
            OutputFormat::Full => ConsoleFormatter::format_analytics(analytics, prompt),
            OutputFormat::Synthesis => ConsoleFormatter::format_analytics_summary(analytics),
            OutputFormat::Json => ConsoleFormatter::format_analytics_json(analytics),
        }
    }

    fn finish_spinner(&self) {
        let spinner = self.turn_spinner.lock().ok().and_then(|mut s| s.take());
        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }
    }
}

impl ConsensusPresenter for ConsolePresenter {
    fn on_turn_start(&self, section: ConsensusSection) {
        if !self.config.show_progress {
            return;
        }
        self.finish_spinner();

        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message(ConsoleFormatter::format_turn_start(section));
        spinner.enable_steady_tick(Duration::from_millis(100));
        if let Ok(mut slot) = self.turn_spinner.lock() {
            *slot = Some(spinner);
        }
    }

    fn on_section(&self, section: &SectionResult, _mapping: &CodenameMapping) {
        self.finish_spinner();
        if let Some(text) = self.render_section(section) {
            println!("{}", text);
        }
    }

    fn on_analytics(&self, analytics: &EnrichedAnalytics, prompt: &str) {
        self.finish_spinner();
        println!("{}", self.render_analytics(analytics, prompt));
    }
}
