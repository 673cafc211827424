//! Progress reporting for the parallel model query

use crate::output::console::ConsoleFormatter;
use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use polyllm_application::QueryProgressNotifier;
use polyllm_domain::{ModelDescriptor, QueryResult};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// One spinner per model while the fan-out is in flight
pub struct ProgressReporter {
    multi: MultiProgress,
    bars: Mutex<HashMap<usize, ProgressBar>>,
    /// Print each answer above the spinners as it arrives
    show_responses: bool,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            bars: Mutex::new(HashMap::new()),
            show_responses: false,
        }
    }

    pub fn with_responses(mut self, show: bool) -> Self {
        self.show_responses = show;
        self
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold} {msg} {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn status(result: &QueryResult) -> String {
        if result.is_success() {
            format!("{} {} chars", "v".green(), result.response.chars().count())
        } else {
            format!(
                "{} {}",
                "x".red(),
                result.error_message().unwrap_or("failed")
            )
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryProgressNotifier for ProgressReporter {
    fn on_start(&self, index: usize, model: &ModelDescriptor) {
        let pb = self.multi.add(ProgressBar::new_spinner());
        pb.set_style(Self::spinner_style());
        pb.set_prefix(model.display_name.clone());
        pb.set_message("waiting...");
        pb.enable_steady_tick(Duration::from_millis(100));

        if let Ok(mut bars) = self.bars.lock() {
            bars.insert(index, pb);
        }
    }

    fn on_stop(&self, index: usize, _model: &ModelDescriptor) {
        if let Ok(bars) = self.bars.lock()
            && let Some(pb) = bars.get(&index)
        {
            pb.disable_steady_tick();
        }
    }

    fn on_response(&self, index: usize, result: &QueryResult) {
        let pb = self.bars.lock().ok().and_then(|mut bars| bars.remove(&index));
        if let Some(pb) = pb {
            pb.finish_with_message(Self::status(result));
        }
        if self.show_responses {
            let _ = self.multi.println(ConsoleFormatter::format_result(result));
        }
    }
}

/// Plain output without spinners: each answer is printed as it arrives
pub struct SimpleProgress;

impl QueryProgressNotifier for SimpleProgress {
    fn on_start(&self, _index: usize, _model: &ModelDescriptor) {}

    fn on_stop(&self, _index: usize, _model: &ModelDescriptor) {}

    fn on_response(&self, _index: usize, result: &QueryResult) {
        println!("{}", ConsoleFormatter::format_result(result));
    }
}
