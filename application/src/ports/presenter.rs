//! Consensus presentation port
//!
//! One-way notifications from the core to whatever renders results. The
//! core never reads anything back.

use polyllm_domain::{CodenameMapping, ConsensusSection, EnrichedAnalytics, SectionResult};

pub trait ConsensusPresenter: Send + Sync {
    /// A consensus turn is about to be sent
    fn on_turn_start(&self, _section: ConsensusSection) {}

    /// A section finished. `section.display` already has real names.
    fn on_section(&self, section: &SectionResult, mapping: &CodenameMapping);

    /// Analytics are ready for the given user prompt
    fn on_analytics(&self, analytics: &EnrichedAnalytics, prompt: &str);
}

/// Presenter that drops every notification
pub struct NoPresenter;

impl ConsensusPresenter for NoPresenter {
    fn on_section(&self, _section: &SectionResult, _mapping: &CodenameMapping) {}
    fn on_analytics(&self, _analytics: &EnrichedAnalytics, _prompt: &str) {}
}
