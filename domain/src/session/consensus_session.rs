//! Per-submission pipeline state

use crate::analytics::EnrichedAnalytics;
use crate::consensus::codename::CodenameMapping;
use crate::consensus::document::ConsensusDocument;
use crate::core::model::ModelDescriptor;
use crate::core::question::UserPrompt;
use crate::query::result::QueryResult;
use serde::Serialize;

/// How far a session has progressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStage {
    Created,
    Queried,
    ConsensusReady,
    Analyzed,
}

/// Everything one user submission produces, stage by stage.
///
/// The caller owns the session and hands it to each stage in turn. A new
/// submission starts from [`ConsensusSession::new`] or [`ConsensusSession::reset`];
/// nothing carries over between submissions.
#[derive(Debug, Clone, Serialize)]
pub struct ConsensusSession {
    prompt: UserPrompt,
    models: Vec<ModelDescriptor>,
    results: Vec<QueryResult>,
    consensus: Option<ConsensusDocument>,
    conversion_raw: Option<String>,
    analytics: Option<EnrichedAnalytics>,
}

impl ConsensusSession {
    pub fn new(prompt: UserPrompt, models: Vec<ModelDescriptor>) -> Self {
        Self {
            prompt,
            models,
            results: Vec::new(),
            consensus: None,
            conversion_raw: None,
            analytics: None,
        }
    }

    /// Discard every stage output and start over with a new submission.
    pub fn reset(&mut self, prompt: UserPrompt, models: Vec<ModelDescriptor>) {
        *self = Self::new(prompt, models);
    }

    pub fn prompt(&self) -> &UserPrompt {
        &self.prompt
    }

    pub fn models(&self) -> &[ModelDescriptor] {
        &self.models
    }

    pub fn stage(&self) -> SessionStage {
        if self.analytics.is_some() {
            SessionStage::Analyzed
        } else if self.consensus.as_ref().is_some_and(ConsensusDocument::is_complete) {
            SessionStage::ConsensusReady
        } else if !self.results.is_empty() {
            SessionStage::Queried
        } else {
            SessionStage::Created
        }
    }

    pub fn record_results(&mut self, results: Vec<QueryResult>) {
        self.results = results;
    }

    pub fn results(&self) -> &[QueryResult] {
        &self.results
    }

    pub fn successful_results(&self) -> Vec<QueryResult> {
        crate::query::result::successful(&self.results)
    }

    /// Store the consensus document, complete or partial.
    pub fn record_consensus(&mut self, document: ConsensusDocument) {
        self.consensus = Some(document);
    }

    pub fn consensus(&self) -> Option<&ConsensusDocument> {
        self.consensus.as_ref()
    }

    pub fn mapping(&self) -> Option<&CodenameMapping> {
        self.consensus.as_ref().map(ConsensusDocument::mapping)
    }

    pub fn record_conversion_raw(&mut self, raw: impl Into<String>) {
        self.conversion_raw = Some(raw.into());
    }

    /// Raw conversion-model output, kept for manual repair
    pub fn conversion_raw(&self) -> Option<&str> {
        self.conversion_raw.as_deref()
    }

    pub fn record_analytics(&mut self, analytics: EnrichedAnalytics) {
        self.analytics = Some(analytics);
    }

    pub fn analytics(&self) -> Option<&EnrichedAnalytics> {
        self.analytics.as_ref()
    }
}
