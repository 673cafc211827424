//! Consensus analytics.
//!
//! A classification payload flows through [`normalize::parse_classification`]
//! into the canonical [`raw::RawClassification`], then
//! [`engine::compute_metrics`] derives every score. Nothing here performs I/O.

pub mod engine;
pub mod enriched;
pub mod normalize;
pub mod profile;
pub mod raw;
pub mod theme;

pub use engine::compute_metrics;
pub use enriched::{
    AgreementLevel, CalculatedInsights, ConfidenceMetrics, ConsensusEvolution, ConsensusStrength,
    ConsensusType, EnrichedAnalytics, EnrichedTheme, MentionMetrics, ModelBehaviorAnalysis,
    ModelProfile, ModelRelationship, RelationshipType, StanceCounts, Summary,
};
pub use normalize::{ClassificationError, parse_classification};
pub use raw::{
    ConsensusFormation, Importance, Insights, MentionType, ModelBehavior, ModelPosition,
    RawClassification, RawTheme, Stance,
};

use serde_json::Value;

/// Validate, normalize and score a classification payload in one step.
pub fn analyze(value: &Value) -> Result<EnrichedAnalytics, ClassificationError> {
    parse_classification(value).map(|raw| compute_metrics(&raw))
}
