//! Scored analytics produced by the metrics engine

use super::raw::{Insights, ModelBehavior, RawTheme};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Voting pattern of a theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsensusType {
    Unanimous,
    Majority,
    Split,
    Single,
    None,
}

/// Strength of agreement among the models that mentioned a theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgreementLevel {
    Unanimous,
    Strong,
    Moderate,
    Weak,
    Single,
}

/// Raw stance tallies for one theme
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StanceCounts {
    pub agree_count: usize,
    pub disagree_count: usize,
    pub neutral_count: usize,
    pub not_mentioned_count: usize,
    pub mentioned_count: usize,
    pub total_models: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MentionMetrics {
    pub direct: usize,
    pub indirect: usize,
    pub omitted: usize,
    pub coverage_score: u32,
    pub clarity_score: u32,
    pub coverage_label: String,
}

/// A raw theme plus every derived field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedTheme {
    #[serde(flatten)]
    pub theme: RawTheme,
    pub consensus_type: ConsensusType,
    pub agreement_level: AgreementLevel,
    pub consensus_strength_score: u32,
    pub controversy_score: u32,
    pub impact_score: u32,
    pub supporting_outputs: Vec<String>,
    pub mention_metrics: MentionMetrics,
    pub metrics: StanceCounts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsensusStrength {
    Strong,
    Moderate,
    Weak,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_themes: usize,
    pub consensus_strength: ConsensusStrength,
    pub consensus_score: u32,
    pub controversy_count: usize,
    pub participation_rate: u32,
    pub reliability_index: u32,
    pub total_models: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceMetrics {
    pub unanimous_themes: usize,
    pub majority_themes: usize,
    pub split_themes: usize,
    pub single_voice_themes: usize,
    pub overall_agreement_rate: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MentionStyle {
    Explicit,
    Balanced,
    Implicit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MentionPatterns {
    pub direct: usize,
    pub indirect: usize,
    pub omitted: usize,
    pub directness_score: u32,
    pub mention_style: MentionStyle,
}

/// Aggregated behavior of one model across all themes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelProfile {
    pub agreement_score: u32,
    pub divergence_score: u32,
    pub trust_score: u32,
    pub coverage_score: u32,
    pub unique_contributions: usize,
    pub response_style: String,
    pub signature_moves: Vec<String>,
    pub mention_patterns: MentionPatterns,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipType {
    Aligned,
    Complementary,
    Independent,
    Opposing,
}

/// Stance agreement between two models over themes both addressed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelRelationship {
    pub model_a: String,
    pub model_b: String,
    pub agreement_percentage: u32,
    pub relationship_type: RelationshipType,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelBehaviorAnalysis {
    pub most_agreeable: Vec<String>,
    pub most_divergent: Vec<String>,
    pub coverage_by_model: BTreeMap<String, u32>,
    pub model_profiles: BTreeMap<String, ModelProfile>,
    pub model_relationships: Vec<ModelRelationship>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsensusEvolution {
    pub pattern: String,
    pub description: String,
    pub stability_score: u32,
    pub emergent_themes: usize,
    pub unanimous_count: usize,
    pub split_count: usize,
}

/// Narrative picks derived from the scores
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatedInsights {
    pub strongest_consensus: String,
    pub biggest_controversy: String,
    pub model_diversity: String,
    pub consensus_quality: String,
}

/// Full output of [`compute_metrics`](super::engine::compute_metrics)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedAnalytics {
    pub themes: Vec<EnrichedTheme>,
    pub insights: Insights,
    /// Self-reported behavior as supplied
    pub model_behavior: BTreeMap<String, ModelBehavior>,
    pub summary: Summary,
    pub confidence_metrics: ConfidenceMetrics,
    pub calculated_model_behavior: ModelBehaviorAnalysis,
    pub consensus_evolution: ConsensusEvolution,
    pub ai_generated_insights: CalculatedInsights,
}

impl EnrichedAnalytics {
    pub fn theme(&self, name: &str) -> Option<&EnrichedTheme> {
        self.themes.iter().find(|t| t.theme.name == name)
    }
}
