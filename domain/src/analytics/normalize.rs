//! Format normalization
//!
//! The `formatVersion` tag decides the payload shape up front; the
//! simplified `v2` shape is converted into the canonical `v1` shape before
//! any scoring happens.

use super::raw::{
    ConsensusFormation, Importance, Insights, MentionType, ModelBehavior, ModelPosition,
    RawClassification, RawTheme, Stance, lenient_string,
};
use crate::extraction::validation::{FormatVersion, validate_classification};
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Why a payload could not be turned into a [`RawClassification`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClassificationError {
    #[error(transparent)]
    Invalid(#[from] crate::extraction::validation::ValidationReport),

    #[error("Malformed classification data: {0}")]
    Malformed(String),
}

/// One entry of a simplified theme's `models` array
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SimplifiedPosition {
    #[serde(deserialize_with = "lenient_string")]
    name: String,
    #[serde(default)]
    stance: Option<Stance>,
    #[serde(default, deserialize_with = "lenient_string")]
    mention_type: String,
    #[serde(default, deserialize_with = "lenient_string")]
    quote: String,
    #[serde(default, deserialize_with = "lenient_string")]
    reasoning: String,
}

#[derive(Debug, Clone, Deserialize)]
struct SimplifiedTheme {
    name: String,
    statement: String,
    #[serde(default)]
    importance: Importance,
    #[serde(default)]
    models: Vec<SimplifiedPosition>,
}

/// Simplified (`v2`) raw classification
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SimplifiedClassification {
    themes: Vec<SimplifiedTheme>,
    #[serde(default, deserialize_with = "lenient_string")]
    summary: String,
    #[serde(default)]
    insights: Option<Insights>,
    #[serde(default)]
    model_behavior: BTreeMap<String, ModelBehavior>,
    #[serde(default)]
    consensus_formation: Option<ConsensusFormation>,
    #[serde(default, deserialize_with = "lenient_string")]
    pattern: String,
}

impl SimplifiedClassification {
    fn into_canonical(self) -> RawClassification {
        let all_models: BTreeSet<String> = self
            .themes
            .iter()
            .flat_map(|t| t.models.iter().map(|m| m.name.clone()))
            .collect();

        let themes = self
            .themes
            .into_iter()
            .map(|theme| {
                let mut positions: BTreeMap<String, ModelPosition> = all_models
                    .iter()
                    .map(|name| (name.clone(), ModelPosition::not_mentioned()))
                    .collect();
                for entry in theme.models {
                    positions.insert(
                        entry.name,
                        ModelPosition {
                            stance: entry.stance.unwrap_or(Stance::Neutral),
                            mention_type: MentionType::from_label(&entry.mention_type),
                            quote: entry.quote,
                            reasoning: entry.reasoning,
                        },
                    );
                }
                RawTheme {
                    name: theme.name,
                    statement: theme.statement,
                    importance: theme.importance,
                    model_positions: positions,
                    disagreements: Vec::new(),
                }
            })
            .collect();

        let insights = self.insights.unwrap_or_else(|| Insights {
            main_conclusion: self.summary,
            ..Insights::default()
        });
        let consensus_formation = self.consensus_formation.unwrap_or_else(|| {
            let mut formation = ConsensusFormation::default();
            if !self.pattern.is_empty() {
                formation.pattern = self.pattern;
            }
            formation
        });

        RawClassification {
            themes,
            insights,
            model_behavior: self.model_behavior,
            consensus_formation,
        }
    }
}

/// Validate a payload and convert it to the canonical shape.
pub fn parse_classification(value: &Value) -> Result<RawClassification, ClassificationError> {
    validate_classification(value).into_result()?;

    let version = FormatVersion::detect(value).map_err(ClassificationError::Malformed)?;
    match version {
        FormatVersion::V1 => serde_json::from_value::<RawClassification>(value.clone())
            .map_err(|e| ClassificationError::Malformed(e.to_string())),
        FormatVersion::V2 => serde_json::from_value::<SimplifiedClassification>(value.clone())
            .map(SimplifiedClassification::into_canonical)
            .map_err(|e| ClassificationError::Malformed(e.to_string())),
    }
}
