//! Raw classification data as supplied by the conversion model
//!
//! Model output is loose, so the enums here accept any string: unknown
//! stances count as neutral, unknown importance as medium, and unknown
//! mention types as absent.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A model's recorded position on a theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stance {
    Agree,
    Disagree,
    Neutral,
    NotMentioned,
}

impl Stance {
    pub fn from_label(label: &str) -> Self {
        let normalized = label.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "agree" | "agrees" | "agreed" => Stance::Agree,
            "disagree" | "disagrees" | "disagreed" => Stance::Disagree,
            "not_mentioned" | "not_addressed" | "omitted" | "none" => Stance::NotMentioned,
            _ => Stance::Neutral,
        }
    }

    pub fn is_mentioned(&self) -> bool {
        !matches!(self, Stance::NotMentioned)
    }
}

impl<'de> Deserialize<'de> for Stance {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = lenient_string(deserializer)?;
        Ok(Stance::from_label(&label))
    }
}

/// How explicitly a model addressed a theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MentionType {
    Direct,
    Indirect,
    Omitted,
}

impl MentionType {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "direct" => Some(MentionType::Direct),
            "indirect" => Some(MentionType::Indirect),
            "omitted" => Some(MentionType::Omitted),
            _ => None,
        }
    }
}

fn lenient_mention_type<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<MentionType>, D::Error> {
    let label = lenient_string(deserializer)?;
    Ok(MentionType::from_label(&label))
}

/// Theme importance, defaulting to medium
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    High,
    #[default]
    Medium,
    Low,
}

impl Importance {
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "high" => Importance::High,
            "low" => Importance::Low,
            _ => Importance::Medium,
        }
    }

    /// Impact base score before coverage scaling
    pub fn base_impact(&self) -> f64 {
        match self {
            Importance::High => 8.0,
            Importance::Medium => 5.0,
            Importance::Low => 3.0,
        }
    }
}

impl<'de> Deserialize<'de> for Importance {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = lenient_string(deserializer)?;
        Ok(Importance::from_label(&label))
    }
}

/// Any scalar becomes a string; null, arrays and objects become empty.
pub(crate) fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}

/// Strings, or a single string promoted to a one-element list
fn lenient_string_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        Value::String(s) if !s.trim().is_empty() => vec![s],
        _ => Vec::new(),
    })
}

/// One model's position on one theme
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "PositionRepr")]
pub struct ModelPosition {
    pub stance: Stance,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mention_type: Option<MentionType>,
    pub quote: String,
    pub reasoning: String,
}

impl ModelPosition {
    pub fn new(stance: Stance) -> Self {
        Self {
            stance,
            mention_type: None,
            quote: String::new(),
            reasoning: String::new(),
        }
    }

    pub fn not_mentioned() -> Self {
        Self::new(Stance::NotMentioned)
    }

    pub fn with_mention_type(mut self, mention_type: MentionType) -> Self {
        self.mention_type = Some(mention_type);
        self
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PositionFields {
    #[serde(default = "neutral_label", deserialize_with = "lenient_string")]
    stance: String,
    #[serde(default, deserialize_with = "lenient_mention_type")]
    mention_type: Option<MentionType>,
    #[serde(default, deserialize_with = "lenient_string")]
    quote: String,
    #[serde(default, deserialize_with = "lenient_string")]
    reasoning: String,
}

fn neutral_label() -> String {
    "neutral".to_string()
}

/// A position is normally an object, but a bare stance string is accepted.
#[derive(Deserialize)]
#[serde(untagged)]
enum PositionRepr {
    Full(PositionFields),
    Stance(String),
}

impl From<PositionRepr> for ModelPosition {
    fn from(repr: PositionRepr) -> Self {
        match repr {
            PositionRepr::Full(fields) => ModelPosition {
                stance: Stance::from_label(&fields.stance),
                mention_type: fields.mention_type,
                quote: fields.quote,
                reasoning: fields.reasoning,
            },
            PositionRepr::Stance(label) => ModelPosition::new(Stance::from_label(&label)),
        }
    }
}

/// A theme as classified by the conversion model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTheme {
    pub name: String,
    pub statement: String,
    #[serde(default)]
    pub importance: Importance,
    /// Keyed by real model display name
    #[serde(default)]
    pub model_positions: BTreeMap<String, ModelPosition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub disagreements: Vec<Value>,
}

impl RawTheme {
    pub fn new(name: impl Into<String>, statement: impl Into<String>, importance: Importance) -> Self {
        Self {
            name: name.into(),
            statement: statement.into(),
            importance,
            model_positions: BTreeMap::new(),
            disagreements: Vec::new(),
        }
    }

    pub fn with_position(mut self, model: impl Into<String>, position: ModelPosition) -> Self {
        self.model_positions.insert(model.into(), position);
        self
    }

    /// Position of `model`; an absent entry counts as not mentioned.
    pub fn stance_of(&self, model: &str) -> Stance {
        self.model_positions
            .get(model)
            .map(|p| p.stance)
            .unwrap_or(Stance::NotMentioned)
    }
}

/// Narrative insights written by the conversion model
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Insights {
    #[serde(deserialize_with = "lenient_string")]
    pub main_conclusion: String,
    #[serde(deserialize_with = "lenient_string_list")]
    pub key_findings: Vec<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub surprising_patterns: String,
    #[serde(deserialize_with = "lenient_string")]
    pub practical_implications: String,
}

/// Self-reported behavior of one model
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModelBehavior {
    #[serde(deserialize_with = "lenient_string")]
    pub response_style: String,
    #[serde(deserialize_with = "lenient_string_list")]
    pub tendencies: Vec<String>,
    #[serde(deserialize_with = "lenient_string_list")]
    pub unique_contributions: Vec<String>,
}

/// How the consensus formed, as described by the conversion model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConsensusFormation {
    #[serde(deserialize_with = "lenient_string")]
    pub pattern: String,
    #[serde(deserialize_with = "lenient_string")]
    pub description: String,
}

impl Default for ConsensusFormation {
    fn default() -> Self {
        Self {
            pattern: "uniform".to_string(),
            description: String::new(),
        }
    }
}

/// Canonical (`v1`) raw classification
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawClassification {
    pub themes: Vec<RawTheme>,
    #[serde(default)]
    pub insights: Insights,
    /// Keyed by real model display name
    #[serde(default)]
    pub model_behavior: BTreeMap<String, ModelBehavior>,
    #[serde(default)]
    pub consensus_formation: ConsensusFormation,
}

impl RawClassification {
    /// Every model named in `modelBehavior` or in any theme, sorted by name
    pub fn model_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.model_behavior.keys().cloned().collect();
        for theme in &self.themes {
            for model in theme.model_positions.keys() {
                if !names.contains(model) {
                    names.push(model.clone());
                }
            }
        }
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stance_labels() {
        assert_eq!(Stance::from_label("Agree"), Stance::Agree);
        assert_eq!(Stance::from_label("not mentioned"), Stance::NotMentioned);
        assert_eq!(Stance::from_label("not-mentioned"), Stance::NotMentioned);
        assert_eq!(Stance::from_label("partially"), Stance::Neutral);
        assert!(!Stance::NotMentioned.is_mentioned());
    }

    #[test]
    fn test_stance_serializes_snake_case() {
        assert_eq!(
            serde_json::to_value(Stance::NotMentioned).unwrap(),
            json!("not_mentioned")
        );
    }

    #[test]
    fn test_theme_deserialization_is_lenient() {
        let theme: RawTheme = serde_json::from_value(json!({
            "name": "Cost",
            "statement": "Cost matters",
            "importance": "HIGH",
            "modelPositions": {
                "GPT-4.1": {"stance": "agree", "mentionType": "direct", "quote": null},
                "Grok 3 Beta": "disagree",
                "Claude Opus 4": {"stance": "unsure", "mentionType": "vague"}
            }
        }))
        .unwrap();

        assert_eq!(theme.importance, Importance::High);
        let gpt = &theme.model_positions["GPT-4.1"];
        assert_eq!(gpt.stance, Stance::Agree);
        assert_eq!(gpt.mention_type, Some(MentionType::Direct));
        assert_eq!(gpt.quote, "");
        assert_eq!(theme.stance_of("Grok 3 Beta"), Stance::Disagree);
        let claude = &theme.model_positions["Claude Opus 4"];
        assert_eq!(claude.stance, Stance::Neutral);
        assert_eq!(claude.mention_type, None);
        assert_eq!(theme.stance_of("Unknown"), Stance::NotMentioned);
    }

    #[test]
    fn test_missing_importance_defaults_to_medium() {
        let theme: RawTheme =
            serde_json::from_value(json!({"name": "a", "statement": "b", "modelPositions": {}}))
                .unwrap();
        assert_eq!(theme.importance, Importance::Medium);
    }

    #[test]
    fn test_classification_defaults() {
        let raw: RawClassification = serde_json::from_value(json!({
            "themes": [],
            "modelBehavior": {"A": {"tendencies": "hedges"}}
        }))
        .unwrap();
        assert_eq!(raw.consensus_formation.pattern, "uniform");
        assert_eq!(raw.model_behavior["A"].tendencies, vec!["hedges"]);
        assert_eq!(raw.model_behavior["A"].response_style, "");
    }

    #[test]
    fn test_model_names_union() {
        let raw = RawClassification {
            themes: vec![
                RawTheme::new("t", "s", Importance::Medium)
                    .with_position("Zeta", ModelPosition::new(Stance::Agree)),
            ],
            insights: Insights::default(),
            model_behavior: BTreeMap::from([("Alpha".to_string(), ModelBehavior::default())]),
            consensus_formation: ConsensusFormation::default(),
        };
        assert_eq!(raw.model_names(), vec!["Alpha", "Zeta"]);
    }
}
