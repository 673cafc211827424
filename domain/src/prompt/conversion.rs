//! Structured-data conversion prompt templates

use crate::consensus::codename::CodenameMapping;
use serde::{Deserialize, Serialize};

pub const MAPPING_PLACEHOLDER: &str = "{{MODEL_CODE_MAPPING}}";
pub const CONSENSUS_TEXT_PLACEHOLDER: &str = "{{CONSENSUS_TEXT}}";

const STANDARD_TEMPLATE: &str = r#"Convert the following consensus analysis into a structured JSON format. Extract and classify model positions WITHOUT performing any calculations.

IMPORTANT: The consensus analysis originally used anonymous model codes. Here is the mapping to actual model names:
{{MODEL_CODE_MAPPING}}

When creating the JSON output, always use the actual model names from the mapping above.

Please structure the data as follows:
{
    "formatVersion": "v1",
    "themes": [
        {
            "name": "theme name",
            "statement": "what was concluded about this theme",
            "modelPositions": {
                "Actual Model Name 1": {
                    "stance": "agree|disagree|neutral|not_mentioned",
                    "mentionType": "direct|indirect|omitted",
                    "quote": "relevant quote if available",
                    "reasoning": "brief explanation of their position"
                }
            },
            "disagreements": [
                {
                    "model": "Actual Model Name",
                    "position": "what they said",
                    "significance": "why this disagreement matters"
                }
            ],
            "importance": "high|medium|low"
        }
    ],
    "insights": {
        "mainConclusion": "overall synthesis conclusion",
        "keyFindings": ["finding 1", "finding 2"],
        "surprisingPatterns": "any unexpected observations",
        "practicalImplications": "what this means for decision-making"
    },
    "modelBehavior": {
        "Actual Model Name 1": {
            "responseStyle": "concise|detailed|balanced|creative|analytical",
            "tendencies": ["tendency 1", "tendency 2"],
            "uniqueContributions": ["contribution 1", "contribution 2"]
        }
    },
    "consensusFormation": {
        "pattern": "convergent|divergent|polarized|uniform",
        "description": "how the consensus developed"
    }
}

Include every model from the mapping in every theme's modelPositions, using "not_mentioned" when a model did not address the theme.

Consensus analysis to convert:
{{CONSENSUS_TEXT}}

Return ONLY the JSON object, no other text. Do NOT calculate percentages, scores, or any numerical metrics."#;

const SAFE_TEMPLATE: &str = r#"Convert the consensus analysis below into simple JSON. Use only double quotes, no comments, and no trailing commas.

Model names (use the names on the right):
{{MODEL_CODE_MAPPING}}

Use exactly this structure:
{
    "formatVersion": "v2",
    "summary": "one sentence overall conclusion",
    "themes": [
        {
            "name": "theme name",
            "statement": "what was concluded",
            "importance": "high|medium|low",
            "models": [
                {"name": "Actual Model Name", "stance": "agree|disagree|neutral", "mentionType": "direct|indirect"}
            ]
        }
    ],
    "modelBehavior": {
        "Actual Model Name": {"responseStyle": "concise|detailed|balanced", "tendencies": [], "uniqueContributions": []}
    },
    "pattern": "convergent|divergent|polarized|uniform"
}

List only the models that addressed a theme in its "models" array.

Consensus analysis:
{{CONSENSUS_TEXT}}

Return ONLY the JSON object."#;

/// Which conversion template variant to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversionFormat {
    /// Canonical `modelPositions` shape (`formatVersion: "v1"`)
    #[default]
    Standard,
    /// Simplified `models` array shape (`formatVersion: "v2"`), used on retry
    Safe,
}

impl ConversionFormat {
    pub fn format_version(&self) -> &'static str {
        match self {
            ConversionFormat::Standard => "v1",
            ConversionFormat::Safe => "v2",
        }
    }
}

/// Template for the structured-data conversion prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionPromptTemplate {
    text: String,
}

impl ConversionPromptTemplate {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn builtin(format: ConversionFormat) -> Self {
        match format {
            ConversionFormat::Standard => Self::new(STANDARD_TEMPLATE),
            ConversionFormat::Safe => Self::new(SAFE_TEMPLATE),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn missing_markers(&self) -> Vec<String> {
        [MAPPING_PLACEHOLDER, CONSENSUS_TEXT_PLACEHOLDER]
            .iter()
            .filter(|p| !self.text.contains(*p))
            .map(|p| p.to_string())
            .collect()
    }

    /// Fill the template.
    ///
    /// Codenames in the consensus text are replaced with real names first so
    /// the conversion model only ever sees real names.
    pub fn build(&self, mapping: &CodenameMapping, consensus_text: &str) -> String {
        let revealed = mapping.reveal(consensus_text);
        self.text
            .replacen(MAPPING_PLACEHOLDER, &mapping.mapping_lines(), 1)
            .replacen(CONSENSUS_TEXT_PLACEHOLDER, &revealed, 1)
    }
}

impl Default for ConversionPromptTemplate {
    fn default() -> Self {
        Self::builtin(ConversionFormat::Standard)
    }
}
