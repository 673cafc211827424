//! Sampling parameters (`[generation]` section)

use polyllm_application::GenerationParams;
use polyllm_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};

/// Raw `[generation]` configuration; defaults match [`GenerationParams`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGenerationConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
    pub max_tokens_ceiling: u32,
}

impl Default for FileGenerationConfig {
    fn default() -> Self {
        let params = GenerationParams::default();
        Self {
            temperature: params.temperature,
            top_p: params.top_p,
            frequency_penalty: params.frequency_penalty,
            presence_penalty: params.presence_penalty,
            max_tokens_ceiling: params.max_tokens_ceiling,
        }
    }
}

impl FileGenerationConfig {
    pub fn to_params(&self) -> GenerationParams {
        GenerationParams {
            temperature: self.temperature,
            top_p: self.top_p,
            frequency_penalty: self.frequency_penalty,
            presence_penalty: self.presence_penalty,
            max_tokens_ceiling: self.max_tokens_ceiling,
        }
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let checks = [
            ("temperature", self.temperature, 0.0..=2.0),
            ("top_p", self.top_p, 0.0..=1.0),
            ("frequency_penalty", self.frequency_penalty, -2.0..=2.0),
            ("presence_penalty", self.presence_penalty, -2.0..=2.0),
        ];

        let mut issues: Vec<ConfigIssue> = checks
            .into_iter()
            .filter(|(_, value, range)| !range.contains(value))
            .map(|(field, value, range)| {
                ConfigIssue::error(
                    ConfigIssueCode::InvalidGenerationParam,
                    format!(
                        "generation.{}: {} is outside {}..={}",
                        field,
                        value,
                        range.start(),
                        range.end()
                    ),
                )
            })
            .collect();

        if self.max_tokens_ceiling == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::InvalidGenerationParam,
                "generation.max_tokens_ceiling must be greater than 0",
            ));
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_params() {
        let config = FileGenerationConfig::default();
        assert_eq!(config.to_params(), GenerationParams::default());
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_out_of_range_values() {
        let config = FileGenerationConfig {
            temperature: 3.5,
            top_p: 1.2,
            max_tokens_ceiling: 0,
            ..Default::default()
        };
        let issues = config.validate();
        assert_eq!(issues.len(), 3);
        assert!(issues.iter().all(|i| i.is_error()));
        assert!(issues[0].message.starts_with("generation.temperature"));
    }
}
