//! Model selection (`[models]` section)

use polyllm_domain::{ConfigIssue, ConfigIssueCode, ModelCatalog, ModelDescriptor};
use serde::{Deserialize, Serialize};

/// One catalog entry overriding the built-in list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileModelEntry {
    pub id: String,
    pub name: Option<String>,
    pub max_context_tokens: Option<u32>,
    pub max_output_tokens: Option<u32>,
}

impl FileModelEntry {
    fn to_descriptor(&self) -> ModelDescriptor {
        let fallback = ModelDescriptor::from_id(self.id.trim());
        ModelDescriptor::new(
            self.id.trim(),
            self.name.clone().unwrap_or(fallback.display_name),
            self.max_context_tokens.unwrap_or(fallback.max_context_tokens),
            self.max_output_tokens.unwrap_or(fallback.max_output_tokens),
        )
    }
}

/// Raw `[models]` configuration
///
/// # Example
///
/// ```toml
/// [models]
/// selected = ["anthropic/claude-opus-4", "openai/gpt-4.1", "x-ai/grok-3-beta"]
/// consensus = "google/gemini-2.5-flash-preview:thinking"
/// conversion = "openai/gpt-4.1"
///
/// [[models.catalog]]
/// id = "openai/gpt-4.1"
/// name = "GPT-4.1"
/// max_output_tokens = 100000
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileModelsConfig {
    /// Replaces the built-in catalog when non-empty
    pub catalog: Vec<FileModelEntry>,
    /// Models queried in the fan-out; empty selects the catalog default
    pub selected: Vec<String>,
    pub consensus: Option<String>,
    pub conversion: Option<String>,
}

impl FileModelsConfig {
    pub fn catalog(&self) -> ModelCatalog {
        if self.catalog.is_empty() {
            return ModelCatalog::builtin();
        }
        ModelCatalog::new(
            self.catalog
                .iter()
                .filter(|e| !e.id.trim().is_empty())
                .map(FileModelEntry::to_descriptor)
                .collect(),
        )
    }

    /// Resolve `ids`, or the configured selection when `ids` is empty.
    ///
    /// Repeated ids keep their first position.
    pub fn selected_models(&self, catalog: &ModelCatalog, ids: &[String]) -> Vec<ModelDescriptor> {
        let ids = if ids.is_empty() { &self.selected } else { ids };
        let mut unique: Vec<&str> = Vec::with_capacity(ids.len());
        for id in ids.iter().map(|id| id.trim()).filter(|id| !id.is_empty()) {
            if !unique.contains(&id) {
                unique.push(id);
            }
        }
        let ids = unique;
        if ids.is_empty() {
            return catalog.default_selection();
        }
        catalog.resolve_all(&ids)
    }

    pub fn consensus_model(&self, catalog: &ModelCatalog) -> ModelDescriptor {
        Self::role_model(
            catalog,
            self.consensus.as_deref(),
            ModelCatalog::DEFAULT_CONSENSUS_MODEL,
        )
    }

    pub fn conversion_model(&self, catalog: &ModelCatalog) -> ModelDescriptor {
        Self::role_model(
            catalog,
            self.conversion.as_deref(),
            ModelCatalog::DEFAULT_CONVERSION_MODEL,
        )
    }

    fn role_model(catalog: &ModelCatalog, id: Option<&str>, default: &str) -> ModelDescriptor {
        let id = id.map(str::trim).filter(|id| !id.is_empty()).unwrap_or(default);
        catalog.resolve(id)
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        let catalog = self.catalog();

        for (index, entry) in self.catalog.iter().enumerate() {
            if entry.id.trim().is_empty() {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::EmptyModelId,
                    format!("models.catalog[{}]: id cannot be empty", index),
                ));
            }
        }

        for id in &self.selected {
            if id.trim().is_empty() {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::EmptyModelId,
                    "models.selected: model id cannot be empty",
                ));
            } else if catalog.get(id.trim()).is_none() {
                issues.push(ConfigIssue::warning(
                    ConfigIssueCode::UnknownModel,
                    format!(
                        "models.selected: '{}' is not in the catalog, using generated limits",
                        id.trim()
                    ),
                ));
            }
        }

        for (field, value) in [("consensus", &self.consensus), ("conversion", &self.conversion)] {
            if let Some(id) = value
                && id.trim().is_empty()
            {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::EmptyModelId,
                    format!("models.{}: model id cannot be empty", field),
                ));
            }
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_use_builtin_catalog() {
        let config = FileModelsConfig::default();
        let catalog = config.catalog();
        assert_eq!(catalog.models().len(), 11);
        assert_eq!(
            config.selected_models(&catalog, &[]),
            catalog.default_selection()
        );
        assert_eq!(
            config.consensus_model(&catalog).id,
            ModelCatalog::DEFAULT_CONSENSUS_MODEL
        );
        assert_eq!(config.conversion_model(&catalog).display_name, "GPT-4.1");
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_cli_ids_override_configured_selection() {
        let config = FileModelsConfig {
            selected: vec!["openai/gpt-4.1".to_string()],
            ..Default::default()
        };
        let catalog = config.catalog();

        let from_config = config.selected_models(&catalog, &[]);
        assert_eq!(from_config.len(), 1);

        let from_cli = config.selected_models(&catalog, &["x-ai/grok-3-beta".to_string()]);
        assert_eq!(from_cli[0].display_name, "Grok 3 Beta");
    }

    #[test]
    fn test_repeated_ids_are_selected_once() {
        let config = FileModelsConfig::default();
        let catalog = config.catalog();
        let ids: Vec<String> = ["openai/gpt-4.1", "x-ai/grok-3-beta", " openai/gpt-4.1 "]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let selected = config.selected_models(&catalog, &ids);
        let selected: Vec<&str> = selected.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(selected, vec!["openai/gpt-4.1", "x-ai/grok-3-beta"]);
    }

    #[test]
    fn test_custom_catalog_entry() {
        let toml_str = r#"
[[catalog]]
id = "local/llama"
name = "Llama Local"
max_output_tokens = 2048
"#;
        let config: FileModelsConfig = toml::from_str(toml_str).unwrap();
        let catalog = config.catalog();
        let llama = catalog.get("local/llama").unwrap();
        assert_eq!(llama.display_name, "Llama Local");
        assert_eq!(llama.max_output_tokens, 2048);
        assert_eq!(llama.max_context_tokens, 16_000);
    }

    #[test]
    fn test_validation_issues() {
        let config = FileModelsConfig {
            selected: vec!["".to_string(), "someone/new-model".to_string()],
            consensus: Some(" ".to_string()),
            ..Default::default()
        };
        let issues = config.validate();
        assert_eq!(issues.len(), 3);
        assert_eq!(issues[0].code, ConfigIssueCode::EmptyModelId);
        assert_eq!(issues[1].code, ConfigIssueCode::UnknownModel);
        assert!(!issues[1].is_error());
        assert!(issues[2].message.contains("models.consensus"));

        // Blank role ids still fall back to the default.
        let catalog = config.catalog();
        assert_eq!(
            config.consensus_model(&catalog).id,
            ModelCatalog::DEFAULT_CONSENSUS_MODEL
        );
    }
}
