//! Prompt template overrides (`[prompts]` section)

use crate::prompts::{TemplateError, load_consensus_template, load_conversion_template};
use polyllm_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw `[prompts]` configuration
///
/// ```toml
/// [prompts]
/// consensus = "~/prompts/consensus.md"
/// conversion = "~/prompts/conversion.md"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePromptsConfig {
    pub consensus: Option<PathBuf>,
    pub conversion: Option<PathBuf>,
}

fn template_issue(field: &str, error: TemplateError) -> ConfigIssue {
    let code = match error {
        TemplateError::Io { .. } => ConfigIssueCode::TemplateUnreadable,
        TemplateError::MissingMarkers { .. } => ConfigIssueCode::TemplateMissingMarker,
    };
    ConfigIssue::error(code, format!("prompts.{}: {}", field, error))
}

impl FilePromptsConfig {
    /// Reads the configured files; the built-in templates need no checks.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if let Err(e) = load_consensus_template(self.consensus.as_deref()) {
            issues.push(template_issue("consensus", e));
        }
        if let Err(e) = load_conversion_template(self.conversion.as_deref()) {
            issues.push(template_issue("conversion", e));
        }
        issues
    }
}
