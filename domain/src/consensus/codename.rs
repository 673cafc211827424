//! Session-scoped codenames for model anonymization

use crate::core::error::DomainError;
use crate::core::model::ModelDescriptor;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Fixed codename assignment table, keyed by provider id
const CODENAME_TABLE: [(&str, &str); 11] = [
    ("anthropic/claude-opus-4", "llm-!"),
    ("deepseek/deepseek-r1-0528", "llm-@"),
    ("openai/o4-mini-high", "llm-#"),
    ("qwen/qwen3-30b-a3b:free", "llm-$"),
    ("x-ai/grok-3-beta", "llm-%"),
    ("google/gemini-2.5-pro-preview", "llm-^"),
    ("mistralai/magistral-medium-2506", "llm-+"),
    ("anthropic/claude-sonnet-4", "llm-&"),
    ("openai/gpt-4.1", "llm-*"),
    ("openai/chatgpt-4o-latest", "llm-("),
    ("google/gemini-2.5-flash-preview:thinking", "llm-)"),
];

/// Codename for `model_id` from the fixed table, if it has one.
pub fn table_codename(model_id: &str) -> Option<&'static str> {
    CODENAME_TABLE
        .iter()
        .find(|(id, _)| *id == model_id)
        .map(|(_, code)| *code)
}

/// One codename assignment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodenameEntry {
    pub codename: String,
    pub model_id: String,
    pub display_name: String,
}

/// Bijection between codenames and real model names (Value Object)
///
/// Built once per consensus run. Prompts only ever carry codenames; rendered
/// output swaps them back with [`CodenameMapping::reveal`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodenameMapping {
    entries: Vec<CodenameEntry>,
}

impl CodenameMapping {
    /// Assign codenames to the selected models, in selection order.
    ///
    /// Models missing from the fixed table get `llm-<index>`. Fails when two
    /// models would share a codename.
    pub fn assign(models: &[ModelDescriptor]) -> Result<Self, DomainError> {
        let mut entries: Vec<CodenameEntry> = Vec::with_capacity(models.len());
        for (index, model) in models.iter().enumerate() {
            let codename = table_codename(&model.id)
                .map(str::to_string)
                .unwrap_or_else(|| format!("llm-{}", index));

            if let Some(existing) = entries
                .iter()
                .find(|e| e.codename.eq_ignore_ascii_case(&codename))
            {
                return Err(DomainError::DuplicateCodename {
                    codename,
                    first: existing.model_id.clone(),
                    second: model.id.clone(),
                });
            }

            entries.push(CodenameEntry {
                codename,
                model_id: model.id.clone(),
                display_name: model.display_name.clone(),
            });
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[CodenameEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn codename_for(&self, model_id: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.model_id == model_id)
            .map(|e| e.codename.as_str())
    }

    /// Real display name behind a codename (case-insensitive)
    pub fn real_name(&self, codename: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.codename.eq_ignore_ascii_case(codename))
            .map(|e| e.display_name.as_str())
    }

    /// `codename: Real Name` lines, one per model
    pub fn mapping_lines(&self) -> String {
        self.entries
            .iter()
            .map(|e| format!("{}: {}", e.codename, e.display_name))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Replace every codename occurrence in `text` with the real name.
    ///
    /// Matching is case-insensitive on the literal codename. Longer
    /// codenames are tried first so `llm-1` never clobbers `llm-10`, and
    /// substituted names are not rescanned.
    pub fn reveal(&self, text: &str) -> String {
        let Some(pattern) = self.pattern() else {
            return text.to_string();
        };
        let names: HashMap<String, &str> = self
            .entries
            .iter()
            .map(|e| (e.codename.to_lowercase(), e.display_name.as_str()))
            .collect();

        pattern
            .replace_all(text, |caps: &regex::Captures<'_>| {
                let matched = &caps[0];
                names
                    .get(&matched.to_lowercase())
                    .map(|name| name.to_string())
                    .unwrap_or_else(|| matched.to_string())
            })
            .into_owned()
    }

    fn pattern(&self) -> Option<Regex> {
        if self.entries.is_empty() {
            return None;
        }
        let mut codes: Vec<&str> = self.entries.iter().map(|e| e.codename.as_str()).collect();
        codes.sort_by_key(|c| std::cmp::Reverse(c.len()));
        let alternation = codes
            .iter()
            .map(|c| regex::escape(c))
            .collect::<Vec<_>>()
            .join("|");
        RegexBuilder::new(&alternation)
            .case_insensitive(true)
            .build()
            .ok()
    }
}
