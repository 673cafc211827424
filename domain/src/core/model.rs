//! Model descriptors and the built-in model catalog

use serde::{Deserialize, Serialize};

/// Token limits applied to models that are not in the catalog.
const FALLBACK_TOKEN_LIMIT: u32 = 16_000;

/// Descriptor of an LLM endpoint (Value Object)
///
/// Defined by configuration and only ever read by the core. The `id` is the
/// opaque provider identifier sent on the wire; `display_name` is what users
/// (and the analytics output) see.
///
/// # Example
///
/// ```
/// use polyllm_domain::ModelDescriptor;
///
/// let model = ModelDescriptor::new("openai/gpt-4.1", "GPT-4.1", 100_000, 100_000);
/// assert_eq!(model.clamp_output_tokens(16_000), 16_000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDescriptor {
    /// Provider identifier (e.g. `anthropic/claude-opus-4`)
    pub id: String,
    /// Human-readable name
    pub display_name: String,
    /// Maximum context window in tokens
    pub max_context_tokens: u32,
    /// Maximum completion tokens the model accepts
    pub max_output_tokens: u32,
}

impl ModelDescriptor {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        max_context_tokens: u32,
        max_output_tokens: u32,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            max_context_tokens,
            max_output_tokens,
        }
    }

    /// Descriptor for an id that is not in any catalog.
    ///
    /// The id doubles as the display name.
    pub fn from_id(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            display_name: id.clone(),
            id,
            max_context_tokens: FALLBACK_TOKEN_LIMIT,
            max_output_tokens: FALLBACK_TOKEN_LIMIT,
        }
    }

    /// `min(max_output_tokens, provider_ceiling)`
    pub fn clamp_output_tokens(&self, provider_ceiling: u32) -> u32 {
        self.max_output_tokens.min(provider_ceiling)
    }
}

impl std::fmt::Display for ModelDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name)
    }
}

/// The set of models a user can choose from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelCatalog {
    models: Vec<ModelDescriptor>,
}

impl ModelCatalog {
    /// Default model used to drive the consensus conversation
    pub const DEFAULT_CONSENSUS_MODEL: &'static str = "google/gemini-2.5-flash-preview:thinking";
    /// Default model used for the structured-data conversion
    pub const DEFAULT_CONVERSION_MODEL: &'static str = "openai/gpt-4.1";
    /// Number of catalog entries selected when the user picks nothing
    const DEFAULT_SELECTION: usize = 7;

    pub fn new(models: Vec<ModelDescriptor>) -> Self {
        Self { models }
    }

    /// Built-in OpenRouter catalog
    pub fn builtin() -> Self {
        let entries: [(&str, &str, u32); 11] = [
            ("anthropic/claude-opus-4", "Claude Opus 4", 32_000),
            ("deepseek/deepseek-r1-0528", "DeepSeek R1", 32_768),
            ("openai/o4-mini-high", "O4 Mini High", 100_000),
            ("qwen/qwen3-30b-a3b:free", "Qwen3 30B", 32_000),
            ("x-ai/grok-3-beta", "Grok 3 Beta", 32_000),
            ("google/gemini-2.5-pro-preview", "Gemini Pro 2.5", 16_000),
            ("mistralai/magistral-medium-2506", "Magistral Medium", 32_768),
            ("anthropic/claude-sonnet-4", "Claude Sonnet 4", 64_000),
            ("openai/gpt-4.1", "GPT-4.1", 100_000),
            ("openai/chatgpt-4o-latest", "ChatGPT 4o", 4_096),
            (
                "google/gemini-2.5-flash-preview:thinking",
                "Gemini 2.5 Flash Thinking",
                16_000,
            ),
        ];
        Self::new(
            entries
                .into_iter()
                .map(|(id, name, limit)| ModelDescriptor::new(id, name, limit, limit))
                .collect(),
        )
    }

    pub fn models(&self) -> &[ModelDescriptor] {
        &self.models
    }

    pub fn get(&self, id: &str) -> Option<&ModelDescriptor> {
        self.models.iter().find(|m| m.id == id)
    }

    /// Look up `id`, falling back to a generated descriptor.
    pub fn resolve(&self, id: &str) -> ModelDescriptor {
        self.get(id)
            .cloned()
            .unwrap_or_else(|| ModelDescriptor::from_id(id))
    }

    /// Resolve a list of ids, keeping caller order.
    pub fn resolve_all<S: AsRef<str>>(&self, ids: &[S]) -> Vec<ModelDescriptor> {
        ids.iter().map(|id| self.resolve(id.as_ref())).collect()
    }

    /// Models selected when the user does not choose any
    pub fn default_selection(&self) -> Vec<ModelDescriptor> {
        self.models
            .iter()
            .take(Self::DEFAULT_SELECTION)
            .cloned()
            .collect()
    }
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_contents() {
        let catalog = ModelCatalog::builtin();
        assert_eq!(catalog.models().len(), 11);
        assert!(catalog.get(ModelCatalog::DEFAULT_CONSENSUS_MODEL).is_some());
        assert!(catalog.get(ModelCatalog::DEFAULT_CONVERSION_MODEL).is_some());
    }

    #[test]
    fn test_resolve_unknown_model() {
        let catalog = ModelCatalog::builtin();
        let model = catalog.resolve("vendor/new-model");
        assert_eq!(model.id, "vendor/new-model");
        assert_eq!(model.display_name, "vendor/new-model");
        assert_eq!(model.max_output_tokens, 16_000);
    }

    #[test]
    fn test_resolve_all_keeps_order() {
        let catalog = ModelCatalog::builtin();
        let models = catalog.resolve_all(&["openai/gpt-4.1", "anthropic/claude-opus-4"]);
        assert_eq!(models[0].display_name, "GPT-4.1");
        assert_eq!(models[1].display_name, "Claude Opus 4");
    }

    #[test]
    fn test_default_selection() {
        let selection = ModelCatalog::builtin().default_selection();
        assert_eq!(selection.len(), 7);
        assert_eq!(selection[0].id, "anthropic/claude-opus-4");
    }

    #[test]
    fn test_clamp_output_tokens() {
        let small = ModelDescriptor::new("a", "A", 4_096, 4_096);
        let large = ModelDescriptor::new("b", "B", 100_000, 100_000);
        assert_eq!(small.clamp_output_tokens(16_000), 4_096);
        assert_eq!(large.clamp_output_tokens(16_000), 16_000);
    }

    #[test]
    fn test_descriptor_serializes_camel_case() {
        let model = ModelDescriptor::new("a", "A", 1, 2);
        let json = serde_json::to_value(&model).unwrap();
        assert_eq!(json["displayName"], "A");
        assert_eq!(json["maxOutputTokens"], 2);
    }
}
