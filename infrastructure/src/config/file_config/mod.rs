//! Raw TOML configuration data types
//!
//! These structs mirror the TOML config file section by section and are
//! deserialized directly. Conversion into application types happens here so
//! the binary only deals with catalog, descriptors and parameter structs.

mod api;
mod consensus;
mod generation;
mod logging;
mod models;
mod output;
mod prompts;

pub use api::FileApiConfig;
pub use consensus::FileConsensusConfig;
pub use generation::FileGenerationConfig;
pub use logging::FileLoggingConfig;
pub use models::{FileModelEntry, FileModelsConfig};
pub use output::FileOutputConfig;
pub use prompts::FilePromptsConfig;

use polyllm_application::RunParams;
use polyllm_domain::ConfigIssue;
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Provider endpoint and credentials
    pub api: FileApiConfig,
    /// Catalog and role-based model selection
    pub models: FileModelsConfig,
    pub generation: FileGenerationConfig,
    pub consensus: FileConsensusConfig,
    /// Template overrides
    pub prompts: FilePromptsConfig,
    pub logging: FileLoggingConfig,
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// Template overrides are read from disk to check their markers.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        issues.extend(self.api.validate());
        issues.extend(self.models.validate());
        issues.extend(self.generation.validate());
        issues.extend(self.prompts.validate());
        issues
    }

    /// [`validate`](Self::validate) plus checks needed before calling a provider.
    pub fn validate_for_requests(&self) -> Vec<ConfigIssue> {
        let mut issues = self.api.validate_for_requests();
        issues.extend(self.models.validate());
        issues.extend(self.generation.validate());
        issues.extend(self.prompts.validate());
        issues
    }

    pub fn run_params(&self) -> RunParams {
        RunParams::from_config_values(self.api.timeout_seconds, self.consensus.turn_cooldown_ms)
    }
}
