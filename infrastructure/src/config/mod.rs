//! Configuration file loading for polyllm
//!
//! Sources are merged lowest to highest priority:
//!
//! 1. Default values
//! 2. XDG config: `$XDG_CONFIG_HOME/polyllm/config.toml`
//! 3. Project root: `./polyllm.toml` or `./.polyllm.toml`
//! 4. `--config <path>` specified file
//! 5. `OPENROUTER_API_KEY`, then `POLYLLM_*` environment variables

mod file_config;
mod loader;

pub use file_config::{
    FileApiConfig, FileConfig, FileConsensusConfig, FileGenerationConfig, FileLoggingConfig,
    FileModelEntry, FileModelsConfig, FileOutputConfig, FilePromptsConfig,
};
pub use loader::ConfigLoader;
