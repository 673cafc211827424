//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "polyllm";
const PROJECT_FILES: [&str; 2] = ["polyllm.toml", ".polyllm.toml"];
const API_KEY_VAR: &str = "OPENROUTER_API_KEY";
const ENV_PREFIX: &str = "POLYLLM_";

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority.
    ///
    /// An explicit `config_path` that does not exist is an error; the
    /// discovered files are optional.
    pub fn load(config_path: Option<&Path>) -> Result<FileConfig, Box<figment::Error>> {
        Self::figment(config_path)?.extract().map_err(Box::new)
    }

    fn figment(config_path: Option<&Path>) -> Result<Figment, Box<figment::Error>> {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(&global_path));
        }

        if let Some(path) = Self::project_config_path() {
            figment = figment.merge(Toml::file(path));
        }

        if let Some(path) = config_path {
            if !path.exists() {
                return Err(Box::new(figment::Error::from(format!(
                    "config file not found: {}",
                    path.display()
                ))));
            }
            figment = figment.merge(Toml::file(path));
        }

        Ok(figment
            .merge(Env::raw().only(&[API_KEY_VAR]).map(|_| "api.key".into()))
            .merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// `$XDG_CONFIG_HOME/polyllm/config.toml`, or the platform equivalent
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Print the config file locations being used (for debugging)
    pub fn print_config_sources(config_path: Option<&Path>) {
        println!("Configuration sources (in priority order):");

        if let Some(path) = config_path {
            let mark = if path.exists() { "FOUND" } else { "MISSING" };
            println!("  [{:<7}] --config: {}", mark, path.display());
        }

        if let Some(path) = Self::project_config_path() {
            println!("  [FOUND  ] Project: {}", path.display());
        } else {
            println!("  [       ] Project: ./polyllm.toml or ./.polyllm.toml");
        }

        if let Some(path) = Self::global_config_path() {
            let mark = if path.exists() { "FOUND" } else { "" };
            println!("  [{:<7}] Global:  {}", mark, path.display());
        }

        let key = if std::env::var_os(API_KEY_VAR).is_some() {
            "SET"
        } else {
            ""
        };
        println!("  [{:<7}] Env:     {} / {}*", key, API_KEY_VAR, ENV_PREFIX);
        println!("  [       ] Default: built-in defaults");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert!(config.models.selected.is_empty());
        assert_eq!(config.consensus.turn_cooldown_ms, 300);
    }

    #[test]
    fn test_global_config_path_returns_some() {
        let path = ConfigLoader::global_config_path().unwrap();
        assert!(path.to_string_lossy().contains("polyllm"));
        assert!(path.ends_with("config.toml"));
    }

    #[test]
    fn test_project_file_and_env_merge() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "polyllm.toml",
                r#"
[api]
timeout_seconds = 45

[models]
selected = ["openai/gpt-4.1"]
"#,
            )?;
            jail.set_env("OPENROUTER_API_KEY", "sk-from-env");
            jail.set_env("POLYLLM_CONSENSUS__TURN_COOLDOWN_MS", "50");

            let config = ConfigLoader::load(None).map_err(|e| e.to_string())?;
            assert_eq!(config.api.timeout_seconds, 45);
            assert_eq!(config.api.api_key(), Some("sk-from-env"));
            assert_eq!(config.models.selected, vec!["openai/gpt-4.1".to_string()]);
            assert_eq!(config.consensus.turn_cooldown_ms, 50);
            assert_eq!(config.generation.max_tokens_ceiling, 16_000);
            Ok(())
        });
    }

    #[test]
    fn test_explicit_file_overrides_project_file() {
        Jail::expect_with(|jail| {
            jail.create_file(".polyllm.toml", "[output]\ncolor = false\nformat = \"full\"")?;
            jail.create_file("custom.toml", "[output]\nformat = \"json\"")?;

            let config =
                ConfigLoader::load(Some(Path::new("custom.toml"))).map_err(|e| e.to_string())?;
            assert_eq!(config.output.format, Some(polyllm_domain::OutputFormat::Json));
            assert!(!config.output.color);
            Ok(())
        });
    }

    #[test]
    fn test_prefixed_env_beats_api_key_var() {
        Jail::expect_with(|jail| {
            jail.set_env("OPENROUTER_API_KEY", "sk-generic");
            jail.set_env("POLYLLM_API__KEY", "sk-specific");
            let config = ConfigLoader::load(None).map_err(|e| e.to_string())?;
            assert_eq!(config.api.api_key(), Some("sk-specific"));
            Ok(())
        });
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        Jail::expect_with(|_jail| {
            assert!(ConfigLoader::load(Some(Path::new("nope.toml"))).is_err());
            Ok(())
        });
    }
}
