//! Provider connection settings (`[api]` section)

use crate::openrouter::{DEFAULT_BASE_URL, DEFAULT_TITLE, OpenRouterError, OpenRouterSettings};
use polyllm_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw `[api]` configuration
///
/// # Example
///
/// ```toml
/// [api]
/// base_url = "https://openrouter.ai/api/v1"
/// timeout_seconds = 120
/// referer = "https://example.com"
/// ```
///
/// The key usually comes from `OPENROUTER_API_KEY` rather than the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileApiConfig {
    pub base_url: String,
    pub key: Option<String>,
    /// Per-request timeout; 0 disables it
    pub timeout_seconds: u64,
    pub referer: Option<String>,
    pub title: String,
}

impl Default for FileApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            key: None,
            timeout_seconds: 120,
            referer: None,
            title: DEFAULT_TITLE.to_string(),
        }
    }
}

impl FileApiConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.timeout_seconds > 0).then(|| Duration::from_secs(self.timeout_seconds))
    }

    /// Non-blank API key, if any
    pub fn api_key(&self) -> Option<&str> {
        self.key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }

    pub fn settings(&self) -> Result<OpenRouterSettings, OpenRouterError> {
        let key = self.api_key().ok_or(OpenRouterError::MissingApiKey)?;
        Ok(OpenRouterSettings {
            api_key: key.to_string(),
            base_url: self.base_url.clone(),
            timeout: self.request_timeout(),
            referer: self.referer.clone().filter(|r| !r.is_empty()),
            title: Some(self.title.clone()).filter(|t| !t.is_empty()),
        })
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.timeout_seconds == 0 {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::ZeroTimeout,
                "api.timeout_seconds is 0; requests will never time out",
            ));
        }
        issues
    }

    /// Issues that only matter when requests are actually sent
    pub fn validate_for_requests(&self) -> Vec<ConfigIssue> {
        let mut issues = self.validate();
        if self.api_key().is_none() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::MissingApiKey,
                "no API key: set OPENROUTER_API_KEY or api.key",
            ));
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let api = FileApiConfig::default();
        assert_eq!(api.base_url, DEFAULT_BASE_URL);
        assert_eq!(api.request_timeout(), Some(Duration::from_secs(120)));
        assert!(api.validate().is_empty());
    }

    #[test]
    fn test_zero_timeout_warns_and_disables() {
        let api = FileApiConfig {
            timeout_seconds: 0,
            ..Default::default()
        };
        assert_eq!(api.request_timeout(), None);
        let issues = api.validate();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, ConfigIssueCode::ZeroTimeout);
        assert!(!issues[0].is_error());
    }

    #[test]
    fn test_blank_key_is_missing() {
        let api = FileApiConfig {
            key: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(matches!(api.settings(), Err(OpenRouterError::MissingApiKey)));
        assert!(
            api.validate_for_requests()
                .iter()
                .any(|i| i.code == ConfigIssueCode::MissingApiKey && i.is_error())
        );
    }

    #[test]
    fn test_settings_carry_fields() {
        let api = FileApiConfig {
            key: Some(" sk-1 ".to_string()),
            referer: Some("https://example.com".to_string()),
            title: String::new(),
            ..Default::default()
        };
        let settings = api.settings().unwrap();
        assert_eq!(settings.api_key, "sk-1");
        assert_eq!(settings.referer.as_deref(), Some("https://example.com"));
        assert_eq!(settings.title, None);
    }
}
