//! Structured configuration issues.
//!
//! Validation never fails fast: every detected problem becomes a
//! [`ConfigIssue`] and the caller decides what to do with errors versus
//! warnings.

use std::fmt;

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The configuration cannot work.
    Error,
    /// Works, but probably not as intended.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigIssueCode {
    /// A model id is blank
    EmptyModelId,
    /// A selected model is not in the catalog (a descriptor will be generated)
    UnknownModel,
    /// Request timeout of zero seconds
    ZeroTimeout,
    /// Sampling parameter outside its valid range
    InvalidGenerationParam,
    /// Template file lacks a placeholder or section marker
    TemplateMissingMarker,
    /// Template file could not be read
    TemplateUnreadable,
    /// No API key from any source
    MissingApiKey,
}

/// A detected issue in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {}", level, self.message)
    }
}

/// True if any issue is an error.
pub fn has_errors(issues: &[ConfigIssue]) -> bool {
    issues.iter().any(ConfigIssue::is_error)
}
