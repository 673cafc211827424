//! Extraction error types

use thiserror::Error;

/// No recoverable JSON object could be found in a model response
///
/// Carries the original raw text so a caller can offer manual repair.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("JSON extraction failed: No JSON object found in response")]
    NoJsonObject { raw: String },

    #[error("JSON extraction failed: {reason}")]
    Unparseable { raw: String, reason: String },

    #[error("JSON extraction failed: expected an object, found {found}")]
    NotAnObject { raw: String, found: &'static str },
}

impl ExtractionError {
    /// The text that could not be parsed
    pub fn raw(&self) -> &str {
        match self {
            ExtractionError::NoJsonObject { raw }
            | ExtractionError::Unparseable { raw, .. }
            | ExtractionError::NotAnObject { raw, .. } => raw,
        }
    }
}
