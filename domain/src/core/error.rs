//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("No models selected")]
    NoModels,

    #[error("No successful responses available for consensus generation")]
    NoSuccessfulResponses,

    #[error("Invalid prompt: {0}")]
    InvalidPrompt(String),

    #[error("Unknown model: {0}")]
    UnknownModel(String),

    #[error("Duplicate codename '{codename}' for models {first} and {second}")]
    DuplicateCodename {
        codename: String,
        first: String,
        second: String,
    },

    #[error("Operation cancelled")]
    Cancelled,
}

impl DomainError {
    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DomainError::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancelled_error_display() {
        let error = DomainError::Cancelled;
        assert_eq!(error.to_string(), "Operation cancelled");
    }

    #[test]
    fn test_is_cancelled_check() {
        assert!(DomainError::Cancelled.is_cancelled());
        assert!(!DomainError::NoModels.is_cancelled());
        assert!(!DomainError::NoSuccessfulResponses.is_cancelled());
        assert!(!DomainError::InvalidPrompt("empty".to_string()).is_cancelled());
    }

    #[test]
    fn test_duplicate_codename_display() {
        let error = DomainError::DuplicateCodename {
            codename: "llm-!".to_string(),
            first: "a".to_string(),
            second: "b".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Duplicate codename 'llm-!' for models a and b"
        );
    }
}
