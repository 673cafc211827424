//! User prompt value object

use super::error::DomainError;
use serde::{Deserialize, Serialize};

/// The prompt a user submits to every selected model (Value Object)
///
/// Always non-blank. Construction goes through [`UserPrompt::new`], which
/// reports a blank prompt as [`DomainError::InvalidPrompt`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserPrompt {
    content: String,
}

impl UserPrompt {
    pub fn new(content: impl Into<String>) -> Result<Self, DomainError> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(DomainError::InvalidPrompt(
                "prompt cannot be empty".to_string(),
            ));
        }
        Ok(Self { content })
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn into_content(self) -> String {
        self.content
    }
}

impl std::fmt::Display for UserPrompt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.content)
    }
}

impl TryFrom<String> for UserPrompt {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        UserPrompt::new(s)
    }
}

impl TryFrom<&str> for UserPrompt {
    type Error = DomainError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        UserPrompt::new(s)
    }
}

impl From<UserPrompt> for String {
    fn from(prompt: UserPrompt) -> Self {
        prompt.content
    }
}
