//! Conversation entities

use serde::{Deserialize, Serialize};

/// Role of a message in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Prefix used when a conversation is flattened into one prompt
    pub fn prefix(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Assistant => "ASSISTANT",
        }
    }
}

/// A message in a conversation (Entity)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Accumulated turns of one consensus conversation
///
/// The chat endpoint keeps no memory between calls, so every turn resends
/// the whole transcript flattened into a single user prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn add_user_message(&mut self, content: impl Into<String>) {
        self.messages.push(Message::user(content));
    }

    pub fn add_assistant_message(&mut self, content: impl Into<String>) {
        self.messages.push(Message::assistant(content));
    }

    /// `USER: ...` / `ASSISTANT: ...` blocks joined by blank lines.
    ///
    /// A transcript holding only the opening prompt flattens to that prompt
    /// verbatim.
    pub fn flatten(&self) -> String {
        if let [only] = self.messages.as_slice()
            && only.role == Role::User
        {
            return only.content.clone();
        }
        self.messages
            .iter()
            .map(|m| format!("{}: {}", m.role.prefix(), m.content))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}
