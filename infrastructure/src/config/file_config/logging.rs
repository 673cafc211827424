//! Conversation transcript (`[logging]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw `[logging]` configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL file receiving every prompt and response; unset disables it
    pub conversation_log: Option<PathBuf>,
}
