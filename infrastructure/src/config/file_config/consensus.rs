//! Consensus conversation pacing (`[consensus]` section)

use serde::{Deserialize, Serialize};

/// Raw `[consensus]` configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConsensusConfig {
    /// Pause before each turn after the first, in milliseconds
    pub turn_cooldown_ms: u64,
}

impl Default for FileConsensusConfig {
    fn default() -> Self {
        Self {
            turn_cooldown_ms: 300,
        }
    }
}
