//! Sampling parameters sent with every chat-completion request.

use serde::{Deserialize, Serialize};

/// Sampling parameters for a chat-completion request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub temperature: f32,
    pub top_p: f32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
    /// Provider-wide cap applied on top of each model's own output limit.
    pub max_tokens_ceiling: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.9,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
            max_tokens_ceiling: 16_000,
        }
    }
}

impl GenerationParams {
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens_ceiling(mut self, ceiling: u32) -> Self {
        self.max_tokens_ceiling = ceiling;
        self
    }
}
