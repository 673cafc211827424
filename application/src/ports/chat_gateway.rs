//! Chat gateway port
//!
//! Defines the interface for one-shot chat-completion calls to an LLM
//! provider. The transport keeps no conversation memory: multi-turn context
//! is flattened into the prompt by the caller.

use crate::config::GenerationParams;
use async_trait::async_trait;
use polyllm_domain::ModelDescriptor;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during a chat-completion call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// Non-2xx status. `message` is the provider's error message, if any.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Invalid response format - {0}")]
    InvalidResponse(String),

    #[error("Empty response content")]
    EmptyContent,

    #[error("Request timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("Other error: {0}")]
    Other(String),
}

/// A single chat-completion request
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub model: ModelDescriptor,
    /// Sent as the only user message
    pub prompt: String,
    pub params: GenerationParams,
}

impl ChatRequest {
    pub fn new(model: ModelDescriptor, prompt: impl Into<String>, params: GenerationParams) -> Self {
        Self {
            model,
            prompt: prompt.into(),
            params,
        }
    }

    /// `min(model.max_output_tokens, provider ceiling)`
    pub fn max_tokens(&self) -> u32 {
        self.model.clamp_output_tokens(self.params.max_tokens_ceiling)
    }
}

/// A successful completion
#[derive(Debug, Clone, PartialEq)]
pub struct ChatCompletion {
    /// Non-empty message content
    pub content: String,
    /// Provider usage metadata, `{}` when absent
    pub usage: Value,
}

/// Gateway for chat-completion calls
///
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait ChatGateway: Send + Sync {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion, GatewayError>;
}
