//! Error types for the OpenRouter adapter

use thiserror::Error;

/// Errors raised while building the HTTP gateway.
///
/// Per-request failures are reported through
/// [`GatewayError`](polyllm_application::GatewayError) instead.
#[derive(Error, Debug)]
pub enum OpenRouterError {
    #[error("No API key configured (set OPENROUTER_API_KEY or [api].key)")]
    MissingApiKey,

    #[error("Invalid API key format")]
    InvalidApiKey,

    #[error("Invalid header value for {0}")]
    InvalidHeader(&'static str),

    #[error("Failed to create HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
