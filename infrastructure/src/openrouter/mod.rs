//! OpenRouter-compatible chat-completion adapter
//!
//! Implements the [`ChatGateway`](polyllm_application::ChatGateway) port
//! over plain HTTPS JSON POST.

pub mod error;
pub mod gateway;

pub use error::OpenRouterError;
pub use gateway::{DEFAULT_BASE_URL, DEFAULT_TITLE, OpenRouterGateway, OpenRouterSettings};
