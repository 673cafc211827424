//! Infrastructure layer for polyllm
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, plus configuration and template loading.

pub mod config;
pub mod logging;
pub mod openrouter;
pub mod prompts;

// Re-export commonly used types
pub use config::{ConfigLoader, FileConfig};
pub use logging::JsonlConversationLogger;
pub use openrouter::{OpenRouterError, OpenRouterGateway, OpenRouterSettings};
pub use prompts::{TemplateError, load_consensus_template, load_conversion_template};
