//! Prompt template files.
//!
//! Templates are optional: without a path the built-in text is used.

mod loader;

pub use loader::{TemplateError, load_consensus_template, load_conversion_template};
