//! Prompt domain
//!
//! Templates for the consensus conversation and the structured-data
//! conversion call.

pub mod conversion;
pub mod template;

pub use conversion::{ConversionFormat, ConversionPromptTemplate};
pub use template::{ConsensusPromptTemplate, ModelOutput};
