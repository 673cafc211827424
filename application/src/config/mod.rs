//! Application-level configuration.
//!
//! - [`GenerationParams`]: sampling parameters for every request
//! - [`RunParams`]: request timeout and consensus turn pacing

pub mod generation_params;
pub mod run_params;

pub use generation_params::GenerationParams;
pub use run_params::RunParams;
