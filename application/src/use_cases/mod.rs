//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod convert_analytics;
pub mod query_models;
pub mod run_consensus;
pub mod run_pipeline;
pub(crate) mod shared;
