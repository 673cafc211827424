//! Core domain concepts shared across all subdomains.
//!
//! - [`model::ModelDescriptor`] / [`model::ModelCatalog`]: models that can be queried
//! - [`question::UserPrompt`]: a validated prompt to fan out
//! - [`error::DomainError`]: domain-level errors

pub mod error;
pub mod model;
pub mod question;
pub mod string;
