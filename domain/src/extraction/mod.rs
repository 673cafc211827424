//! Structured-data extraction.
//!
//! - [`extractor::extract_json`]: recover a JSON object from model output
//! - [`validation::validate_classification`]: collect structural violations
//! - [`sanitize`]: redact executable-looking substrings

pub mod error;
pub mod extractor;
pub mod repair;
pub mod sanitize;
pub mod validation;

pub use error::ExtractionError;
pub use extractor::{ExtractionStage, extract_json, extract_json_with_stage};
pub use validation::{FormatVersion, ValidationReport, validate_classification};
