//! Per-model query outcome

use crate::core::model::ModelDescriptor;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outcome of querying one model (Value Object)
///
/// Always either success-complete (non-empty response, no error) or
/// failure-complete (empty response, error message). The constructors are
/// the only way to build one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub model: ModelDescriptor,
    pub success: bool,
    pub response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Provider usage metadata, passed through untouched
    #[serde(default)]
    pub usage: Value,
}

impl QueryResult {
    pub fn success(model: ModelDescriptor, response: impl Into<String>, usage: Value) -> Self {
        Self {
            model,
            success: true,
            response: response.into(),
            error: None,
            usage,
        }
    }

    pub fn failure(model: ModelDescriptor, error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            model,
            success: false,
            response: String::new(),
            error: Some(if error.is_empty() {
                "Unknown error occurred".to_string()
            } else {
                error
            }),
            usage: Value::Null,
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Keep only the successful results, preserving order.
pub fn successful(results: &[QueryResult]) -> Vec<QueryResult> {
    results.iter().filter(|r| r.success).cloned().collect()
}
