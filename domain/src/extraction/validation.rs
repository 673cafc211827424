//! Structural validation of extracted classification data
//!
//! Validation is separate from extraction and never stops at the first
//! problem: every violation is collected into one [`ValidationReport`].

use serde_json::Value;
use thiserror::Error;

/// Payload shape announced by the `formatVersion` tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatVersion {
    /// Canonical `modelPositions` map per theme
    V1,
    /// Simplified `models: [{name, stance}]` array per theme
    V2,
}

impl FormatVersion {
    /// Read the tag. A missing tag means `v1`.
    pub fn detect(value: &Value) -> Result<Self, String> {
        match value.get("formatVersion") {
            None | Some(Value::Null) => Ok(FormatVersion::V1),
            Some(Value::String(s)) if s.eq_ignore_ascii_case("v1") => Ok(FormatVersion::V1),
            Some(Value::String(s)) if s.eq_ignore_ascii_case("v2") => Ok(FormatVersion::V2),
            Some(other) => Err(format!("Unsupported formatVersion {}", other)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FormatVersion::V1 => "v1",
            FormatVersion::V2 => "v2",
        }
    }
}

/// All structural violations found in one payload
#[derive(Error, Debug, Clone, Default, PartialEq, Eq)]
#[error("Invalid JSON structure: {}", .errors.join(", "))]
pub struct ValidationReport {
    pub errors: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn push(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
    }

    pub fn into_result(self) -> Result<(), ValidationReport> {
        if self.is_valid() { Ok(()) } else { Err(self) }
    }
}

fn has_text(theme: &Value, field: &str) -> bool {
    theme
        .get(field)
        .and_then(Value::as_str)
        .is_some_and(|s| !s.trim().is_empty())
}

/// Check the raw classification payload.
///
/// Requires a `themes` array whose elements each carry a `name`, a
/// `statement` and, depending on the format version, an object-typed
/// `modelPositions` (v1) or an array-typed `models` (v2).
pub fn validate_classification(value: &Value) -> ValidationReport {
    let mut report = ValidationReport::default();

    let version = match FormatVersion::detect(value) {
        Ok(version) => Some(version),
        Err(message) => {
            report.push(message);
            None
        }
    };

    let Some(themes) = value.get("themes").and_then(Value::as_array) else {
        report.push("Missing or invalid \"themes\" array");
        return report;
    };

    for (index, theme) in themes.iter().enumerate() {
        let n = index + 1;
        if !theme.is_object() {
            report.push(format!("Theme {}: not an object", n));
            continue;
        }
        if !has_text(theme, "name") {
            report.push(format!("Theme {}: missing name", n));
        }
        if !has_text(theme, "statement") {
            report.push(format!("Theme {}: missing statement", n));
        }
        match version {
            Some(FormatVersion::V1) => {
                if !theme.get("modelPositions").is_some_and(Value::is_object) {
                    report.push(format!("Theme {}: missing or invalid modelPositions", n));
                }
            }
            Some(FormatVersion::V2) => match theme.get("models").and_then(Value::as_array) {
                Some(models) => {
                    for (m, entry) in models.iter().enumerate() {
                        if !has_text(entry, "name") {
                            report.push(format!("Theme {}: model {} missing name", n, m + 1));
                        }
                    }
                }
                None => report.push(format!("Theme {}: missing or invalid models", n)),
            },
            None => {}
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_v1_payload() {
        let value = json!({
            "themes": [{"name": "Cost", "statement": "Matters", "modelPositions": {}}]
        });
        assert!(validate_classification(&value).is_valid());
    }

    #[test]
    fn test_missing_themes() {
        let report = validate_classification(&json!({"insights": {}}));
        assert_eq!(report.errors, vec!["Missing or invalid \"themes\" array"]);
    }

    #[test]
    fn test_collects_all_violations() {
        let value = json!({
            "themes": [
                {"statement": "s", "modelPositions": {}},
                {"name": "n", "modelPositions": []},
                {"name": "ok", "statement": "ok", "modelPositions": {}}
            ]
        });
        let report = validate_classification(&value);
        assert_eq!(
            report.errors,
            vec![
                "Theme 1: missing name",
                "Theme 2: missing statement",
                "Theme 2: missing or invalid modelPositions",
            ]
        );
        assert_eq!(
            report.to_string(),
            "Invalid JSON structure: Theme 1: missing name, Theme 2: missing statement, Theme 2: missing or invalid modelPositions"
        );
    }

    #[test]
    fn test_v2_payload() {
        let value = json!({
            "formatVersion": "v2",
            "themes": [
                {"name": "a", "statement": "b", "models": [{"name": "X", "stance": "agree"}]},
                {"name": "c", "statement": "d", "modelPositions": {}}
            ]
        });
        let report = validate_classification(&value);
        assert_eq!(report.errors, vec!["Theme 2: missing or invalid models"]);
    }

    #[test]
    fn test_unknown_format_version() {
        let value = json!({"formatVersion": "v9", "themes": []});
        let report = validate_classification(&value);
        assert_eq!(report.errors, vec!["Unsupported formatVersion \"v9\""]);
    }

    #[test]
    fn test_into_result() {
        assert!(ValidationReport::default().into_result().is_ok());
        let report = validate_classification(&json!({}));
        assert!(report.into_result().is_err());
    }
}
