//! Recover a JSON object from free-text model output

use super::error::ExtractionError;
use super::repair::{clean_common_issues, repair, slice_object, strip_code_fences};
use super::sanitize::sanitize_value;
use serde_json::Value;

/// Which attempt produced the value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStage {
    /// The trimmed input was already valid JSON
    Direct,
    /// Valid after removing a markdown code fence
    Unfenced,
    /// Valid after slicing from the first `{` to the last `}`
    Sliced,
    /// Valid after the cleanup and repair passes
    Repaired,
    /// Accepted only by the tolerant JSON5 grammar
    Json5,
}

/// Extract and sanitize the JSON object in `raw`.
///
/// Attempts run in order and stop at the first success: direct parse,
/// fence stripping, brace slicing, cleanup and repair, then a JSON5 parse.
/// Every string leaf of the result is sanitized.
pub fn extract_json(raw: &str) -> Result<Value, ExtractionError> {
    extract_json_with_stage(raw).map(|(value, _)| value)
}

/// Like [`extract_json`], also reporting which attempt succeeded.
pub fn extract_json_with_stage(raw: &str) -> Result<(Value, ExtractionStage), ExtractionError> {
    let trimmed = raw.trim().trim_start_matches('\u{feff}');
    let mut non_object: Option<&'static str> = None;

    match parse_object(trimmed) {
        Parsed::Object(v) => return Ok((sanitize_value(v), ExtractionStage::Direct)),
        Parsed::Other(kind) => non_object = Some(kind),
        Parsed::Invalid(_) => {}
    }

    let unfenced = strip_code_fences(trimmed);
    if let Parsed::Object(v) = parse_object(unfenced) {
        return Ok((sanitize_value(v), ExtractionStage::Unfenced));
    }

    let source = if unfenced.contains('{') { unfenced } else { trimmed };
    let Some(slice) = slice_object(source) else {
        return Err(match non_object {
            Some(found) => ExtractionError::NotAnObject {
                raw: raw.to_string(),
                found,
            },
            None => ExtractionError::NoJsonObject {
                raw: raw.to_string(),
            },
        });
    };

    let first_error = match parse_object(slice) {
        Parsed::Object(v) => return Ok((sanitize_value(v), ExtractionStage::Sliced)),
        Parsed::Invalid(e) => e,
        Parsed::Other(kind) => kind.to_string(),
    };

    // A truncated object's last `}` closes an inner value, so the open tail
    // is repaired before the brace slice.
    let mut candidates: Vec<&str> = Vec::with_capacity(2);
    if let Some(start) = source.find('{')
        && &source[start..] != slice
    {
        candidates.push(&source[start..]);
    }
    candidates.push(slice);

    let mut repaired_candidates: Vec<String> = Vec::with_capacity(candidates.len() * 2);
    for candidate in &candidates {
        let cleaned = clean_common_issues(candidate);
        if let Parsed::Object(v) = parse_object(&cleaned) {
            return Ok((sanitize_value(v), ExtractionStage::Repaired));
        }
        let repaired = repair(&cleaned);
        if let Parsed::Object(v) = parse_object(&repaired) {
            return Ok((sanitize_value(v), ExtractionStage::Repaired));
        }
        repaired_candidates.push(cleaned);
        repaired_candidates.push(repaired);
    }

    let json5_inputs = candidates
        .iter()
        .copied()
        .chain(repaired_candidates.iter().map(String::as_str));
    for input in json5_inputs {
        if let Ok(v @ Value::Object(_)) = json5::from_str::<Value>(input) {
            return Ok((sanitize_value(v), ExtractionStage::Json5));
        }
    }

    Err(ExtractionError::Unparseable {
        raw: raw.to_string(),
        reason: first_error,
    })
}

enum Parsed {
    Object(Value),
    Other(&'static str),
    Invalid(String),
}

fn parse_object(text: &str) -> Parsed {
    match serde_json::from_str::<Value>(text) {
        Ok(v @ Value::Object(_)) => Parsed::Object(v),
        Ok(Value::Array(_)) => Parsed::Other("array"),
        Ok(Value::String(_)) => Parsed::Other("string"),
        Ok(Value::Number(_)) => Parsed::Other("number"),
        Ok(Value::Bool(_)) => Parsed::Other("boolean"),
        Ok(Value::Null) => Parsed::Other("null"),
        Err(e) => Parsed::Invalid(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_clean_input_is_unchanged() {
        let text = r#"{"themes": [{"name": "Safety", "statement": "Important", "modelPositions": {}}]}"#;
        let (value, stage) = extract_json_with_stage(text).unwrap();
        assert_eq!(stage, ExtractionStage::Direct);
        assert_eq!(value, serde_json::from_str::<Value>(text).unwrap());
    }

    #[test]
    fn test_fenced_json_with_trailing_comma() {
        let text = "```json\n{\n  \"themes\": [\n    {\"name\": \"a\", \"statement\": \"b\",}\n  ],\n}\n```";
        let value = extract_json(text).unwrap();
        assert_eq!(value, json!({"themes": [{"name": "a", "statement": "b"}]}));
    }

    #[test]
    fn test_fenced_valid_json() {
        let (value, stage) = extract_json_with_stage("```json\n{\"a\": 1}\n```").unwrap();
        assert_eq!(stage, ExtractionStage::Unfenced);
        assert_eq!(value, json!({"a": 1}));
    }

    #[test]
    fn test_prose_around_object() {
        let (value, stage) =
            extract_json_with_stage("Here is the analysis:\n{\"a\": [1, 2]}\nHope it helps!")
                .unwrap();
        assert_eq!(stage, ExtractionStage::Sliced);
        assert_eq!(value, json!({"a": [1, 2]}));
    }

    #[test]
    fn test_single_quoted_object() {
        let value = extract_json("{'name': 'Safety', 'importance': 'high'}").unwrap();
        assert_eq!(value, json!({"name": "Safety", "importance": "high"}));
    }

    #[test]
    fn test_smart_quotes() {
        let value = extract_json("{\u{201C}name\u{201D}: \u{201C}Cost\u{201D}}").unwrap();
        assert_eq!(value, json!({"name": "Cost"}));
    }

    #[test]
    fn test_truncated_object_is_closed() {
        let value = extract_json(r#"{"themes": [{"name": "a"}, {"name": "b""#).unwrap();
        assert_eq!(value["themes"][1]["name"], "b");
    }

    #[test]
    fn test_json5_fallback() {
        let (value, stage) =
            extract_json_with_stage(r#"{note: 'say "hi"', count: 2}"#).unwrap();
        assert_eq!(stage, ExtractionStage::Json5);
        assert_eq!(value["note"], "say \"hi\"");
        assert_eq!(value["count"].as_f64(), Some(2.0));
    }

    #[test]
    fn test_output_is_sanitized() {
        let value = extract_json(r#"{"name": "<script>alert(1)</script>"}"#).unwrap();
        assert_eq!(value["name"], "[FILTERED]");
    }

    #[test]
    fn test_no_object_carries_raw_text() {
        let err = extract_json("I could not produce JSON, sorry.").unwrap_err();
        assert!(matches!(err, ExtractionError::NoJsonObject { .. }));
        assert_eq!(err.raw(), "I could not produce JSON, sorry.");
    }

    #[test]
    fn test_array_is_not_an_object() {
        let err = extract_json("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, ExtractionError::NotAnObject { found: "array", .. }));
    }

    #[test]
    fn test_hopeless_input() {
        let err = extract_json("{ this is : not [ json ) at all }").unwrap_err();
        assert!(matches!(err, ExtractionError::Unparseable { .. }));
        assert!(err.to_string().starts_with("JSON extraction failed"));
    }
}
