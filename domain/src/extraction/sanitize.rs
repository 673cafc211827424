//! Redaction of executable-looking substrings in extracted data

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// Replacement for every redacted match
pub const FILTERED: &str = "[FILTERED]";

static DANGEROUS_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [r"(?is)<script\b.*?</script>", r"(?i)javascript:", r"(?i)on\w+\s*="]
        .iter()
        .filter_map(|p| Regex::new(p).ok())
        .collect()
});

/// Redact script tags, `javascript:` URLs and inline event handlers.
pub fn sanitize_str(text: &str) -> String {
    let mut cleaned = text.to_string();
    for pattern in DANGEROUS_PATTERNS.iter() {
        if pattern.is_match(&cleaned) {
            cleaned = pattern.replace_all(&cleaned, FILTERED).into_owned();
        }
    }
    cleaned
}

/// Recursively sanitize every string leaf. Object keys are left alone.
pub fn sanitize_value(value: Value) -> Value {
    match value {
        Value::String(s) => Value::String(sanitize_str(&s)),
        Value::Array(items) => Value::Array(items.into_iter().map(sanitize_value).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, sanitize_value(v)))
                .collect(),
        ),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_script_tag_redacted() {
        assert_eq!(
            sanitize_str("before <SCRIPT>alert(1)</script> after"),
            "before [FILTERED] after"
        );
    }

    #[test]
    fn test_javascript_url_redacted() {
        assert_eq!(sanitize_str("JavaScript:void(0)"), "[FILTERED]void(0)");
    }

    #[test]
    fn test_event_handler_redacted() {
        assert_eq!(sanitize_str("<img onerror = x>"), "<img [FILTERED] x>");
    }

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(sanitize_str("Models agree on safety"), "Models agree on safety");
    }

    #[test]
    fn test_sanitize_nested_value() {
        let value = json!({
            "themes": [{"name": "<script>x</script>", "score": 3}],
            "onclick=": "kept key"
        });
        let cleaned = sanitize_value(value);
        assert_eq!(cleaned["themes"][0]["name"], "[FILTERED]");
        assert_eq!(cleaned["themes"][0]["score"], 3);
        assert_eq!(cleaned["onclick="], "kept key");
    }
}
