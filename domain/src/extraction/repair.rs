//! Text-level repairs for almost-JSON model output
//!
//! Every pass here that touches structure is string-aware: characters inside
//! double-quoted strings are never treated as syntax.

use regex::Regex;
use std::sync::LazyLock;

static BARE_KEY: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"([{,])\s*([A-Za-z_][A-Za-z0-9_]*)\s*:").ok());

static SINGLE_QUOTED_VALUE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"([{,:\[]\s*)'([^']*)'").ok());

/// Body of the first markdown code fence, or the trimmed text without one.
pub fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(open) = text.find("```") else {
        return text;
    };
    let after_open = &text[open + 3..];
    // Skip the info string (`json`, `JSON5`, ...) up to the end of the line.
    let body_start = after_open.find('\n').map(|i| i + 1).unwrap_or(after_open.len());
    let body = &after_open[body_start..];
    match body.find("```") {
        Some(close) => body[..close].trim(),
        None => body.trim(),
    }
}

/// From the first `{` to the last `}` after it.
///
/// A truncated object with no closing brace yields everything from the
/// first `{` so the balancing pass can close it.
pub fn slice_object(text: &str) -> Option<&str> {
    let first = text.find('{')?;
    match text.rfind('}') {
        Some(last) if last > first => Some(&text[first..=last]),
        _ => Some(&text[first..]),
    }
}

/// Normalize the usual LLM formatting slips.
///
/// BOM and smart quotes, single-quoted JSON (only when the text contains no
/// double quote at all), comments, trailing commas before `}`/`]`, and
/// control characters other than tab, CR and LF.
pub fn clean_common_issues(text: &str) -> String {
    let mut cleaned: String = text
        .trim_start_matches('\u{feff}')
        .chars()
        .map(|c| match c {
            '\u{201C}' | '\u{201D}' => '"',
            '\u{2018}' | '\u{2019}' => '\'',
            other => other,
        })
        .collect();

    if cleaned.contains('\'') && !cleaned.contains('"') {
        cleaned = cleaned.replace('\'', "\"");
    }

    let cleaned = strip_comments(&cleaned);
    let cleaned = drop_trailing_commas(&cleaned);
    cleaned
        .chars()
        .filter(|c| !c.is_control() || matches!(c, '\t' | '\n' | '\r'))
        .collect()
}

/// Structural repair pass.
///
/// Quotes bare property names and single-quoted values, escapes raw line
/// breaks inside strings, then closes an unterminated string and any
/// unbalanced brackets or braces in nesting order.
pub fn repair(text: &str) -> String {
    let mut repaired = text.to_string();
    if let Some(re) = BARE_KEY.as_ref() {
        repaired = re.replace_all(&repaired, "$1\"$2\":").into_owned();
    }
    if let Some(re) = SINGLE_QUOTED_VALUE.as_ref() {
        repaired = re.replace_all(&repaired, "$1\"$2\"").into_owned();
    }
    let repaired = escape_newlines_in_strings(&repaired);
    balance_closers(&repaired)
}

/// Walk `text` calling `f(index, char, in_string)` for every char.
///
/// `in_string` is true for string content and the closing quote, false for
/// the opening quote and everything outside strings.
fn scan(text: &str, mut f: impl FnMut(usize, char, bool)) {
    let mut in_string = false;
    let mut escaped = false;
    for (i, c) in text.char_indices() {
        let was_in_string = in_string;
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
        } else if c == '"' {
            in_string = true;
        }
        f(i, c, was_in_string);
    }
}

fn strip_comments(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut skip_until: Option<usize> = None;
    let mut line_comment = false;

    scan(text, |i, c, in_string| {
        if let Some(end) = skip_until {
            if i < end {
                return;
            }
            skip_until = None;
        }
        if line_comment {
            if c == '\n' {
                line_comment = false;
                out.push(c);
            }
            return;
        }
        if !in_string && c == '/' {
            match bytes.get(i + 1) {
                Some(b'/') => {
                    line_comment = true;
                    return;
                }
                Some(b'*') => {
                    let end = text[i + 2..]
                        .find("*/")
                        .map(|off| i + 2 + off + 2)
                        .unwrap_or(text.len());
                    skip_until = Some(end);
                    return;
                }
                _ => {}
            }
        }
        out.push(c);
    });
    out
}

fn drop_trailing_commas(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    scan(text, |i, c, in_string| {
        if !in_string && c == ',' {
            let next = text[i + 1..].chars().find(|n| !n.is_whitespace());
            if matches!(next, Some('}') | Some(']')) {
                return;
            }
        }
        out.push(c);
    });
    out
}

fn escape_newlines_in_strings(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    scan(text, |_, c, in_string| match (in_string, c) {
        (true, '\n') => out.push_str("\\n"),
        (true, '\r') => out.push_str("\\r"),
        _ => out.push(c),
    });
    out
}

fn balance_closers(text: &str) -> String {
    let mut stack: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;
    for c in text.chars() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => stack.push('}'),
            '[' => stack.push(']'),
            '}' | ']' => {
                if stack.last() == Some(&c) {
                    stack.pop();
                }
            }
            _ => {}
        }
    }

    let mut out = text.trim_end().to_string();
    if in_string {
        out.push('"');
    }
    // A dangling comma would survive the closers we append.
    if out.ends_with(',') {
        out.pop();
    }
    while let Some(closer) = stack.pop() {
        out.push(closer);
    }
    out
}
