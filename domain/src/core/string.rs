//! Text helpers for log lines and terminal previews.

/// Single-line preview of `s`: whitespace runs collapse to one space and the
/// result is cut to at most `max_chars` characters, ending in `...` when cut.
pub fn preview(s: &str, max_chars: usize) -> String {
    let collapsed = s.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        return collapsed;
    }
    let keep = max_chars.saturating_sub(3);
    let mut out: String = collapsed.chars().take(keep).collect();
    out.push_str("...");
    out
}
