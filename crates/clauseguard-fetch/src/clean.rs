//! Whitespace cleanup and length bounds for scraped page text.

/// Maximum chars kept after cleaning; bounds the prompt's token cost.
pub const MAX_TEXT_CHARS: usize = 25_000;

/// Minimum chars for an extraction to count as a real document.
pub const MIN_TEXT_CHARS: usize = 80;

/// Collapse repeated whitespace and truncate to [`MAX_TEXT_CHARS`].
///
/// Runs of spaces and tabs collapse to one space, runs of blank lines to a
/// single blank line. Truncation is char-based, never mid-codepoint.
pub fn clean_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len().min(MAX_TEXT_CHARS));
    let mut blank_run = 0usize;

    for line in raw.lines() {
        let collapsed = collapse_spaces(line.trim());
        if collapsed.is_empty() {
            blank_run += 1;
            continue;
        }
        if !out.is_empty() {
            out.push('\n');
            if blank_run > 0 {
                out.push('\n');
            }
        }
        blank_run = 0;
        out.push_str(&collapsed);
    }

    truncate_chars(&out, MAX_TEXT_CHARS)
}

fn collapse_spaces(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut in_space = false;
    for ch in line.chars() {
        if ch == ' ' || ch == '\t' {
            if !in_space && !out.is_empty() {
                out.push(' ');
            }
            in_space = true;
        } else {
            in_space = false;
            out.push(ch);
        }
    }
    out.trim_end().to_string()
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
