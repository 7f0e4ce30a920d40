//! Pulls candidate image prompts out of free-form chat text.
//!
//! A line counts as a suggestion when, after trimming, it starts with a bullet
//! (`-`, `--`, ...) or a list number (`1)`, `2.`, `3]`) followed by whitespace.
//! Everything else is ignored. This is a heuristic: prose that happens to look
//! like a list item is picked up too.

/// Returns the suggestions found in `text`, in line order, duplicates kept.
pub fn extract(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(suggestion_from_line)
        .map(str::to_string)
        .collect()
}

fn suggestion_from_line(line: &str) -> Option<&str> {
    let rest = strip_marker(line)?;
    let body = rest.strip_prefix(char::is_whitespace)?.trim();

    if body.is_empty() { None } else { Some(body) }
}

fn strip_marker(line: &str) -> Option<&str> {
    if line.starts_with('-') {
        return Some(line.trim_start_matches('-'));
    }

    let digits = line.find(|c: char| !c.is_ascii_digit())?;
    if digits == 0 {
        return None;
    }

    let rest = &line[digits..];
    rest.strip_prefix([')', '.', ']'])
}
