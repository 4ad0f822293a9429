//! Snippet windowing for search results
//!
//! All offsets are in characters. Bodies are matched against a folded copy
//! whose characters line up one-to-one with the original, so an offset found
//! in the folded text indexes the original text directly.

/// Characters kept before the earliest matched term
pub const CONTEXT_BEFORE: usize = 70;

/// Characters kept after the end of the earliest matched term
pub const CONTEXT_AFTER: usize = 130;

/// Length of the body preview shown for title-only matches
pub const PREVIEW_CHARS: usize = 150;

const ELLIPSIS: &str = "...";

/// Lowercases text one character at a time, keeping character offsets
/// aligned with the input
pub fn fold(text: &str) -> String {
    text.chars()
        .map(|c| c.to_lowercase().next().unwrap_or(c))
        .collect()
}

/// Builds a window of `body` around the earliest occurrence of any term
///
/// `folded_body` must be `fold(body)` and `terms` must already be folded.
/// Returns None if no term occurs in the body.
pub fn body_snippet(body: &str, folded_body: &str, terms: &[String]) -> Option<String> {
    let (start_char, term_chars) = terms
        .iter()
        .filter_map(|term| {
            folded_body
                .find(term.as_str())
                .map(|byte| (folded_body[..byte].chars().count(), term.chars().count()))
        })
        .min_by_key(|&(offset, _)| offset)?;

    let total = body.chars().count();
    let from = start_char.saturating_sub(CONTEXT_BEFORE);
    let to = (start_char + term_chars + CONTEXT_AFTER).min(total);

    let mut snippet = String::new();
    if from > 0 {
        snippet.push_str(ELLIPSIS);
    }
    snippet.extend(body.chars().skip(from).take(to - from));
    if to < total {
        snippet.push_str(ELLIPSIS);
    }
    Some(snippet)
}

/// Explains a match that only hit the title
pub fn title_snippet(title: &str, body: &str) -> String {
    if body.is_empty() {
        return format!("Matched in title \"{}\". Page content is unavailable.", title);
    }

    let mut preview: String = body.chars().take(PREVIEW_CHARS).collect();
    if body.chars().count() > PREVIEW_CHARS {
        preview.push_str(ELLIPSIS);
    }
    format!("Matched in title \"{}\". Preview: {}", title, preview)
}
