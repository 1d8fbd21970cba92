//! Deterministic slug generation.
//!
//! Slugs are the join key between source notes and destination posts, so
//! identical input must always yield identical output across restarts.

/// Derive a URL-safe slug from arbitrary title text.
///
/// Lowercases the input, keeps Hangul syllables, ASCII letters and digits,
/// and collapses every other maximal run of characters into a single
/// hyphen. Leading and trailing hyphens are trimmed.
///
/// An all-symbol input collapses to an empty string; callers must treat
/// that as an error rather than accept an empty slug.
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;

    for ch in text.to_lowercase().chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() || is_hangul_syllable(ch) {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch);
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

const fn is_hangul_syllable(ch: char) -> bool {
    matches!(ch, '\u{AC00}'..='\u{D7A3}')
}
