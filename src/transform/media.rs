//! Embedded media reference rewriting.
//!
//! Source notes embed images in two shapes: wiki-style `![[target]]`
//! embeds and standard `![alt](target)` references. Either may carry a
//! trailing `|width` size modifier. The rewrite normalizes both shapes
//! and is idempotent: rewritten output passes through unchanged.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static MEDIA_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[\[([^\]]+)\]\]|!\[([^\]]*)\]\(([^)]+)\)").unwrap());

/// Rewrite media references in a note body.
///
/// Returns the rewritten body and the first externally-hosted image URL
/// discovered, used as the thumbnail fallback.
///
/// - A reference with a `|width` modifier becomes an explicit sized
///   `<img>` element.
/// - A wiki embed without a modifier becomes a standard reference.
/// - A standard reference without a modifier is left as-is, except an
///   empty alt text is filled from the last path segment.
#[must_use]
pub fn rewrite_media(body: &str) -> (String, Option<String>) {
    let mut first_image: Option<String> = None;

    let rewritten = MEDIA_RE.replace_all(body, |caps: &Captures| {
        if let Some(wiki) = caps.get(1) {
            let (target, width) = split_width(wiki.as_str());
            record_external(&mut first_image, target);

            match width {
                Some(width) => sized_image(target, &alt_text("", target), width),
                None => format!("![{target}]({target})"),
            }
        } else {
            let alt_raw = caps.get(2).map_or("", |m| m.as_str());
            let target = caps.get(3).map_or("", |m| m.as_str());
            let (alt_stripped, width) = split_width(alt_raw);
            record_external(&mut first_image, target);

            match width {
                Some(width) => sized_image(target, &alt_text(alt_stripped, target), width),
                None if alt_raw.is_empty() => {
                    format!("![{}]({target})", alt_text("", target))
                }
                None => caps.get(0).map_or(String::new(), |m| m.as_str().to_string()),
            }
        }
    });

    (rewritten.into_owned(), first_image)
}

/// Split a trailing `|width` modifier off a wiki target or alt text.
fn split_width(text: &str) -> (&str, Option<&str>) {
    match text.rsplit_once('|') {
        Some((rest, width))
            if !width.is_empty() && width.bytes().all(|b| b.is_ascii_digit()) =>
        {
            (rest, Some(width))
        }
        _ => (text, None),
    }
}

/// Derive alt text from the modifier-stripped alt, the last path segment,
/// or the literal word "image".
fn alt_text(stripped_alt: &str, target: &str) -> String {
    let alt = stripped_alt.trim();
    if !alt.is_empty() {
        return alt.to_string();
    }

    let segment = target
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or("")
        .trim();

    if segment.is_empty() {
        "image".to_string()
    } else {
        segment.to_string()
    }
}

fn sized_image(target: &str, alt: &str, width: &str) -> String {
    format!(r#"<img src="{target}" alt="{alt}" width="{width}" />"#)
}

fn record_external(first_image: &mut Option<String>, target: &str) {
    if first_image.is_none()
        && (target.starts_with("https://") || target.starts_with("http://"))
    {
        *first_image = Some(target.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wiki_embed_with_width() {
        let (out, _) = rewrite_media("![[diagram.png|400]]");
        assert_eq!(out, r#"<img src="diagram.png" alt="diagram.png" width="400" />"#);
    }

    #[test]
    fn test_standard_with_width_on_alt() {
        let (out, _) = rewrite_media("![flow chart|320](https://cdn.example.com/flow.png)");
        assert_eq!(
            out,
            r#"<img src="https://cdn.example.com/flow.png" alt="flow chart" width="320" />"#
        );
    }

    #[test]
    fn test_wiki_embed_without_width_becomes_standard() {
        let (out, _) = rewrite_media("![[assets/photo.jpg]]");
        assert_eq!(out, "![assets/photo.jpg](assets/photo.jpg)");
    }

    #[test]
    fn test_standard_reference_left_alone() {
        let body = "![cover](https://img.example.com/cover.png)";
        let (out, _) = rewrite_media(body);
        assert_eq!(out, body);
    }

    #[test]
    fn test_empty_alt_filled_from_path() {
        let (out, _) = rewrite_media("![](https://img.example.com/shot.png)");
        assert_eq!(out, "![shot.png](https://img.example.com/shot.png)");
    }

    #[test]
    fn test_alt_fallback_to_image() {
        let (out, _) = rewrite_media("![[https://cdn.example.com/|200]]");
        assert_eq!(
            out,
            r#"<img src="https://cdn.example.com/" alt="image" width="200" />"#
        );
    }

    #[test]
    fn test_first_external_image_skips_local() {
        let body = "![[local.png]]\n![remote](https://cdn.example.com/a.png)";
        let (_, first) = rewrite_media(body);
        assert_eq!(first.as_deref(), Some("https://cdn.example.com/a.png"));
    }

    #[test]
    fn test_no_external_image() {
        let (_, first) = rewrite_media("![[local.png]] and plain text");
        assert_eq!(first, None);
    }

    #[test]
    fn test_non_numeric_pipe_is_not_a_width() {
        let (out, _) = rewrite_media("![a|b](x.png)");
        assert_eq!(out, "![a|b](x.png)");
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let bodies = [
            "![[diagram.png|400]]",
            "![[assets/photo.jpg]]",
            "![](https://img.example.com/shot.png)",
            "![flow|320](https://cdn.example.com/flow.png)",
            "intro\n![[a.png]] text ![b](b.png)\noutro",
        ];

        for body in bodies {
            let (once, _) = rewrite_media(body);
            let (twice, _) = rewrite_media(&once);
            assert_eq!(once, twice, "rewrite not idempotent for '{body}'");
        }
    }
}
