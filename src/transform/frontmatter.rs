//! Frontmatter parsing and post metadata derivation.
//!
//! Takes the raw text of a source note and derives the destination post:
//! marker stripping, YAML metadata parsing, category/date/tag/thumbnail
//! resolution, media rewriting, and destination document rendering.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::error::TransformError;
use crate::Result;

use super::media::rewrite_media;
use super::slug::slugify;

/// Category path used when a note declares no category.
pub const DEFAULT_CATEGORY: &str = "uncategorized";

/// Directory under the content root that holds all posts.
const POSTS_DIR: &str = "posts";

static ISO_DATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static TAG_SPLIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[,\s]+").unwrap());

/// Raw metadata block of a source note.
#[derive(Debug, Default, Deserialize)]
struct NoteHeader {
    title: Option<String>,
    category: Option<String>,
    slug: Option<String>,
    tags: Option<TagField>,
    date: Option<serde_yaml::Value>,
    thumbnail: Option<String>,
    draft: Option<bool>,
}

/// Tags may be a YAML sequence or a single delimited string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TagField {
    Many(Vec<String>),
    One(String),
}

/// Minimal view of an existing destination post's metadata.
#[derive(Debug, Deserialize)]
struct ExistingHeader {
    views: Option<u64>,
}

/// Derived metadata for a destination post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostMeta {
    pub title: String,
    pub slug: String,
    pub date: String,
    pub tags: Vec<String>,
    pub category: Option<String>,
    pub thumbnail: Option<String>,
    pub draft: bool,
    pub views: u64,
}

impl PostMeta {
    /// Normalized category path segments for this post.
    #[must_use]
    pub fn category_path(&self) -> Vec<String> {
        let segments: Vec<String> = self
            .category
            .as_deref()
            .map(category_segments)
            .unwrap_or_default()
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect();

        if segments.is_empty() {
            vec![DEFAULT_CATEGORY.to_string()]
        } else {
            segments
        }
    }

    /// Destination path relative to the content root.
    #[must_use]
    pub fn relative_path(&self) -> PathBuf {
        let mut path = PathBuf::from(POSTS_DIR);
        for segment in self.category_path() {
            path.push(segment);
        }
        path.push(format!("{}.md", self.slug));
        path
    }
}

/// A fully derived destination post: metadata plus rewritten body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDocument {
    pub meta: PostMeta,
    pub body: String,
}

impl PostDocument {
    /// Render the destination file: metadata block followed by the body.
    ///
    /// Field order is fixed; optional fields are omitted entirely when
    /// absent.
    #[must_use]
    pub fn render(&self) -> String {
        let meta = &self.meta;
        let mut out = String::new();

        out.push_str("---\n");
        out.push_str(&format!("title: \"{}\"\n", escape(&meta.title)));
        out.push_str(&format!("slug: \"{}\"\n", escape(&meta.slug)));
        out.push_str(&format!("date: {}\n", meta.date));

        let tags = meta
            .tags
            .iter()
            .map(|t| format!("\"{}\"", escape(t)))
            .collect::<Vec<_>>()
            .join(", ");
        out.push_str(&format!("tags: [{tags}]\n"));

        if let Some(category) = &meta.category {
            out.push_str(&format!("category: \"{}\"\n", escape(category)));
        }
        if let Some(thumbnail) = &meta.thumbnail {
            out.push_str(&format!("thumbnail: \"{}\"\n", escape(thumbnail)));
        }

        out.push_str(&format!("draft: {}\n", meta.draft));
        out.push_str(&format!("views: {}\n", meta.views));
        out.push_str("---\n\n");

        out.push_str(&self.body);
        if !out.ends_with('\n') {
            out.push('\n');
        }

        out
    }
}

/// Why a note was skipped rather than converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Raw text does not contain the marker token.
    NoMarker,
    /// Metadata block has no usable title.
    MissingTitle,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoMarker => write!(f, "missing marker token"),
            Self::MissingTitle => write!(f, "missing title"),
        }
    }
}

/// Result of converting a source note.
#[derive(Debug)]
pub enum TransformOutcome {
    /// Note converted to a destination post.
    Post(PostDocument),
    /// Note is not eligible; not an error.
    Skipped(SkipReason),
}

/// Convert a source note's raw text into a destination post.
///
/// The marker token is stripped from the whole text before metadata
/// parsing. The `views` field is left at zero; the sync engine fills it
/// from any existing destination file.
///
/// # Errors
///
/// Returns `TransformError::Frontmatter` on a malformed metadata block
/// and `TransformError::EmptySlug` when the title or slug override
/// collapses to nothing.
pub fn transform_note(raw: &str, marker: &str, source_path: &Path) -> Result<TransformOutcome> {
    if !raw.contains(marker) {
        return Ok(TransformOutcome::Skipped(SkipReason::NoMarker));
    }

    let stripped = raw.replace(marker, "");
    let text = stripped.trim();

    let (header, body) = match split_frontmatter(text) {
        Some((header_text, body)) => (parse_header(header_text)?, body),
        None => (NoteHeader::default(), text),
    };

    let Some(title) = header.title.as_deref().map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(TransformOutcome::Skipped(SkipReason::MissingTitle));
    };

    let slug_source = header.slug.as_deref().unwrap_or(title);
    let slug = slugify(slug_source);
    if slug.is_empty() {
        return Err(TransformError::EmptySlug {
            title: slug_source.to_string(),
        }
        .into());
    }

    let date = resolve_date(header.date.as_ref(), source_path);
    let tags = resolve_tags(header.tags);
    let (body, first_image) = rewrite_media(body.trim_start());
    let thumbnail = header
        .thumbnail
        .filter(|t| !t.trim().is_empty())
        .or(first_image);

    Ok(TransformOutcome::Post(PostDocument {
        meta: PostMeta {
            title: title.to_string(),
            slug,
            date,
            tags,
            category: header.category,
            thumbnail,
            draft: header.draft.unwrap_or(false),
            views: 0,
        },
        body,
    }))
}

/// Split a `---`-fenced metadata block off the top of a document.
///
/// Returns `None` when the document carries no metadata block.
#[must_use]
pub fn split_frontmatter(text: &str) -> Option<(&str, &str)> {
    let mut lines = text.split_inclusive('\n');
    let first = lines.next()?;
    if first.trim_end() != "---" {
        return None;
    }

    let header_start = first.len();
    let mut pos = header_start;
    for line in lines {
        if line.trim_end() == "---" {
            let header = &text[header_start..pos];
            let body = &text[pos + line.len()..];
            return Some((header, body));
        }
        pos += line.len();
    }

    None
}

/// Read the preserved view-count from an existing destination file.
///
/// Total: any unreadable file, missing block, or non-numeric value
/// yields zero.
#[must_use]
pub fn read_existing_views(path: &Path) -> u64 {
    let Ok(text) = fs::read_to_string(path) else {
        return 0;
    };
    let Some((header, _)) = split_frontmatter(text.trim_start()) else {
        return 0;
    };

    serde_yaml::from_str::<ExistingHeader>(header)
        .ok()
        .and_then(|h| h.views)
        .unwrap_or(0)
}

fn parse_header(header_text: &str) -> Result<NoteHeader> {
    if header_text.trim().is_empty() {
        return Ok(NoteHeader::default());
    }

    serde_yaml::from_str(header_text)
        .map_err(|e| TransformError::Frontmatter(e.to_string()).into())
}

/// Normalize a category string into destination path segments.
///
/// A category with a separator contributes exactly two segments; deeper
/// nesting is truncated to the first two.
fn category_segments(category: &str) -> Vec<String> {
    let mut parts = category.split('/');
    let parent = parts.next().unwrap_or(category);

    parts.next().map_or_else(
        || vec![clean_segment(parent)],
        |child| vec![clean_segment(parent), clean_segment(child)],
    )
}

/// Lowercase a segment, drop dots, collapse whitespace runs to hyphens.
fn clean_segment(segment: &str) -> String {
    let lowered = segment.to_lowercase().replace('.', "");
    WHITESPACE_RE.replace_all(lowered.trim(), "-").into_owned()
}

/// Resolve a note's date to a `YYYY-MM-DD` string.
///
/// Total: an explicit ISO date passes through, other parseable values
/// reformat in local terms, and anything else falls back to the file's
/// creation time or the current date.
fn resolve_date(value: Option<&serde_yaml::Value>, source_path: &Path) -> String {
    if let Some(text) = value.and_then(date_value_text) {
        let text = text.trim().to_string();
        if ISO_DATE_RE.is_match(&text) {
            return text;
        }
        if let Some(formatted) = parse_loose_date(&text) {
            return formatted;
        }
    }

    creation_date(source_path).unwrap_or_else(|| Local::now().format("%Y-%m-%d").to_string())
}

fn date_value_text(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_loose_date(text: &str) -> Option<String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Local).format("%Y-%m-%d").to_string());
    }

    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(dt.format("%Y-%m-%d").to_string());
        }
    }

    for fmt in ["%Y/%m/%d", "%Y.%m.%d", "%B %d, %Y", "%d %B %Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(text, fmt) {
            return Some(date.format("%Y-%m-%d").to_string());
        }
    }

    None
}

fn creation_date(path: &Path) -> Option<String> {
    let created = fs::metadata(path).ok()?.created().ok()?;
    let local: DateTime<Local> = created.into();
    Some(local.format("%Y-%m-%d").to_string())
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

fn resolve_tags(field: Option<TagField>) -> Vec<String> {
    match field {
        None => Vec::new(),
        Some(TagField::Many(tags)) => tags,
        Some(TagField::One(text)) => TAG_SPLIT_RE
            .split(&text)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect(),
    }
}
