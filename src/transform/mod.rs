//! Note-to-post transformation.
//!
//! This module converts a raw markdown note into a normalized destination
//! post:
//! - Slug derivation from titles or explicit overrides
//! - Frontmatter parsing and metadata derivation
//! - Embedded media reference rewriting

mod frontmatter;
mod media;
mod slug;

pub use frontmatter::{
    read_existing_views, split_frontmatter, transform_note, PostDocument, PostMeta, SkipReason,
    TransformOutcome,
};
pub use media::rewrite_media;
pub use slug::slugify;
