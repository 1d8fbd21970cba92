//! Destination post index.
//!
//! In-memory mapping from slug to destination file path. Built once at
//! startup by scanning the destination tree, then kept current by the
//! sync engine as posts are written and removed. The engine is the only
//! mutator; after every engine operation the index reflects the actual
//! filesystem state.

use std::collections::HashMap;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use walkdir::WalkDir;

use crate::transform::split_frontmatter;
use crate::Result;

/// Stored metadata needed to recover a post's slug during the scan.
#[derive(Debug, Deserialize)]
struct StoredHeader {
    slug: Option<String>,
}

/// Slug-to-path mapping over the destination tree.
#[derive(Debug, Default)]
pub struct PostIndex {
    posts: HashMap<String, PathBuf>,
}

impl PostIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the index by recursively scanning the destination tree.
    ///
    /// Each markdown file's slug is read from its stored metadata.
    /// Files without a readable slug are skipped with a warning. On a
    /// duplicate slug the later entry wins by traversal order.
    ///
    /// # Errors
    ///
    /// Returns an error if the root itself cannot be walked; individual
    /// unreadable entries are logged and skipped.
    pub fn scan(root: &Path) -> Result<Self> {
        let mut index = Self::new();

        for entry in WalkDir::new(root) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(error = %e, "Error walking destination tree");
                    continue;
                }
            };

            let path = entry.path();
            if !entry.file_type().is_file() || path.extension().and_then(|e| e.to_str()) != Some("md")
            {
                continue;
            }

            match read_slug(path) {
                Some(slug) => {
                    index.posts.insert(slug, path.to_path_buf());
                }
                None => {
                    tracing::warn!(path = %path.display(), "Destination file has no readable slug, ignoring");
                }
            }
        }

        tracing::info!(root = %root.display(), posts = index.len(), "Destination index built");
        Ok(index)
    }

    /// Look up the destination path for a slug.
    #[must_use]
    pub fn lookup(&self, slug: &str) -> Option<&Path> {
        self.posts.get(slug).map(PathBuf::as_path)
    }

    /// Record a slug's destination path.
    pub fn set(&mut self, slug: impl Into<String>, path: impl Into<PathBuf>) {
        self.posts.insert(slug.into(), path.into());
    }

    /// Drop a slug's entry, returning its path if present.
    pub fn remove(&mut self, slug: &str) -> Option<PathBuf> {
        self.posts.remove(slug)
    }

    /// Number of indexed posts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.posts.len()
    }

    /// Whether the index holds no posts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Snapshot of all indexed slugs, for orphan bookkeeping.
    #[must_use]
    pub fn slugs(&self) -> HashSet<String> {
        self.posts.keys().cloned().collect()
    }
}

/// Read a destination file's slug from its stored metadata.
fn read_slug(path: &Path) -> Option<String> {
    let text = fs::read_to_string(path).ok()?;
    let (header, _) = split_frontmatter(text.trim_start())?;
    serde_yaml::from_str::<StoredHeader>(header)
        .ok()?
        .slug
        .filter(|s| !s.is_empty())
}
