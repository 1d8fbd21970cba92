//! Source note exclusion filtering.
//!
//! A path qualifies for conversion only when it is a markdown file, no
//! segment below the source root is hidden or a template directory, and
//! the filename does not contain "template".

use std::path::{Component, Path, PathBuf};

/// Directory names that hold templates rather than notes.
const TEMPLATE_DIRS: &[&str] = &["template", "templates", "_templates"];

/// Path-level eligibility filter for source notes.
#[derive(Debug, Clone)]
pub struct NoteFilter {
    root: PathBuf,
}

impl NoteFilter {
    /// Create a filter rooted at the watched source directory.
    ///
    /// Segments are checked relative to the root, so a hidden directory
    /// in the root's own ancestry does not exclude the whole tree.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Check whether a source path qualifies for conversion.
    #[must_use]
    pub fn is_eligible(&self, path: &Path) -> bool {
        if path.extension().and_then(|e| e.to_str()) != Some("md") {
            return false;
        }

        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        for component in relative.components() {
            let Component::Normal(name) = component else {
                continue;
            };
            let name = name.to_string_lossy();

            if name.starts_with('.') {
                return false;
            }
            if TEMPLATE_DIRS.iter().any(|d| name.eq_ignore_ascii_case(d)) {
                return false;
            }
        }

        path.file_stem()
            .is_some_and(|stem| !stem.to_string_lossy().to_lowercase().contains("template"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> NoteFilter {
        NoteFilter::new("/vault")
    }

    #[test]
    fn test_plain_note_is_eligible() {
        assert!(filter().is_eligible(Path::new("/vault/ideas/post.md")));
    }

    #[test]
    fn test_non_markdown_excluded() {
        assert!(!filter().is_eligible(Path::new("/vault/image.png")));
        assert!(!filter().is_eligible(Path::new("/vault/script.sh")));
    }

    #[test]
    fn test_hidden_segments_excluded() {
        assert!(!filter().is_eligible(Path::new("/vault/.trash/post.md")));
        assert!(!filter().is_eligible(Path::new("/vault/notes/.hidden.md")));
    }

    #[test]
    fn test_hidden_root_ancestry_allowed() {
        let filter = NoteFilter::new("/home/user/.vault");
        assert!(filter.is_eligible(Path::new("/home/user/.vault/notes/post.md")));
    }

    #[test]
    fn test_template_directories_excluded() {
        assert!(!filter().is_eligible(Path::new("/vault/Templates/daily.md")));
        assert!(!filter().is_eligible(Path::new("/vault/template/daily.md")));
        assert!(!filter().is_eligible(Path::new("/vault/_templates/daily.md")));
    }

    #[test]
    fn test_template_filename_excluded() {
        assert!(!filter().is_eligible(Path::new("/vault/notes/My Template Note.md")));
        assert!(!filter().is_eligible(Path::new("/vault/notes/post-TEMPLATE.md")));
    }
}
