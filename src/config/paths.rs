//! Filesystem root resolution.
//!
//! User-supplied paths may carry a leading `~` and redundant segments;
//! both roots must resolve to existing directories before a session starts.

use std::path::{Component, Path, PathBuf};

use crate::{Error, Result};

/// Expand a user-supplied path string into a normalized absolute path.
///
/// A leading `~` is replaced with the user's home directory. Redundant
/// `.` and `..` segments are resolved lexically, without touching the
/// filesystem.
#[must_use]
pub fn expand_path(input: &str) -> PathBuf {
    let expanded = if input == "~" {
        dirs::home_dir().unwrap_or_else(|| PathBuf::from(input))
    } else if let Some(rest) = input.strip_prefix("~/") {
        dirs::home_dir().map_or_else(|| PathBuf::from(input), |home| home.join(rest))
    } else {
        PathBuf::from(input)
    };

    normalize(&expanded)
}

/// Resolve a user-supplied path to an existing directory.
///
/// # Errors
///
/// Returns `Error::Config` if the expanded path does not exist or is not
/// a directory.
pub fn resolve_dir(input: &str) -> Result<PathBuf> {
    let path = expand_path(input);

    if !path.is_dir() {
        return Err(Error::config(format!(
            "directory not found: {}",
            path.display()
        )));
    }

    Ok(path)
}

/// Lexically normalize a path and absolutize it against the current
/// working directory.
fn normalize(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
    };

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }

    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_expand_tilde() {
        let Some(home) = dirs::home_dir() else {
            return;
        };

        assert_eq!(expand_path("~"), normalize(&home));
        assert_eq!(expand_path("~/notes"), normalize(&home.join("notes")));
    }

    #[test]
    fn test_normalize_redundant_segments() {
        let path = expand_path("/var/data/./notes/../posts");
        assert_eq!(path, PathBuf::from("/var/data/posts"));
    }

    #[test]
    fn test_relative_path_absolutized() {
        let path = expand_path("notes");
        assert!(path.is_absolute());
        assert!(path.ends_with("notes"));
    }

    #[test]
    fn test_resolve_dir_existing() {
        let tmp = TempDir::new().unwrap();
        let resolved = resolve_dir(tmp.path().to_str().unwrap()).unwrap();
        assert!(resolved.is_dir());
    }

    #[test]
    fn test_resolve_dir_missing() {
        let err = resolve_dir("/nonexistent/devlog-sync-test").unwrap_err();
        assert!(err.to_string().contains("directory not found"));
    }

    #[test]
    fn test_resolve_dir_rejects_file() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("note.md");
        std::fs::write(&file, "hello").unwrap();

        assert!(resolve_dir(file.to_str().unwrap()).is_err());
    }
}
