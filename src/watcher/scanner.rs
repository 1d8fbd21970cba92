//! Initial source tree scan.
//!
//! Walks the source directory once at startup and collects every
//! eligible note path, feeding the same conversion path as live watch
//! events.

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use super::filter::NoteFilter;

/// Recursively collect eligible note paths under the source root.
///
/// Hidden entries are skipped during the walk; the filter applies the
/// remaining exclusion rules. Paths are returned in sorted order so a
/// full run processes notes deterministically.
#[must_use]
pub fn scan_source(root: &Path, filter: &NoteFilter) -> Vec<PathBuf> {
    let mut notes = Vec::new();
    let mut found: u64 = 0;
    let mut skipped: u64 = 0;
    let mut errors: u64 = 0;

    let walker = WalkBuilder::new(root)
        .hidden(true)
        .git_ignore(true)
        .build();

    for entry in walker {
        match entry {
            Ok(entry) => {
                let path = entry.path();
                if path.is_dir() {
                    continue;
                }
                found += 1;

                if filter.is_eligible(path) {
                    notes.push(path.to_path_buf());
                } else {
                    skipped += 1;
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Error walking source tree");
                errors += 1;
            }
        }
    }

    notes.sort();

    tracing::info!(
        root = %root.display(),
        found,
        queued = notes.len(),
        skipped,
        errors,
        "Source scan complete"
    );

    notes
}
