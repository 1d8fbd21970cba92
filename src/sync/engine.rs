//! The sync state machine.
//!
//! Reacts to source file events, decides create/update/move/delete,
//! keeps the destination index consistent with the filesystem, and
//! reconciles orphans after the initial scan. Per-file failures are
//! logged and never abort the session.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::ReconcileMode;
use crate::index::PostIndex;
use crate::transform::{read_existing_views, slugify, transform_note, TransformOutcome};
use crate::watcher::{FileEvent, NoteFilter};
use crate::Result;

/// Engine construction parameters.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Watched source root.
    pub source_root: PathBuf,
    /// Destination content root.
    pub content_root: PathBuf,
    /// Marker token a note must contain.
    pub marker: String,
    /// Orphan reconciliation behavior.
    pub mode: ReconcileMode,
}

/// Per-session sync counters.
#[derive(Debug, Default, Clone, Copy)]
pub struct SyncStats {
    pub notes_synced: u64,
    pub notes_skipped: u64,
    pub posts_removed: u64,
    pub errors: u64,
}

/// What a single event did to the destination tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Destination post written at this path.
    Written(PathBuf),
    /// Note ineligible; destination untouched.
    Skipped,
    /// Destination post removed from this path.
    Removed(PathBuf),
    /// Delete event with no correlated destination post.
    Ignored,
}

/// Result of orphan reconciliation.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReconcileReport {
    pub removed_posts: u64,
    pub pruned_dirs: u64,
}

/// One-directional sync engine.
///
/// Exclusively owns the destination index and all run-local state; one
/// event is processed to completion before the next.
#[derive(Debug)]
pub struct SyncEngine {
    content_root: PathBuf,
    marker: String,
    mode: ReconcileMode,
    filter: NoteFilter,
    index: PostIndex,
    /// Source paths converted this run.
    processed: HashSet<PathBuf>,
    /// Source path to the slug it last produced; makes delete and
    /// slug-change correlation exact within a run.
    source_slugs: HashMap<PathBuf, String>,
    /// Slugs written this run; a startup-indexed slug never touched is
    /// an orphan.
    touched: HashSet<String>,
    startup_slugs: HashSet<String>,
    stats: SyncStats,
}

impl SyncEngine {
    /// Create an engine, building the destination index with a full
    /// scan of the content tree.
    ///
    /// # Errors
    ///
    /// Returns an error if the destination tree cannot be scanned.
    pub fn new(config: EngineConfig) -> Result<Self> {
        let index = PostIndex::scan(&config.content_root)?;
        let startup_slugs = index.slugs();

        Ok(Self {
            content_root: config.content_root,
            marker: config.marker,
            mode: config.mode,
            filter: NoteFilter::new(config.source_root),
            index,
            processed: HashSet::new(),
            source_slugs: HashMap::new(),
            touched: HashSet::new(),
            startup_slugs,
            stats: SyncStats::default(),
        })
    }

    /// Process one watcher event. Errors are logged per file; the
    /// session continues.
    pub fn handle_event(&mut self, event: &FileEvent) {
        let result = match event {
            FileEvent::Modified(path) => self.sync_note(path),
            FileEvent::Deleted(path) => self.remove_note(path),
        };

        if let Err(e) = result {
            self.stats.errors += 1;
            tracing::error!(
                path = %event.path().display(),
                error = %e,
                "Failed to process event"
            );
        }
    }

    /// Convert one source note and write its destination post.
    ///
    /// # Errors
    ///
    /// Returns an error on transform failure or destination I/O
    /// failure; callers at the event boundary log and continue.
    pub fn sync_note(&mut self, path: &Path) -> Result<SyncOutcome> {
        if !self.filter.is_eligible(path) {
            tracing::debug!(path = %path.display(), "Path excluded");
            self.stats.notes_skipped += 1;
            return Ok(SyncOutcome::Skipped);
        }

        let raw = fs::read_to_string(path)?;
        let mut doc = match transform_note(&raw, &self.marker, path)? {
            TransformOutcome::Post(doc) => doc,
            TransformOutcome::Skipped(reason) => {
                tracing::debug!(path = %path.display(), %reason, "Note skipped");
                self.stats.notes_skipped += 1;
                return Ok(SyncOutcome::Skipped);
            }
        };

        let slug = doc.meta.slug.clone();
        let dest = self.content_root.join(doc.meta.relative_path());

        // A slug moving between categories leaves a stale file behind.
        if let Some(old_path) = self.index.lookup(&slug).map(Path::to_path_buf) {
            if old_path != dest {
                self.remove_post_file(&old_path)?;
                self.index.remove(&slug);
                tracing::info!(old = %old_path.display(), "Removed relocated post");
            }
        }

        // A retitled note produces a new slug; drop the old slug's post.
        if let Some(previous) = self.source_slugs.get(path).cloned() {
            if previous != slug {
                if let Some(stale) = self.index.remove(&previous) {
                    self.remove_post_file(&stale)?;
                    self.touched.remove(&previous);
                    tracing::info!(slug = %previous, "Removed post for retitled note");
                }
            }
        }

        doc.meta.views = read_existing_views(&dest);

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&dest, doc.render())?;

        self.index.set(slug.clone(), dest.clone());
        self.touched.insert(slug.clone());
        self.processed.insert(path.to_path_buf());
        self.source_slugs.insert(path.to_path_buf(), slug);
        self.stats.notes_synced += 1;

        tracing::info!(source = %path.display(), dest = %dest.display(), "Synced note");
        Ok(SyncOutcome::Written(dest))
    }

    /// Handle a source deletion: remove the correlated destination post.
    ///
    /// Correlation uses the exact source-to-slug mapping when this run
    /// converted the path, falling back to filename-stem slugification.
    ///
    /// # Errors
    ///
    /// Returns an error if the destination file cannot be removed.
    pub fn remove_note(&mut self, path: &Path) -> Result<SyncOutcome> {
        let slug = match self.source_slugs.remove(path) {
            Some(slug) => slug,
            None => {
                let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().into_owned())
                else {
                    return Ok(SyncOutcome::Ignored);
                };
                let candidate = slugify(&stem);
                if candidate.is_empty() || self.index.lookup(&candidate).is_none() {
                    tracing::debug!(path = %path.display(), "No post correlates with deleted note");
                    return Ok(SyncOutcome::Ignored);
                }
                candidate
            }
        };

        self.processed.remove(path);
        self.touched.remove(&slug);

        if let Some(dest) = self.index.remove(&slug) {
            self.remove_post_file(&dest)?;
            self.stats.posts_removed += 1;
            tracing::info!(
                source = %path.display(),
                dest = %dest.display(),
                "Removed post for deleted note"
            );
            return Ok(SyncOutcome::Removed(dest));
        }

        Ok(SyncOutcome::Ignored)
    }

    /// Reconcile orphans after the initial scan.
    ///
    /// Aggressive mode removes every startup-indexed post whose slug was
    /// not re-written this run; conservative mode only prunes now-empty
    /// destination directories.
    pub fn reconcile(&mut self) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        if self.mode == ReconcileMode::Aggressive {
            let orphans: Vec<String> = self
                .startup_slugs
                .iter()
                .filter(|slug| !self.touched.contains(*slug))
                .cloned()
                .collect();

            for slug in orphans {
                let Some(dest) = self.index.remove(&slug) else {
                    continue;
                };
                match self.remove_post_file(&dest) {
                    Ok(()) => {
                        report.removed_posts += 1;
                        tracing::info!(slug = %slug, dest = %dest.display(), "Removed orphaned post");
                    }
                    Err(e) => {
                        self.stats.errors += 1;
                        tracing::error!(dest = %dest.display(), error = %e, "Failed to remove orphan");
                    }
                }
            }
        }

        report.pruned_dirs = self.prune_empty_dirs();
        self.stats.posts_removed += report.removed_posts;

        tracing::info!(
            mode = ?self.mode,
            removed = report.removed_posts,
            pruned = report.pruned_dirs,
            "Reconciliation complete"
        );
        report
    }

    /// Destination index, reflecting the filesystem after every
    /// operation.
    #[must_use]
    pub const fn index(&self) -> &PostIndex {
        &self.index
    }

    /// Exclusion filter for the watched source root.
    #[must_use]
    pub const fn filter(&self) -> &NoteFilter {
        &self.filter
    }

    /// Counters for this run.
    #[must_use]
    pub const fn stats(&self) -> SyncStats {
        self.stats
    }

    /// Number of distinct source paths converted this run.
    #[must_use]
    pub fn processed_count(&self) -> usize {
        self.processed.len()
    }

    /// Remove a destination file and climb away emptied category
    /// directories.
    fn remove_post_file(&self, dest: &Path) -> Result<()> {
        if dest.exists() {
            fs::remove_file(dest)?;
        }

        let mut dir = dest.parent();
        while let Some(d) = dir {
            if d == self.content_root || !is_empty_dir(d) || fs::remove_dir(d).is_err() {
                break;
            }
            dir = d.parent();
        }

        Ok(())
    }

    /// Remove every empty directory under the content root.
    fn prune_empty_dirs(&self) -> u64 {
        let mut pruned = 0;

        let walker = walkdir::WalkDir::new(&self.content_root)
            .contents_first(true)
            .into_iter()
            .filter_map(std::result::Result::ok);

        for entry in walker {
            let path = entry.path();
            if path == self.content_root || !entry.file_type().is_dir() {
                continue;
            }
            if is_empty_dir(path) && fs::remove_dir(path).is_ok() {
                tracing::debug!(path = %path.display(), "Pruned empty directory");
                pruned += 1;
            }
        }

        pruned
    }
}

fn is_empty_dir(path: &Path) -> bool {
    fs::read_dir(path).is_ok_and(|mut entries| entries.next().is_none())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct Fixture {
        source: TempDir,
        content: TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                source: TempDir::new().unwrap(),
                content: TempDir::new().unwrap(),
            }
        }

        fn engine(&self, mode: ReconcileMode) -> SyncEngine {
            SyncEngine::new(EngineConfig {
                source_root: self.source.path().to_path_buf(),
                content_root: self.content.path().to_path_buf(),
                marker: "#devlog".to_string(),
                mode,
            })
            .unwrap()
        }

        fn write_note(&self, name: &str, content: &str) -> PathBuf {
            let path = self.source.path().join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, content).unwrap();
            path
        }

        fn post_path(&self, rel: &str) -> PathBuf {
            self.content.path().join(rel)
        }
    }

    #[test]
    fn test_sync_note_writes_post() {
        let fx = Fixture::new();
        let note = fx.write_note("hello.md", "---\ntitle: Hello World\n---\n#devlog\nBody.\n");
        let mut engine = fx.engine(ReconcileMode::Conservative);

        let outcome = engine.sync_note(&note).unwrap();
        let dest = fx.post_path("posts/uncategorized/hello-world.md");
        assert_eq!(outcome, SyncOutcome::Written(dest.clone()));
        assert!(dest.is_file());
        assert_eq!(engine.index().lookup("hello-world"), Some(dest.as_path()));
        assert_eq!(engine.stats().notes_synced, 1);
    }

    #[test]
    fn test_unmarked_note_is_skipped() {
        let fx = Fixture::new();
        let note = fx.write_note("plain.md", "---\ntitle: Plain\n---\nNo marker here.\n");
        let mut engine = fx.engine(ReconcileMode::Conservative);

        let outcome = engine.sync_note(&note).unwrap();
        assert_eq!(outcome, SyncOutcome::Skipped);
        assert!(engine.index().is_empty());
        assert!(!fx.post_path("posts").exists());
    }

    #[test]
    fn test_excluded_path_never_read() {
        let fx = Fixture::new();
        let note = fx.write_note(
            "Templates/daily.md",
            "---\ntitle: Daily\n---\n#devlog\n",
        );
        let mut engine = fx.engine(ReconcileMode::Conservative);

        let outcome = engine.sync_note(&note).unwrap();
        assert_eq!(outcome, SyncOutcome::Skipped);
        assert!(engine.index().is_empty());
    }

    #[test]
    fn test_views_preserved_across_resync() {
        let fx = Fixture::new();
        let note = fx.write_note("hello.md", "---\ntitle: Hello\n---\n#devlog\nBody.\n");
        let mut engine = fx.engine(ReconcileMode::Conservative);

        engine.sync_note(&note).unwrap();
        let dest = fx.post_path("posts/uncategorized/hello.md");
        let first = fs::read_to_string(&dest).unwrap();
        assert!(first.contains("views: 0\n"));

        // An external consumer bumps the counter between runs.
        fs::write(&dest, first.replace("views: 0", "views: 7")).unwrap();

        engine.sync_note(&note).unwrap();
        let second = fs::read_to_string(&dest).unwrap();
        assert!(second.contains("views: 7\n"));
    }

    #[test]
    fn test_resync_is_byte_identical_except_views() {
        let fx = Fixture::new();
        let note = fx.write_note(
            "stable.md",
            "---\ntitle: Stable\ndate: 2024-02-02\n---\n#devlog\nBody.\n",
        );
        let mut engine = fx.engine(ReconcileMode::Conservative);

        engine.sync_note(&note).unwrap();
        let dest = fx.post_path("posts/uncategorized/stable.md");
        let first = fs::read_to_string(&dest).unwrap();

        engine.sync_note(&note).unwrap();
        let second = fs::read_to_string(&dest).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_slug_change_leaves_single_post() {
        let fx = Fixture::new();
        let note = fx.write_note("post.md", "---\ntitle: Old Title\n---\n#devlog\n");
        let mut engine = fx.engine(ReconcileMode::Conservative);

        engine.sync_note(&note).unwrap();
        assert!(fx.post_path("posts/uncategorized/old-title.md").is_file());

        fx.write_note("post.md", "---\ntitle: New Title\n---\n#devlog\n");
        engine.sync_note(&note).unwrap();

        assert!(!fx.post_path("posts/uncategorized/old-title.md").exists());
        assert!(fx.post_path("posts/uncategorized/new-title.md").is_file());
        assert!(engine.index().lookup("old-title").is_none());
        assert!(engine.index().lookup("new-title").is_some());
        assert_eq!(engine.index().len(), 1);
    }

    #[test]
    fn test_category_change_moves_post() {
        let fx = Fixture::new();
        let note = fx.write_note("post.md", "---\ntitle: Post\ncategory: Dev\n---\n#devlog\n");
        let mut engine = fx.engine(ReconcileMode::Conservative);

        engine.sync_note(&note).unwrap();
        assert!(fx.post_path("posts/dev/post.md").is_file());

        fx.write_note(
            "post.md",
            "---\ntitle: Post\ncategory: Backend/Node\n---\n#devlog\n",
        );
        engine.sync_note(&note).unwrap();

        assert!(!fx.post_path("posts/dev/post.md").exists());
        assert!(!fx.post_path("posts/dev").exists());
        assert!(fx.post_path("posts/backend/node/post.md").is_file());
        assert_eq!(
            engine.index().lookup("post"),
            Some(fx.post_path("posts/backend/node/post.md").as_path())
        );
    }

    #[test]
    fn test_delete_event_removes_post() {
        let fx = Fixture::new();
        let note = fx.write_note("gone.md", "---\ntitle: Gone\n---\n#devlog\n");
        let mut engine = fx.engine(ReconcileMode::Conservative);

        engine.sync_note(&note).unwrap();
        fs::remove_file(&note).unwrap();

        let outcome = engine.remove_note(&note).unwrap();
        let dest = fx.post_path("posts/uncategorized/gone.md");
        assert_eq!(outcome, SyncOutcome::Removed(dest.clone()));
        assert!(!dest.exists());
        assert!(engine.index().lookup("gone").is_none());
    }

    #[test]
    fn test_delete_falls_back_to_stem_correlation() {
        let fx = Fixture::new();
        // Post exists from a previous run; this engine never synced it.
        let dest = fx.post_path("posts/uncategorized/legacy-note.md");
        fs::create_dir_all(dest.parent().unwrap()).unwrap();
        fs::write(
            &dest,
            "---\ntitle: \"Legacy Note\"\nslug: \"legacy-note\"\nviews: 3\n---\n\nbody\n",
        )
        .unwrap();

        let mut engine = fx.engine(ReconcileMode::Conservative);
        let outcome = engine
            .remove_note(&fx.source.path().join("Legacy Note.md"))
            .unwrap();

        assert_eq!(outcome, SyncOutcome::Removed(dest.clone()));
        assert!(!dest.exists());
    }

    #[test]
    fn test_delete_without_correlation_is_ignored() {
        let fx = Fixture::new();
        let mut engine = fx.engine(ReconcileMode::Conservative);
        let outcome = engine
            .remove_note(&fx.source.path().join("unknown.md"))
            .unwrap();
        assert_eq!(outcome, SyncOutcome::Ignored);
    }

    #[test]
    fn test_aggressive_reconcile_removes_untouched_posts() {
        let fx = Fixture::new();
        let stale = fx.post_path("posts/uncategorized/stale.md");
        fs::create_dir_all(stale.parent().unwrap()).unwrap();
        fs::write(
            &stale,
            "---\ntitle: \"Stale\"\nslug: \"stale\"\nviews: 0\n---\n\nold\n",
        )
        .unwrap();

        let note = fx.write_note("fresh.md", "---\ntitle: Fresh\n---\n#devlog\n");
        let mut engine = fx.engine(ReconcileMode::Aggressive);
        engine.sync_note(&note).unwrap();

        let report = engine.reconcile();
        assert_eq!(report.removed_posts, 1);
        assert!(!stale.exists());
        assert!(fx.post_path("posts/uncategorized/fresh.md").is_file());
        assert!(engine.index().lookup("stale").is_none());
    }

    #[test]
    fn test_conservative_reconcile_keeps_posts() {
        let fx = Fixture::new();
        let existing = fx.post_path("posts/uncategorized/kept.md");
        fs::create_dir_all(existing.parent().unwrap()).unwrap();
        fs::write(
            &existing,
            "---\ntitle: \"Kept\"\nslug: \"kept\"\nviews: 0\n---\n\nbody\n",
        )
        .unwrap();
        let empty = fx.post_path("posts/empty-category");
        fs::create_dir_all(&empty).unwrap();

        let mut engine = fx.engine(ReconcileMode::Conservative);
        let report = engine.reconcile();

        assert_eq!(report.removed_posts, 0);
        assert!(existing.is_file());
        assert!(!empty.exists());
        assert_eq!(report.pruned_dirs, 1);
    }

    #[test]
    fn test_handle_event_isolates_errors() {
        let fx = Fixture::new();
        let mut engine = fx.engine(ReconcileMode::Conservative);

        // Eligible-looking path that does not exist: the read fails, the
        // engine logs and keeps going.
        engine.handle_event(&FileEvent::Modified(fx.source.path().join("missing.md")));
        assert_eq!(engine.stats().errors, 1);

        let note = fx.write_note("ok.md", "---\ntitle: Ok\n---\n#devlog\n");
        engine.handle_event(&FileEvent::Modified(note));
        assert_eq!(engine.stats().notes_synced, 1);
    }
}
