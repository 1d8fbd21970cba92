//! File system watcher using notify-rs.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::{new_debouncer, DebouncedEventKind, Debouncer};
use parking_lot::Mutex;
use tokio::sync::mpsc;

use super::events::{EventBatch, FileEvent};
use crate::error::WatcherError;
use crate::Result;

/// Debounce duration for file events.
const DEBOUNCE_DURATION: Duration = Duration::from_millis(500);

/// File watcher configuration.
#[derive(Debug, Clone)]
pub struct WatcherConfig {
    /// Directories to watch.
    pub watch_dirs: Vec<PathBuf>,
    /// Debounce duration.
    pub debounce: Duration,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            watch_dirs: Vec::new(),
            debounce: DEBOUNCE_DURATION,
        }
    }
}

/// File system watcher emitting debounced event batches.
///
/// The debouncer reports touched paths without distinguishing writes
/// from removals; a path that no longer exists when the batch is built
/// is reported as deleted.
pub struct FileWatcher {
    _debouncer: Debouncer<RecommendedWatcher>,
    event_rx: mpsc::Receiver<EventBatch>,
    watched_dirs: Arc<Mutex<Vec<PathBuf>>>,
}

impl FileWatcher {
    /// Create a new file watcher.
    ///
    /// # Errors
    ///
    /// Returns an error if the watcher cannot be created.
    pub fn new(config: &WatcherConfig) -> Result<Self> {
        let (batch_tx, event_rx) = mpsc::channel(100);
        let watched_dirs = Arc::new(Mutex::new(Vec::new()));
        let watched_dirs_clone = Arc::clone(&watched_dirs);

        let debouncer = new_debouncer(
            config.debounce,
            move |result: std::result::Result<
                Vec<notify_debouncer_mini::DebouncedEvent>,
                notify::Error,
            >| {
                match result {
                    Ok(events) => {
                        let mut batch = EventBatch::new();
                        for event in events {
                            if !matches!(event.kind, DebouncedEventKind::Any) {
                                continue;
                            }

                            let under_watched = {
                                let dirs = watched_dirs_clone.lock();
                                is_under_watched(&dirs, &event.path)
                            };
                            if !under_watched {
                                continue;
                            }

                            if event.path.exists() {
                                batch.add(FileEvent::Modified(event.path));
                            } else {
                                batch.add(FileEvent::Deleted(event.path));
                            }
                        }

                        if !batch.is_empty() {
                            let _ = batch_tx.blocking_send(batch);
                        }
                    }
                    Err(e) => {
                        tracing::error!("Watch error: {:?}", e);
                    }
                }
            },
        )
        .map_err(|e| WatcherError::WatchFailed {
            path: "init".to_string(),
            reason: e.to_string(),
        })?;

        let mut watcher = Self {
            _debouncer: debouncer,
            event_rx,
            watched_dirs,
        };

        for dir in &config.watch_dirs {
            watcher.watch(dir)?;
        }

        Ok(watcher)
    }

    /// Add a directory to watch.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be watched.
    pub fn watch(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref().to_path_buf();

        if !path.exists() {
            return Err(WatcherError::WatchFailed {
                path: path.display().to_string(),
                reason: "directory does not exist".to_string(),
            }
            .into());
        }

        self._debouncer
            .watcher()
            .watch(&path, RecursiveMode::Recursive)
            .map_err(|e| WatcherError::WatchFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        self.watched_dirs.lock().push(path.clone());
        tracing::info!(path = %path.display(), "Watching directory");

        Ok(())
    }

    /// Stop watching a directory.
    ///
    /// # Errors
    ///
    /// Returns an error if unwatching fails.
    pub fn unwatch(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        self._debouncer
            .watcher()
            .unwatch(path)
            .map_err(|e| WatcherError::WatchFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        self.watched_dirs.lock().retain(|p| p != path);

        tracing::info!(path = %path.display(), "Stopped watching directory");
        Ok(())
    }

    /// Receive the next batch of events.
    ///
    /// Returns `None` if the watcher has been dropped.
    pub async fn recv(&mut self) -> Option<EventBatch> {
        self.event_rx.recv().await
    }

    /// Get list of watched directories.
    #[must_use]
    pub fn watched_dirs(&self) -> Vec<PathBuf> {
        self.watched_dirs.lock().clone()
    }
}

/// Check if a path is under any watched directory.
fn is_under_watched(watched: &[PathBuf], path: &Path) -> bool {
    watched.iter().any(|dir| path.starts_with(dir))
}
