//! Sync session lifecycle.
//!
//! A session owns one engine: initial source scan, orphan
//! reconciliation, then either exit (one-shot) or a live watch loop.

use std::path::PathBuf;

use crate::config::Config;
use crate::watcher::{scan_source, FileEvent, FileWatcher, WatcherConfig};
use crate::Result;

use super::engine::{EngineConfig, SyncEngine};

/// A configured sync session.
#[derive(Debug)]
pub struct SyncSession {
    engine: SyncEngine,
    source_root: PathBuf,
    watch: bool,
}

impl SyncSession {
    /// Build a session from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` when the configuration is invalid or a
    /// root does not resolve to an existing directory.
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        let source_root = config.source_root()?;
        let content_root = config.content_root()?;

        tracing::info!(
            source = %source_root.display(),
            content = %content_root.display(),
            "Session configured"
        );

        let engine = SyncEngine::new(EngineConfig {
            source_root: source_root.clone(),
            content_root,
            marker: config.marker.clone(),
            mode: config.reconcile_mode(),
        })?;

        Ok(Self {
            engine,
            source_root,
            watch: config.watch,
        })
    }

    /// Run the session to completion.
    ///
    /// One-shot sessions return after the initial scan and
    /// reconciliation; watch sessions keep processing events until the
    /// watcher closes or a shutdown signal arrives.
    ///
    /// # Errors
    ///
    /// Returns an error if the watcher cannot be started. Per-file
    /// failures are logged and do not end the session.
    pub async fn run(mut self) -> Result<()> {
        let notes = scan_source(&self.source_root, self.engine.filter());
        for path in notes {
            self.engine.handle_event(&FileEvent::Modified(path));
        }

        let report = self.engine.reconcile();
        let stats = self.engine.stats();
        tracing::info!(
            processed = self.engine.processed_count(),
            synced = stats.notes_synced,
            skipped = stats.notes_skipped,
            removed = stats.posts_removed,
            pruned_dirs = report.pruned_dirs,
            errors = stats.errors,
            "Initial sync complete"
        );

        if !self.watch {
            return Ok(());
        }

        let mut watcher = FileWatcher::new(&WatcherConfig {
            watch_dirs: vec![self.source_root.clone()],
            ..WatcherConfig::default()
        })?;

        loop {
            tokio::select! {
                batch = watcher.recv() => {
                    let Some(mut batch) = batch else {
                        tracing::info!("Watcher closed, shutting down");
                        break;
                    };
                    for event in batch.drain() {
                        self.engine.handle_event(&event);
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Shutdown signal received");
                    break;
                }
            }
        }

        Ok(())
    }

    /// Engine owned by this session.
    #[must_use]
    pub const fn engine(&self) -> &SyncEngine {
        &self.engine
    }
}
