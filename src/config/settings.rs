//! Configuration settings and validation.

use std::path::PathBuf;

use crate::{Error, Result};

use super::paths;

/// Orphan reconciliation behavior after the initial scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileMode {
    /// Remove every startup-indexed post not re-written during this run.
    /// Suitable for one-shot rebuilds where the scan enumerates everything.
    Aggressive,
    /// Only prune now-empty destination directories. Suitable for
    /// long-running watch sessions where absent events do not mean
    /// absent sources.
    Conservative,
}

/// Main configuration for a sync session.
#[derive(Debug, Clone)]
pub struct Config {
    /// Source directory of markdown notes.
    pub source_dir: String,

    /// Destination content directory.
    pub content_dir: String,

    /// Marker token a note must contain to be synced.
    pub marker: String,

    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Keep watching after the initial scan instead of exiting.
    pub watch: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_dir: "./notes".to_string(),
            content_dir: "./content".to_string(),
            marker: "#devlog".to_string(),
            log_level: "info".to_string(),
            watch: false,
        }
    }
}

impl Config {
    /// Create a new configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration value is invalid.
    pub fn validate(&self) -> Result<()> {
        if self.source_dir.is_empty() {
            return Err(Error::config("source directory cannot be empty"));
        }

        if self.content_dir.is_empty() {
            return Err(Error::config("content directory cannot be empty"));
        }

        if self.marker.trim().is_empty() {
            return Err(Error::config("marker token cannot be empty"));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(Error::config(format!(
                "invalid log level '{}', must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            )));
        }

        Ok(())
    }

    /// Resolve the source directory to an existing absolute path.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory does not exist.
    pub fn source_root(&self) -> Result<PathBuf> {
        paths::resolve_dir(&self.source_dir)
            .map_err(|e| Error::config(format!("source: {e}")))
    }

    /// Resolve the content directory to an existing absolute path.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory does not exist.
    pub fn content_root(&self) -> Result<PathBuf> {
        paths::resolve_dir(&self.content_dir)
            .map_err(|e| Error::config(format!("content: {e}")))
    }

    /// Reconciliation mode implied by the run mode: one-shot rebuilds are
    /// aggressive, watch sessions conservative.
    #[must_use]
    pub const fn reconcile_mode(&self) -> ReconcileMode {
        if self.watch {
            ReconcileMode::Conservative
        } else {
            ReconcileMode::Aggressive
        }
    }
}
