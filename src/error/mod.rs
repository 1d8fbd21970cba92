//! Error types and Result aliases for devlog-sync.
//!
//! This module defines the error hierarchy used throughout the crate.
//! All public functions return `Result<T, Error>` or `Result<T>`.

use thiserror::Error;

/// Result type alias using devlog-sync's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for sync operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error. The only fatal variant: aborts startup.
    #[error("configuration error: {0}")]
    Config(String),

    /// Note transformation error.
    #[error("transform error: {0}")]
    Transform(#[from] TransformError),

    /// File watching error.
    #[error("watcher error: {0}")]
    Watcher(#[from] WatcherError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while converting a source note.
#[derive(Error, Debug)]
pub enum TransformError {
    /// Malformed frontmatter block.
    #[error("malformed frontmatter: {0}")]
    Frontmatter(String),

    /// Title or slug override collapsed to an empty slug.
    #[error("title '{title}' produces an empty slug")]
    EmptySlug { title: String },
}

/// File watcher errors.
#[derive(Error, Debug)]
pub enum WatcherError {
    /// Failed to watch path.
    #[error("failed to watch path '{path}': {reason}")]
    WatchFailed { path: String, reason: String },

    /// File processing error.
    #[error("failed to process file '{path}': {reason}")]
    ProcessFailed { path: String, reason: String },
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

#[cfg(test)]
mod tests;
