//! Configuration management for devlog-sync.
//!
//! Supports configuration from:
//! - Command-line arguments (highest priority)
//! - Environment variables

mod paths;
mod settings;

pub use paths::{expand_path, resolve_dir};
pub use settings::{Config, ReconcileMode};
