//! Source tree watching.
//!
//! This module provides:
//! - Directory watching using notify-rs with debounced event batches
//! - Exclusion filtering for hidden and template paths
//! - The initial recursive source scan

mod events;
mod filter;
mod scanner;
#[allow(clippy::module_inception)]
mod watcher;

pub use events::{EventBatch, FileEvent};
pub use filter::NoteFilter;
pub use scanner::scan_source;
pub use watcher::{FileWatcher, WatcherConfig};
