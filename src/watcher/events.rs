//! File system event types and handling.

use std::path::PathBuf;

/// File system event types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileEvent {
    /// File was created or modified.
    Modified(PathBuf),
    /// File was deleted.
    Deleted(PathBuf),
}

impl FileEvent {
    /// Get the path associated with this event.
    #[must_use]
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::Modified(p) | Self::Deleted(p) => p,
        }
    }
}

/// Batch of file events for processing.
#[derive(Debug, Default)]
pub struct EventBatch {
    /// Modified files (need conversion).
    pub modified: Vec<PathBuf>,
    /// Deleted files (need destination removal).
    pub deleted: Vec<PathBuf>,
}

impl EventBatch {
    /// Create a new empty batch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an event to the batch. A delete supersedes an earlier modify
    /// of the same path.
    pub fn add(&mut self, event: FileEvent) {
        match event {
            FileEvent::Modified(path) => {
                if !self.modified.contains(&path) {
                    self.modified.push(path);
                }
            }
            FileEvent::Deleted(path) => {
                self.modified.retain(|p| p != &path);
                if !self.deleted.contains(&path) {
                    self.deleted.push(path);
                }
            }
        }
    }

    /// Drain the batch into individual events, modifications first.
    pub fn drain(&mut self) -> Vec<FileEvent> {
        let mut events: Vec<FileEvent> =
            self.modified.drain(..).map(FileEvent::Modified).collect();
        events.extend(self.deleted.drain(..).map(FileEvent::Deleted));
        events
    }

    /// Check if batch is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modified.is_empty() && self.deleted.is_empty()
    }

    /// Get total number of events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.modified.len() + self.deleted.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_path() {
        let modified = FileEvent::Modified(PathBuf::from("/notes/post.md"));
        assert_eq!(modified.path(), &PathBuf::from("/notes/post.md"));

        let deleted = FileEvent::Deleted(PathBuf::from("/notes/gone.md"));
        assert_eq!(deleted.path(), &PathBuf::from("/notes/gone.md"));
    }

    #[test]
    fn test_event_batch_dedups_modified() {
        let mut batch = EventBatch::new();
        batch.add(FileEvent::Modified(PathBuf::from("/a.md")));
        batch.add(FileEvent::Modified(PathBuf::from("/b.md")));
        batch.add(FileEvent::Modified(PathBuf::from("/a.md")));

        assert_eq!(batch.modified.len(), 2);
        assert!(batch.deleted.is_empty());
    }

    #[test]
    fn test_delete_supersedes_modify() {
        let mut batch = EventBatch::new();
        batch.add(FileEvent::Modified(PathBuf::from("/a.md")));
        batch.add(FileEvent::Deleted(PathBuf::from("/a.md")));

        assert!(batch.modified.is_empty());
        assert_eq!(batch.deleted.len(), 1);
    }

    #[test]
    fn test_drain_orders_modifications_first() {
        let mut batch = EventBatch::new();
        batch.add(FileEvent::Deleted(PathBuf::from("/gone.md")));
        batch.add(FileEvent::Modified(PathBuf::from("/new.md")));

        let events = batch.drain();
        assert_eq!(
            events,
            vec![
                FileEvent::Modified(PathBuf::from("/new.md")),
                FileEvent::Deleted(PathBuf::from("/gone.md")),
            ]
        );
        assert!(batch.is_empty());
    }

    #[test]
    fn test_len_and_empty() {
        let mut batch = EventBatch::new();
        assert!(batch.is_empty());
        assert_eq!(batch.len(), 0);

        batch.add(FileEvent::Modified(PathBuf::from("/a.md")));
        batch.add(FileEvent::Deleted(PathBuf::from("/b.md")));

        assert!(!batch.is_empty());
        assert_eq!(batch.len(), 2);
    }
}
