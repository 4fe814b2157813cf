//! # History Manager
//!
//! A bounded, linear stack of snapshots with a cursor, for manual
//! checkpoint / undo / redo.
//!
//! ## Cursor Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      History Stack                                      │
//! │                                                                         │
//! │   entries:  [ S0 ][ S1 ][ S2 ][ S3 ]                                    │
//! │                          ▲                                              │
//! │                        cursor                                           │
//! │                                                                         │
//! │   undo()        cursor - 1, restore S1                                  │
//! │   redo()        cursor + 1, restore S3                                  │
//! │   checkpoint(X) drop S3, push X, cursor → X   (redo branch is gone)     │
//! │   over limit    drop S0, cursor - 1                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Bound: `cursor < entries.len()` whenever history is non-empty and
//! `entries.len() <= limit`.
//!
//! Checkpoints are never taken implicitly. The caller decides which run of
//! edits forms one undoable step.

use crate::config::DEFAULT_HISTORY_LIMIT;

/// Bounded snapshot history.
///
/// `T` is expected to be cheap to clone (the catalog shares its entities
/// through `Arc`), since every restore hands out a clone.
#[derive(Debug, Clone)]
pub struct History<T> {
    entries: Vec<T>,
    cursor: usize,
    limit: usize,
}

impl<T: Clone> History<T> {
    /// History holding at most `limit` snapshots (at least one).
    pub fn with_limit(limit: usize) -> Self {
        History {
            entries: Vec::new(),
            cursor: 0,
            limit: limit.max(1),
        }
    }

    /// Pushes a snapshot after the cursor, discarding any redo entries.
    pub fn checkpoint(&mut self, snapshot: T) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push(snapshot);
        self.cursor = self.entries.len() - 1;

        if self.entries.len() > self.limit {
            self.entries.remove(0);
            self.cursor -= 1;
        }
    }

    /// Moves the cursor back and returns the snapshot to restore.
    ///
    /// `None` when already at the oldest entry (or empty).
    pub fn undo(&mut self) -> Option<T> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor).cloned()
    }

    /// Moves the cursor forward and returns the snapshot to restore.
    ///
    /// `None` when already at the newest entry (or empty).
    pub fn redo(&mut self) -> Option<T> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        self.entries.get(self.cursor).cloned()
    }

    pub fn can_undo(&self) -> bool {
        !self.entries.is_empty() && self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index of the current snapshot; meaningless while empty.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// The snapshot under the cursor.
    pub fn current(&self) -> Option<&T> {
        self.entries.get(self.cursor)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }
}

impl<T: Clone> Default for History<T> {
    fn default() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_history_is_inert() {
        let mut history: History<u32> = History::default();
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert_eq!(history.undo(), None);
        assert_eq!(history.redo(), None);
        assert!(history.is_empty());
    }

    #[test]
    fn test_single_checkpoint_cannot_undo() {
        let mut history = History::default();
        history.checkpoint(1);
        assert_eq!(history.cursor(), 0);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_undo_redo_walks_cursor() {
        let mut history = History::default();
        history.checkpoint("s0");
        history.checkpoint("s1");
        history.checkpoint("s2");

        assert_eq!(history.undo(), Some("s1"));
        assert_eq!(history.undo(), Some("s0"));
        assert_eq!(history.undo(), None);
        assert_eq!(history.cursor(), 0);

        assert_eq!(history.redo(), Some("s1"));
        assert_eq!(history.redo(), Some("s2"));
        assert_eq!(history.redo(), None);
    }

    #[test]
    fn test_checkpoint_truncates_redo_branch() {
        let mut history = History::default();
        history.checkpoint("s0");
        history.checkpoint("s1");
        history.checkpoint("s2");
        history.undo();
        history.undo();

        history.checkpoint("t1");
        assert_eq!(history.len(), 2);
        assert!(!history.can_redo());
        assert_eq!(history.current(), Some(&"t1"));
        assert_eq!(history.undo(), Some("s0"));
    }

    #[test]
    fn test_limit_evicts_oldest() {
        let mut history = History::default();
        for n in 0..51 {
            history.checkpoint(n);
        }

        assert_eq!(history.len(), 50);
        assert_eq!(history.cursor(), 49);
        assert!(history.can_undo());
        assert!(!history.can_redo());
        assert_eq!(history.current(), Some(&50));

        // Oldest surviving entry is 1
        for _ in 0..49 {
            history.undo();
        }
        assert_eq!(history.current(), Some(&1));
        assert!(!history.can_undo());
    }

    #[test]
    fn test_zero_limit_keeps_one() {
        let mut history = History::with_limit(0);
        history.checkpoint(1);
        history.checkpoint(2);
        assert_eq!(history.len(), 1);
        assert_eq!(history.current(), Some(&2));
    }
}
