//! Bounded undo/redo stacks of document snapshots

use std::collections::VecDeque;

use super::model::Document;

/// Maximum number of undo steps kept
pub const HISTORY_LIMIT: usize = 200;

/// Past and future snapshots around the live document
///
/// Snapshots share unchanged pages and blocks with the live document through
/// `Arc`, so pushing one is proportional to the page count, not the
/// document size.
#[derive(Debug, Clone)]
pub struct History {
    past: VecDeque<Document>,
    future: Vec<Document>,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::with_limit(HISTORY_LIMIT)
    }
}

impl History {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            past: VecDeque::new(),
            future: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Record the state before an edit; a new edit invalidates redo
    pub fn record(&mut self, snapshot: Document) {
        self.past.push_back(snapshot);
        while self.past.len() > self.limit {
            self.past.pop_front();
        }
        self.future.clear();
    }

    /// Swap `current` for the newest past snapshot
    ///
    /// Returns the snapshot to install, or `None` when there is nothing to
    /// undo (in which case `current` is not kept).
    pub fn undo(&mut self, current: Document) -> Option<Document> {
        let previous = self.past.pop_back()?;
        self.future.push(current);
        Some(previous)
    }

    /// Swap `current` for the newest future snapshot
    pub fn redo(&mut self, current: Document) -> Option<Document> {
        let next = self.future.pop()?;
        self.past.push_back(current);
        while self.past.len() > self.limit {
            self.past.pop_front();
        }
        Some(next)
    }

    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.past.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.future.len()
    }
}
