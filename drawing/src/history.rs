//! Undo/redo history over snapshots of entries.
//!
//! DESIGN
//! ======
//! `past` is a stack whose top is the most recent snapshot; `future` is a deque
//! whose front is the next snapshot to redo. Every operation is total: undo
//! with nothing to undo and redo with nothing to redo leave the state as is.
//! `add_entry` always branches the timeline, so `future` is cleared.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

use std::collections::VecDeque;

/// Undo/redo container holding a sequence of "present" snapshots.
#[derive(Debug, Clone)]
pub struct History<T> {
    past: Vec<Vec<T>>,
    present: Vec<T>,
    future: VecDeque<Vec<T>>,
    limit: Option<usize>,
}

impl<T> Default for History<T> {
    fn default() -> Self {
        Self { past: Vec::new(), present: Vec::new(), future: VecDeque::new(), limit: None }
    }
}

impl<T> History<T> {
    /// Empty history with unbounded depth.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty history that keeps at most `limit` undo steps. Zero means unbounded.
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        Self { limit: (limit > 0).then_some(limit), ..Self::default() }
    }

    /// Push the current present onto `past` and make `snapshot` the present.
    pub fn add_entry(&mut self, snapshot: Vec<T>) {
        let previous = std::mem::replace(&mut self.present, snapshot);
        self.past.push(previous);
        self.future.clear();
        if let Some(limit) = self.limit {
            if self.past.len() > limit {
                let excess = self.past.len() - limit;
                self.past.drain(..excess);
            }
        }
    }

    /// Step back one snapshot. Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.past.pop() else {
            return false;
        };
        let current = std::mem::replace(&mut self.present, previous);
        self.future.push_front(current);
        true
    }

    /// Step forward one snapshot. Returns false when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(next) = self.future.pop_front() else {
            return false;
        };
        let current = std::mem::replace(&mut self.present, next);
        self.past.push(current);
        true
    }

    /// Reset to the empty initial state.
    pub fn clean(&mut self) {
        self.past.clear();
        self.present = Vec::new();
        self.future.clear();
    }

    #[must_use]
    pub fn present(&self) -> &[T] {
        &self.present
    }

    #[must_use]
    pub fn has_undo(&self) -> bool {
        !self.past.is_empty()
    }

    #[must_use]
    pub fn has_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Number of snapshots available to undo.
    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.past.len()
    }

    /// Number of snapshots available to redo.
    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.future.len()
    }
}
