//! Linear undo/redo history
//!
//! Three parts: `past` (oldest first), `present`, and `future` (next redo
//! last). Committing a new state always discards `future`.

use std::collections::VecDeque;

/// Default maximum number of `past` entries
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// A captured state with the edit that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry<T> {
    pub state: T,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct History<T> {
    past: VecDeque<HistoryEntry<T>>,
    present: Option<HistoryEntry<T>>,
    future: Vec<HistoryEntry<T>>,
    limit: usize,
}

impl<T> Default for History<T> {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl<T> History<T> {
    pub fn new(limit: usize) -> Self {
        Self {
            past: VecDeque::new(),
            present: None,
            future: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Undo the last capture. Returns the restored state, or `None` if `past` is empty.
    pub fn undo(&mut self) -> Option<&T> {
        let previous = self.past.pop_back()?;
        if let Some(current) = self.present.replace(previous) {
            self.future.push(current);
        }
        self.present.as_ref().map(|e| &e.state)
    }

    /// Redo the last undone capture. Returns the restored state, or `None` if `future` is empty.
    pub fn redo(&mut self) -> Option<&T> {
        let next = self.future.pop()?;
        if let Some(current) = self.present.replace(next) {
            self.past.push_back(current);
        }
        self.present.as_ref().map(|e| &e.state)
    }

    /// Empty all three parts
    pub fn clear(&mut self) {
        self.past.clear();
        self.present = None;
        self.future.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn present(&self) -> Option<&HistoryEntry<T>> {
        self.present.as_ref()
    }

    pub fn past_len(&self) -> usize {
        self.past.len()
    }

    pub fn future_len(&self) -> usize {
        self.future.len()
    }

    /// Descriptions of `past` entries, oldest first
    pub fn past_descriptions(&self) -> Vec<&str> {
        self.past.iter().map(|e| e.description.as_str()).collect()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Change the maximum depth, evicting the oldest entries if needed
    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit.max(1);
        self.evict();
    }

    fn evict(&mut self) {
        while self.past.len() > self.limit {
            self.past.pop_front();
        }
    }
}

impl<T: PartialEq> History<T> {
    /// Record `state` as the new present.
    ///
    /// Returns false when `state` equals the present state; `future` is
    /// cleared either way.
    pub fn capture(&mut self, state: T, description: impl Into<String>) -> bool {
        self.future.clear();

        if self.present.as_ref().is_some_and(|p| p.state == state) {
            return false;
        }

        let entry = HistoryEntry {
            state,
            description: description.into(),
        };
        if let Some(previous) = self.present.replace(entry) {
            self.past.push_back(previous);
            self.evict();
        }
        true
    }
}
