//! Undo/redo functionality

use super::EditorState;

impl EditorState {
    /// Undo last change. Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(items) => {
                self.items = items.clone();
                self.after_history_jump();
                true
            }
            None => false,
        }
    }

    /// Redo last undone change. Returns false when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(items) => {
                self.items = items.clone();
                self.after_history_jump();
                true
            }
            None => false,
        }
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Drop all undo/redo entries; the current list becomes the baseline
    pub fn clear_history(&mut self) {
        self.history.clear();
        self.history.capture(self.items.clone(), "initial");
    }

    fn after_history_jump(&mut self) {
        self.drag = None;
        if let Some(id) = self.selected.clone() {
            if self.get_item(&id).is_none() {
                self.selected = None;
            }
        }
        self.version += 1;
    }
}
