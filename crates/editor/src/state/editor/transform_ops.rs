//! Transform and drag operations

use shared::{Item, Transform, WallSide};

use super::{DragSession, EditorState, TransformOutcome};
use crate::geometry::DEFAULT_MAX_ATTEMPTS;
use crate::room::{mount_from_position, place_on_wall};
use crate::sanitize::{sanitize_scale, sanitize_transform, sanitize_vector};

impl EditorState {
    /// Build a candidate from the current item, settle it and apply it.
    fn transform_with(
        &mut self,
        id: &str,
        description: Option<String>,
        build: impl FnOnce(&Item) -> Item,
    ) -> TransformOutcome {
        let Some(index) = self.index_of(id) else {
            return TransformOutcome::NotFound;
        };
        let current = &self.items[index];
        if current.locked {
            return TransformOutcome::Locked;
        }

        let candidate = build(current);
        let settled = self.settle(&candidate);
        let outcome = self.apply_settled(index, settled);
        if let (true, Some(description)) = (outcome.is_applied(), description) {
            self.capture(description);
        }
        outcome
    }

    fn moved_to(&self, current: &Item, position: [f64; 3]) -> Item {
        let mut candidate = current.clone();
        candidate.transform.position = sanitize_vector(position, current.position());
        if let Some(side) = current.wall_mount.as_ref().map(|m| m.side) {
            candidate.wall_mount = Some(mount_from_position(&candidate, side));
        }
        candidate
    }

    /// Move an item. Wall items are projected onto their wall.
    pub fn move_item(&mut self, id: &str, position: [f64; 3]) -> TransformOutcome {
        let Some(current) = self.get_item(id) else {
            return TransformOutcome::NotFound;
        };
        let candidate = self.moved_to(current, position);
        self.transform_with(id, Some(format!("item_moved_{id}")), |_| candidate)
    }

    /// Set the Euler rotation of a floor item. Wall items keep their derived rotation.
    pub fn rotate_item(&mut self, id: &str, rotation: [f64; 3]) -> TransformOutcome {
        self.transform_with(id, Some(format!("item_rotated_{id}")), |current| {
            let mut candidate = current.clone();
            candidate.transform.rotation = sanitize_vector(rotation, current.transform.rotation);
            candidate
        })
    }

    pub fn scale_item(&mut self, id: &str, scale: [f64; 3]) -> TransformOutcome {
        self.transform_with(id, Some(format!("item_scaled_{id}")), |current| {
            let mut candidate = current.clone();
            candidate.transform.scale = sanitize_scale(scale, current.transform.scale);
            candidate
        })
    }

    /// Replace the whole transform in one edit
    pub fn set_transform(&mut self, id: &str, transform: Transform) -> TransformOutcome {
        let Some(current) = self.get_item(id) else {
            return TransformOutcome::NotFound;
        };
        let mut candidate = current.clone();
        candidate.transform = sanitize_transform(&transform, &current.transform);
        if let Some(side) = current.wall_mount.as_ref().map(|m| m.side) {
            candidate.wall_mount = Some(mount_from_position(&candidate, side));
        }
        self.transform_with(id, Some(format!("item_updated_{id}")), |_| candidate)
    }

    /// Attach an item to a wall at `(u, height)`
    pub fn mount_on_wall(
        &mut self,
        id: &str,
        side: WallSide,
        u: f64,
        height: f64,
        offset: f64,
    ) -> TransformOutcome {
        let room = self.room.get();
        self.transform_with(id, Some(format!("item_mounted_{id}")), |current| {
            place_on_wall(current, &room, side, u, height, offset)
        })
    }

    /// Take an item off its wall and stand it on the floor where it is
    pub fn detach_from_wall(&mut self, id: &str) -> TransformOutcome {
        self.transform_with(id, Some(format!("item_detached_{id}")), |current| {
            let mut candidate = current.clone();
            candidate.wall_mount = None;
            candidate.transform.rotation = [0.0, current.yaw(), 0.0];
            candidate.transform.position[1] = candidate.scaled_size()[1] / 2.0;
            candidate
        })
    }

    /// Move an item to the nearest collision-free spot, if the search finds one
    pub fn move_to_free_position(&mut self, id: &str) -> TransformOutcome {
        match self.find_free_position(id, DEFAULT_MAX_ATTEMPTS) {
            Some(position) => self.move_item(id, position),
            None if self.get_item(id).is_none() => TransformOutcome::NotFound,
            None => {
                tracing::warn!("No free position near {id}; leaving it in place");
                TransformOutcome::Unchanged
            }
        }
    }

    // ── Drag gestures ─────────────────────────────────────────

    /// Start dragging an item. History is captured once, at `end_drag`.
    pub fn begin_drag(&mut self, id: &str) -> bool {
        match self.get_item(id).cloned() {
            Some(item) if !item.locked => {
                self.drag = Some(DragSession {
                    item_id: item.id.clone(),
                    start: item,
                });
                true
            }
            _ => false,
        }
    }

    /// Move the dragged item without capturing history.
    ///
    /// In `Block` mode a colliding position is rejected and the item stays
    /// at its last valid position.
    pub fn drag_to(&mut self, position: [f64; 3]) -> TransformOutcome {
        let Some(id) = self.drag.as_ref().map(|d| d.item_id.clone()) else {
            return TransformOutcome::NotFound;
        };
        let Some(current) = self.get_item(&id) else {
            return TransformOutcome::NotFound;
        };
        let candidate = self.moved_to(current, position);
        self.transform_with(&id, None, |_| candidate)
    }

    /// Finish the gesture. Returns true if the item ended somewhere new.
    pub fn end_drag(&mut self) -> bool {
        let Some(session) = self.drag.take() else {
            return false;
        };
        let Some(item) = self.get_item(&session.item_id) else {
            return false;
        };

        let changed = *item != session.start;
        if changed {
            self.capture(format!("item_moved_{}", session.item_id));
        }
        if self.settings.auto_lock {
            self.lock_item(&session.item_id);
        }
        changed
    }

    /// Abandon the gesture and put the item back where it started
    pub fn cancel_drag(&mut self) {
        if let Some(session) = self.drag.take() {
            if let Some(index) = self.index_of(&session.item_id) {
                self.items[index] = session.start;
                self.version += 1;
            }
        }
    }
}
