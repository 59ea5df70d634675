//! Item lifecycle operations

use std::collections::HashSet;

use shared::{Item, ItemId, LockedSnapSettings, RoomDimensions, RoomDimensionsUpdate};

use super::EditorState;
use crate::sanitize::sanitize_item;

/// Offset applied to duplicates on X and Z (meters)
const DUPLICATE_OFFSET: f64 = 1.0;

impl EditorState {
    /// Add an item, clamped into the room. Returns `None` if the id is taken.
    pub fn add_item(&mut self, item: Item) -> Option<ItemId> {
        if self.get_item(&item.id).is_some() {
            tracing::warn!("Item id {} already in use", item.id);
            return None;
        }

        let clean = sanitize_item(&item);
        let settled = self.settle(&clean);
        let id = settled.id.clone();
        if settled.position() != item.position() {
            tracing::info!("Moved {} into the room: {:?}", id, settled.position());
        }

        self.items.push(settled);
        self.selected = Some(id.clone());
        self.version += 1;
        self.capture(format!("item_added_{id}"));
        Some(id)
    }

    /// Remove an item. Returns false if it does not exist.
    pub fn remove_item(&mut self, id: &str) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        self.items.remove(index);
        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        }
        if self.drag.as_ref().is_some_and(|d| d.item_id == id) {
            self.drag = None;
        }
        self.version += 1;
        self.capture(format!("item_removed_{id}"));
        true
    }

    /// Copy an item one meter along +X and +Z under a fresh id
    pub fn duplicate_item(&mut self, id: &str) -> Option<ItemId> {
        let original = self.get_item(id)?.clone();

        let new_id = loop {
            self.copy_counter += 1;
            let candidate = format!("{}_copy_{}", original.id, self.copy_counter);
            if self.get_item(&candidate).is_none() {
                break candidate;
            }
        };

        let mut copy = original;
        copy.id = new_id.clone();
        match copy.wall_mount.as_mut() {
            Some(mount) => mount.u += DUPLICATE_OFFSET,
            None => {
                copy.transform.position[0] += DUPLICATE_OFFSET;
                copy.transform.position[2] += DUPLICATE_OFFSET;
            }
        }

        let settled = self.boundary.clamp(&copy);
        self.items.push(settled);
        self.selected = Some(new_id.clone());
        self.version += 1;
        self.capture(format!("item_duplicated_{id}_to_{new_id}"));
        Some(new_id)
    }

    /// Lock an item, recording the snap settings active at that moment
    pub fn lock_item(&mut self, id: &str) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        if self.items[index].locked {
            return false;
        }

        let grid = self.settings.grid;
        let rotation = self.settings.rotation_snap;
        let item = &mut self.items[index];
        item.locked = true;
        item.snap_settings = Some(LockedSnapSettings {
            grid_enabled: grid.enabled,
            grid_size: grid.size,
            grid_divisions: grid.divisions,
            rotation_snap_enabled: rotation.enabled,
            rotation_snap_angle: rotation.angle,
        });
        self.version += 1;
        self.capture(format!("item_locked_{id}"));
        tracing::debug!("Locked {id}");
        true
    }

    pub fn unlock_item(&mut self, id: &str) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        if !self.items[index].locked {
            return false;
        }
        self.items[index].locked = false;
        self.version += 1;
        self.capture(format!("item_unlocked_{id}"));
        tracing::debug!("Unlocked {id}");
        true
    }

    /// Remove every item (undoable)
    pub fn clear(&mut self) {
        self.items.clear();
        self.selected = None;
        self.drag = None;
        self.version += 1;
        self.capture("clear");
    }

    /// Replace the whole item list, e.g. after loading a layout.
    ///
    /// Items are sanitised and clamped but not snapped. Later duplicates of
    /// an id are dropped.
    pub fn replace_items(&mut self, items: Vec<Item>, description: &str) -> usize {
        let mut seen = HashSet::new();
        let mut accepted = Vec::with_capacity(items.len());
        for item in items {
            if !seen.insert(item.id.clone()) {
                tracing::warn!("Dropping duplicate item id {}", item.id);
                continue;
            }
            accepted.push(self.boundary.clamp(&sanitize_item(&item)));
        }

        self.items = accepted;
        self.selected = None;
        self.drag = None;
        self.version += 1;
        self.capture(description);
        self.items.len()
    }

    /// Merge new room dimensions and re-clamp every item, locked ones included
    pub fn update_room(&mut self, update: &RoomDimensionsUpdate) -> RoomDimensions {
        let dimensions = self.room.update(update);

        let mut moved = 0;
        for item in &mut self.items {
            let clamped = self.boundary.clamp(item);
            if clamped != *item {
                *item = clamped;
                moved += 1;
            }
        }
        if moved > 0 {
            tracing::info!("Room change moved {moved} items back inside");
        }

        self.version += 1;
        self.capture("room_updated");
        dimensions
    }
}
