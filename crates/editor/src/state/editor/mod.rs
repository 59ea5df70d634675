//! Editor state container
//!
//! Owns the live item list and routes every edit through the same
//! pipeline: sanitise, snap, clamp, optional collision check, commit,
//! history capture.

mod history;
mod item_ops;
mod transform_ops;

use shared::{Item, ItemId, RoomDimensions};

use crate::geometry::query_against_set;
use crate::room::{BoundaryEngine, RoomConfig};
use crate::snap::SnapCalculator;
use crate::state::history::History;
use crate::state::settings::{CollisionMode, EditorSettings, SnapOrder};

/// Result of a transform request
#[derive(Debug, Clone, PartialEq)]
pub enum TransformOutcome {
    /// Committed. `colliding_with` lists overlaps in `Flag` mode.
    Applied { colliding_with: Vec<ItemId> },
    /// The settled transform equals the current one
    Unchanged,
    /// Locked items are not transformed interactively
    Locked,
    /// Rejected in `Block` mode
    Blocked { colliding_with: Vec<ItemId> },
    NotFound,
}

impl TransformOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, TransformOutcome::Applied { .. })
    }
}

/// Drag gesture in progress
#[derive(Debug, Clone)]
pub(crate) struct DragSession {
    pub(crate) item_id: ItemId,
    pub(crate) start: Item,
}

pub struct EditorState {
    pub(crate) items: Vec<Item>,
    pub(crate) selected: Option<ItemId>,
    pub(crate) room: RoomConfig,
    pub(crate) boundary: BoundaryEngine,
    pub(crate) snap: SnapCalculator,
    pub(crate) history: History<Vec<Item>>,
    pub(crate) settings: EditorSettings,
    /// Monotonically increasing version counter for change detection
    pub(crate) version: u64,
    pub(crate) drag: Option<DragSession>,
    pub(crate) copy_counter: u64,
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new(EditorSettings::default(), RoomDimensions::default())
    }
}

impl EditorState {
    pub fn new(settings: EditorSettings, dimensions: RoomDimensions) -> Self {
        Self::with_room(settings, RoomConfig::new(dimensions))
    }

    /// Editor sharing an existing room handle
    pub fn with_room(settings: EditorSettings, room: RoomConfig) -> Self {
        let mut history = History::new(settings.history_limit);
        history.capture(Vec::new(), "initial");

        Self {
            items: Vec::new(),
            selected: None,
            boundary: BoundaryEngine::new(room.clone()),
            snap: SnapCalculator::new(room.clone(), settings.grid, settings.rotation_snap),
            room,
            history,
            settings,
            version: 0,
            drag: None,
            copy_counter: 0,
        }
    }

    // ── Accessors ─────────────────────────────────────────────

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn get_item(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    pub(crate) fn index_of(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|i| i.id == id)
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Current version (increments on every mutation)
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn room(&self) -> &RoomConfig {
        &self.room
    }

    pub fn boundary(&self) -> &BoundaryEngine {
        &self.boundary
    }

    pub fn snap(&self) -> &SnapCalculator {
        &self.snap
    }

    pub fn history(&self) -> &History<Vec<Item>> {
        &self.history
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn selected(&self) -> Option<&ItemId> {
        self.selected.as_ref()
    }

    /// Select an item. Unknown ids clear the selection.
    pub fn select(&mut self, id: Option<&str>) {
        self.selected = id.filter(|id| self.get_item(id).is_some()).map(str::to_string);
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    // ── Settings ──────────────────────────────────────────────

    /// Replace snap settings. Returns false when nothing changed.
    pub fn set_snap_settings(
        &mut self,
        grid: crate::snap::GridSettings,
        rotation: crate::snap::RotationSnapSettings,
    ) -> bool {
        if !self.snap.set_settings(grid, rotation) {
            return false;
        }
        self.settings.grid = grid;
        self.settings.rotation_snap = rotation;
        true
    }

    pub fn set_collision_mode(&mut self, mode: CollisionMode) {
        self.settings.collision_mode = mode;
    }

    pub fn set_snap_order(&mut self, order: SnapOrder) {
        self.settings.snap_order = order;
    }

    pub fn set_auto_lock(&mut self, enabled: bool) {
        self.settings.auto_lock = enabled;
    }

    pub fn set_history_limit(&mut self, limit: usize) {
        self.settings.history_limit = limit;
        self.history.set_limit(limit);
    }

    // ── Pipeline ──────────────────────────────────────────────

    /// Snap and clamp a candidate according to the snap order.
    pub(crate) fn settle(&mut self, candidate: &Item) -> Item {
        match self.settings.snap_order {
            SnapOrder::BeforeClamp => {
                let snapped = self.snap.snap_item(candidate);
                self.boundary.clamp(&snapped)
            }
            SnapOrder::AfterClamp => {
                let clamped = self.boundary.clamp(candidate);
                let snapped = self.snap.snap_item(&clamped);
                self.boundary.clamp(&snapped)
            }
        }
    }

    /// Ids of items overlapping `candidate` (its own id excluded)
    pub(crate) fn collisions_against_live(&self, candidate: &Item) -> Vec<ItemId> {
        query_against_set(candidate, &self.items, None).ids()
    }

    /// Replace item `index` with `settled` after the collision policy.
    ///
    /// Does not capture history.
    pub(crate) fn apply_settled(&mut self, index: usize, settled: Item) -> TransformOutcome {
        if self.items[index] == settled {
            return TransformOutcome::Unchanged;
        }

        let colliding_with = match self.settings.collision_mode {
            CollisionMode::Ignore => Vec::new(),
            CollisionMode::Flag | CollisionMode::Block => self.collisions_against_live(&settled),
        };
        if self.settings.collision_mode == CollisionMode::Block && !colliding_with.is_empty() {
            tracing::debug!("Move of {} blocked by {:?}", settled.id, colliding_with);
            return TransformOutcome::Blocked { colliding_with };
        }

        self.items[index] = settled;
        self.version += 1;
        TransformOutcome::Applied { colliding_with }
    }

    /// Snapshot the live list into history
    pub(crate) fn capture(&mut self, description: impl Into<String>) {
        self.history.capture(self.items.clone(), description);
    }

    // ── Collision queries ─────────────────────────────────────

    /// Items overlapping the item `id`
    pub fn collisions_for(&self, id: &str) -> Vec<ItemId> {
        match self.get_item(id) {
            Some(item) => self.collisions_against_live(item),
            None => Vec::new(),
        }
    }

    /// Every overlapping pair in the live list
    pub fn overlapping_pairs(&self) -> Vec<(ItemId, ItemId)> {
        crate::geometry::overlapping_pairs(&self.items)
    }

    /// Nearby collision-free position for `id`, if the spiral search finds one
    pub fn find_free_position(&self, id: &str, max_attempts: usize) -> Option<[f64; 3]> {
        let item = self.get_item(id)?;
        crate::geometry::find_nearby_free_position(item, &self.items, max_attempts)
    }
}
