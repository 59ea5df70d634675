//! Headless harness for driving the editor programmatically.
//!
//! Bundles the editor state, a layout store and the catalog so commands
//! and integration tests can run a whole editing session without a UI.

use serde::Serialize;
use shared::{Item, ItemId, LayoutMetadata, RoomDimensionsUpdate};

use crate::catalog::{Catalog, CatalogLookup, ChainedLookup};
use crate::persistence::{hydrate_all, LayoutStore, MemoryStorage, PartialItem, Storage, StorageError};
use crate::state::{EditorSettings, EditorState, TransformOutcome};
use crate::templates::{template_by_id, TemplateApplication};

/// Items restored from storage
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadReport {
    pub loaded: usize,
    /// Ids with no catalog entry
    pub skipped: Vec<ItemId>,
}

/// Headless editor session: state, storage and catalog
pub struct EditorHarness<S: Storage = MemoryStorage> {
    pub editor: EditorState,
    pub store: LayoutStore<S>,
    pub catalog: Catalog,
}

impl EditorHarness<MemoryStorage> {
    /// Empty room, in-memory storage, builtin catalog
    pub fn new() -> Self {
        Self::with_store(LayoutStore::new(MemoryStorage::new()))
    }
}

impl Default for EditorHarness<MemoryStorage> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Storage> EditorHarness<S> {
    pub fn with_store(store: LayoutStore<S>) -> Self {
        Self {
            editor: EditorState::default(),
            store,
            catalog: Catalog::builtin(),
        }
    }

    pub fn with_settings(mut self, settings: EditorSettings) -> Self {
        let room = self.editor.room().clone();
        self.editor = EditorState::with_room(settings, room);
        self
    }

    // ── Items ─────────────────────────────────────────────────

    /// Create an item from a catalog entry and add it
    pub fn place(&mut self, catalog_key: &str, position: [f64; 3]) -> Option<ItemId> {
        let room = self.editor.room().get();
        let item = self.catalog.create_item(catalog_key, position, &room)?;
        self.editor.add_item(item)
    }

    pub fn add_item(&mut self, item: Item) -> Option<ItemId> {
        self.editor.add_item(item)
    }

    pub fn remove(&mut self, id: &str) -> bool {
        self.editor.remove_item(id)
    }

    pub fn move_item(&mut self, id: &str, position: [f64; 3]) -> TransformOutcome {
        self.editor.move_item(id, position)
    }

    /// Drag an item through `path`, committing one history entry
    pub fn drag(&mut self, id: &str, path: &[[f64; 3]]) -> bool {
        if !self.editor.begin_drag(id) {
            return false;
        }
        for &point in path {
            self.editor.drag_to(point);
        }
        self.editor.end_drag()
    }

    pub fn undo(&mut self) -> bool {
        self.editor.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.editor.redo()
    }

    pub fn clear(&mut self) {
        self.editor.clear();
    }

    pub fn update_room(&mut self, update: &RoomDimensionsUpdate) {
        self.editor.update_room(update);
    }

    /// Apply a builtin template by id
    pub fn apply_template(&mut self, id: &str) -> Option<TemplateApplication> {
        let template = template_by_id(id)?;
        Some(self.editor.apply_template(&template, &self.catalog))
    }

    // ── Persistence ───────────────────────────────────────────

    pub fn save_layout(
        &mut self,
        name: &str,
        description: Option<&str>,
        tags: Option<Vec<String>>,
    ) -> Result<String, StorageError> {
        self.store
            .save_layout(name, self.editor.items(), description, tags)
    }

    /// Replace the room contents with a saved layout
    pub fn load_layout(&mut self, id: &str) -> Option<LoadReport> {
        let partials = self.store.load_layout(id)?;
        Some(self.restore(&partials, &format!("layout_loaded_{id}")))
    }

    pub fn delete_layout(&mut self, id: &str) -> Result<bool, StorageError> {
        self.store.delete_layout(id)
    }

    pub fn layouts(&self) -> Vec<LayoutMetadata> {
        self.store.layout_metadata()
    }

    pub fn auto_save(&mut self) -> Result<(), StorageError> {
        self.store.auto_save(self.editor.items())
    }

    pub fn restore_auto_save(&mut self) -> Option<LoadReport> {
        let partials = self.store.load_auto_save()?;
        Some(self.restore(&partials, "auto_save_restored"))
    }

    /// Hydrate against the live items first, then the catalog
    fn restore(&mut self, partials: &[PartialItem], description: &str) -> LoadReport {
        let room = self.editor.room().get();
        let live = self.editor.items().to_vec();
        let sources: Vec<&dyn CatalogLookup> = vec![&live, &self.catalog];
        let lookup = ChainedLookup::new(sources);
        let (mut items, errors) = hydrate_all(partials, &lookup, &room);
        self.catalog.attach_wall_mounts(&mut items, &room);

        let loaded = self.editor.replace_items(items, description);
        let skipped = errors
            .into_iter()
            .map(|e| match e {
                crate::persistence::HydrateError::UnknownCatalogEntry { id } => id,
            })
            .collect();
        tracing::info!("Restored {loaded} items ({description})");
        LoadReport { loaded, skipped }
    }

    // ── Inspection ────────────────────────────────────────────

    pub fn item_count(&self) -> usize {
        self.editor.item_count()
    }

    pub fn item(&self, id: &str) -> Option<&Item> {
        self.editor.get_item(id)
    }

    pub fn position_of(&self, id: &str) -> Option<[f64; 3]> {
        self.item(id).map(Item::position)
    }

    /// Every item is inside the room
    pub fn all_contained(&self) -> bool {
        self.editor
            .items()
            .iter()
            .all(|item| self.editor.boundary().contains(item))
    }

    pub fn export_layout_json(&self) -> String {
        serde_json::to_string_pretty(self.editor.items()).unwrap_or_default()
    }
}
