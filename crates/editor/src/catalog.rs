//! Item catalog
//!
//! The catalog is the source of footprints and display names. Compressed
//! snapshots only keep transforms, so restoring a layout re-joins every
//! item id against a [`CatalogLookup`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use shared::{Axis, Footprint, Item, RoomDimensions, WallMount};

use crate::room::{mount_from_position, nearest_wall, place_on_wall, WallGeometry};

/// Wall height used when a wall-only entry does not name one (meters)
pub const DEFAULT_WALL_HEIGHT: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Living,
    Bedroom,
    Kitchen,
    Bathroom,
    Office,
    Outdoor,
    Decorative,
    Storage,
}

/// Placement rules for a catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementRules {
    #[serde(default = "default_true")]
    pub can_rotate: bool,
    #[serde(default = "default_true")]
    pub can_scale: bool,
    /// Height of the item's lower face above the floor
    #[serde(default)]
    pub floor_offset: f64,
    /// Item can only hang on a wall
    #[serde(default)]
    pub wall_only: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wall_height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wall_offset: Option<f64>,
}

fn default_true() -> bool {
    true
}

fn default_front_axis() -> Axis {
    Axis::NegZ
}

fn default_up_axis() -> Axis {
    Axis::PosY
}

impl Default for PlacementRules {
    fn default() -> Self {
        Self {
            can_rotate: true,
            can_scale: true,
            floor_offset: 0.0,
            wall_only: false,
            wall_height: None,
            wall_offset: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub key: String,
    pub name: String,
    pub category: Category,
    pub footprint: Footprint,
    #[serde(default)]
    pub placement: PlacementRules,
    /// Model axis that faces the viewer
    #[serde(default = "default_front_axis")]
    pub front_axis: Axis,
    #[serde(default = "default_up_axis")]
    pub up_axis: Axis,
}

impl CatalogEntry {
    fn floor(key: &str, name: &str, category: Category, w: f64, d: f64, h: f64) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            category,
            footprint: Footprint::new(w, d, h),
            placement: PlacementRules::default(),
            front_axis: Axis::NegZ,
            up_axis: Axis::PosY,
        }
    }

    fn wall(mut self, height: f64) -> Self {
        self.placement.wall_only = true;
        self.placement.wall_height = Some(height);
        self.placement.can_scale = false;
        self
    }

    fn wall_mount(&self, side: shared::WallSide) -> WallMount {
        let mut mount = WallMount::new(
            side,
            0.0,
            self.placement.wall_height.unwrap_or(DEFAULT_WALL_HEIGHT),
        );
        mount.offset = self.placement.wall_offset.unwrap_or(0.0);
        mount.front = self.front_axis;
        mount.up = self.up_axis;
        mount
    }
}

/// Builtin entries
pub fn builtin_entries() -> Vec<CatalogEntry> {
    use Category::*;
    vec![
        CatalogEntry::floor("sofa-001", "Modern Sofa", Living, 2.2, 0.9, 0.8),
        CatalogEntry::floor("sofa-luxury-001", "Luxury Sofa", Living, 2.5, 1.0, 0.85),
        CatalogEntry::floor("sofa-sectional-001", "Sectional Sofa", Living, 3.0, 2.5, 0.8),
        CatalogEntry::floor("coffee-table-001", "Glass Coffee Table", Living, 1.2, 0.6, 0.45),
        CatalogEntry::floor("side-table-001", "Side Table", Living, 0.5, 0.5, 0.6),
        CatalogEntry::floor("tv-stand-001", "TV Stand", Living, 1.8, 0.4, 0.6),
        CatalogEntry::floor("wall-tv-mount", "Wall TV Mount", Living, 1.2, 0.1, 0.8).wall(0.8),
        CatalogEntry::floor("floor-lamp-001", "Floor Lamp", Living, 0.4, 0.4, 1.8),
        CatalogEntry::floor("bed-001", "Queen Size Bed", Bedroom, 1.6, 2.0, 0.6),
        CatalogEntry::floor("bed-single-001", "Single Bed", Bedroom, 1.0, 2.0, 0.6),
        CatalogEntry::floor("bedside-table-001", "Bedside Table", Bedroom, 0.5, 0.4, 0.65),
        CatalogEntry::floor("dresser-001", "Dresser", Bedroom, 1.0, 0.5, 0.8),
        CatalogEntry::floor("wardrobe-001", "Wardrobe", Bedroom, 1.2, 0.6, 2.0),
        CatalogEntry::floor("dining-table-001", "Round Dining Table", Kitchen, 1.4, 1.4, 0.75),
        CatalogEntry::floor("simple-chair-001", "Simple Chair", Kitchen, 0.5, 0.5, 0.9),
        CatalogEntry::floor("desk-001", "Office Desk", Office, 1.4, 0.7, 0.75),
        CatalogEntry::floor("office-chair-001", "Office Chair", Office, 0.6, 0.6, 1.2),
        CatalogEntry::floor("bookshelf-001", "Tall Bookshelf", Storage, 0.8, 0.4, 2.0),
        CatalogEntry::floor("plant-stand-001", "Plant Stand", Decorative, 0.4, 0.4, 1.0),
        CatalogEntry::floor("clock", "Wall Clock", Decorative, 0.4, 0.1, 0.4).wall(1.8),
        CatalogEntry::floor("wall-art-001", "Wall Art Frame", Decorative, 0.8, 0.05, 1.0).wall(1.0),
    ]
}

/// What a lookup knows about an item id
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogMatch {
    pub name: String,
    pub catalog_key: Option<String>,
    pub footprint: Footprint,
    /// Mount template for wall items; `u`/`height` are recomputed on hydrate
    pub wall_mount: Option<WallMount>,
}

/// Source of footprint and display data for item ids
pub trait CatalogLookup {
    fn lookup(&self, item_id: &str) -> Option<CatalogMatch>;
}

#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    index: HashMap<String, usize>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Catalog {
    pub fn builtin() -> Self {
        Self::from_entries(builtin_entries())
    }

    /// Later entries replace earlier ones with the same key
    pub fn from_entries(entries: Vec<CatalogEntry>) -> Self {
        let mut catalog = Self {
            entries: Vec::new(),
            index: HashMap::new(),
        };
        for entry in entries {
            catalog.insert(entry);
        }
        catalog
    }

    /// Parse a JSON array of entries
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let entries: Vec<CatalogEntry> = serde_json::from_str(json)?;
        Ok(Self::from_entries(entries))
    }

    /// Add or replace an entry
    pub fn insert(&mut self, entry: CatalogEntry) {
        match self.index.get(&entry.key) {
            Some(&i) => self.entries[i] = entry,
            None => {
                self.index.insert(entry.key.clone(), self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&CatalogEntry> {
        self.index.get(key).map(|&i| &self.entries[i])
    }

    pub fn by_category(&self, category: Category) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter().filter(move |e| e.category == category)
    }

    /// Entry for an item id: the exact key, else the longest key `k` such
    /// that the id starts with `k_`.
    pub fn resolve(&self, item_id: &str) -> Option<&CatalogEntry> {
        if let Some(entry) = self.get(item_id) {
            return Some(entry);
        }
        self.entries
            .iter()
            .filter(|e| {
                item_id.len() > e.key.len()
                    && item_id.starts_with(e.key.as_str())
                    && item_id.as_bytes()[e.key.len()] == b'_'
            })
            .max_by_key(|e| e.key.len())
    }

    /// New item from an entry, with id `{key}_{8 hex chars}`.
    ///
    /// Wall-only entries are mounted on the wall nearest to `position` at
    /// their configured height. The result is not clamped.
    pub fn create_item(&self, key: &str, position: [f64; 3], room: &RoomDimensions) -> Option<Item> {
        let entry = self.get(key)?;
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        let id = format!("{}_{}", entry.key, &suffix[..8]);

        let mut item = Item::new(id, entry.name.clone(), entry.footprint);
        item.catalog_key = Some(entry.key.clone());
        item.transform.position = [
            position[0],
            entry.placement.floor_offset + entry.footprint.height / 2.0,
            position[2],
        ];

        if entry.placement.wall_only {
            let side = nearest_wall(position, room);
            let mount = entry.wall_mount(side);
            let tangent = side.tangent();
            let u = tangent.x * position[0] + tangent.z * position[2];
            item.wall_mount = Some(mount.clone());
            item = place_on_wall(&item, room, side, u, mount.height, mount.offset);
        }
        Some(item)
    }

    /// Give wall-only items without a mount one on their nearest wall,
    /// keeping their current position as far as the wall allows.
    pub fn attach_wall_mounts(&self, items: &mut [Item], room: &RoomDimensions) {
        for item in items.iter_mut().filter(|i| i.wall_mount.is_none()) {
            let Some(entry) = self.resolve(&item.id) else {
                continue;
            };
            if !entry.placement.wall_only {
                continue;
            }
            let side = nearest_wall(item.position(), room);
            item.wall_mount = Some(entry.wall_mount(side));
            item.wall_mount = Some(mount_from_position(item, side));
        }
    }
}

impl CatalogLookup for Catalog {
    fn lookup(&self, item_id: &str) -> Option<CatalogMatch> {
        let entry = self.resolve(item_id)?;
        Some(CatalogMatch {
            name: entry.name.clone(),
            catalog_key: Some(entry.key.clone()),
            footprint: entry.footprint,
            // The wall is only known from a position; see `attach_wall_mounts`
            wall_mount: None,
        })
    }
}

/// Live items act as a catalog for their own ids
impl CatalogLookup for [Item] {
    fn lookup(&self, item_id: &str) -> Option<CatalogMatch> {
        let item = self.iter().find(|i| i.id == item_id)?;
        Some(CatalogMatch {
            name: item.name.clone(),
            catalog_key: item.catalog_key.clone(),
            footprint: item.footprint,
            wall_mount: item.wall_mount.clone(),
        })
    }
}

impl CatalogLookup for Vec<Item> {
    fn lookup(&self, item_id: &str) -> Option<CatalogMatch> {
        self.as_slice().lookup(item_id)
    }
}

/// Tries each source in order
pub struct ChainedLookup<'a> {
    sources: Vec<&'a dyn CatalogLookup>,
}

impl<'a> ChainedLookup<'a> {
    pub fn new(sources: Vec<&'a dyn CatalogLookup>) -> Self {
        Self { sources }
    }
}

impl CatalogLookup for ChainedLookup<'_> {
    fn lookup(&self, item_id: &str) -> Option<CatalogMatch> {
        self.sources.iter().find_map(|s| s.lookup(item_id))
    }
}
