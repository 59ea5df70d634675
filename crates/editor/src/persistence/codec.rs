//! Compressed snapshot encoding

use shared::{CompressedItem, CompressedSnapshot, Footprint, Item, ItemId, RoomDimensions, Transform};

use super::HydrateError;
use crate::catalog::CatalogLookup;
use crate::room::{mount_from_position, nearest_wall};

/// Flatten items into a snapshot
pub fn encode(items: &[Item], description: &str, timestamp: u64) -> CompressedSnapshot {
    CompressedSnapshot {
        items: items
            .iter()
            .map(|item| CompressedItem {
                id: item.id.clone(),
                pos: item.transform.position,
                rot: item.transform.rotation,
                scl: item.transform.scale,
                locked: item.locked,
            })
            .collect(),
        timestamp,
        description: description.to_string(),
    }
}

/// Item as far as a snapshot can restore it
#[derive(Debug, Clone, PartialEq)]
pub struct PartialItem {
    pub id: ItemId,
    pub transform: Transform,
    pub locked: bool,
}

pub fn decode(snapshot: &CompressedSnapshot) -> Vec<PartialItem> {
    snapshot
        .items
        .iter()
        .map(|c| PartialItem {
            id: c.id.clone(),
            transform: Transform {
                position: c.pos,
                rotation: c.rot,
                scale: c.scl,
            },
            locked: c.locked,
        })
        .collect()
}

impl PartialItem {
    /// Re-join footprint and display data from a catalog
    pub fn hydrate(&self, lookup: &dyn CatalogLookup) -> Result<Item, HydrateError> {
        let found = lookup
            .lookup(&self.id)
            .ok_or_else(|| HydrateError::UnknownCatalogEntry {
                id: self.id.clone(),
            })?;

        let mut item = Item::new(self.id.clone(), found.name, found.footprint);
        item.catalog_key = found.catalog_key;
        item.transform = self.transform.clone();
        item.locked = self.locked;
        if let Some(template) = found.wall_mount {
            let side = template.side;
            item.wall_mount = Some(template);
            item.wall_mount = Some(mount_from_position(&item, side));
        }
        Ok(item)
    }

    /// Like [`hydrate`](Self::hydrate), but a wall item's side is taken
    /// from the stored position. The lookup only supplies offset and
    /// model axes, so a live item remounted since the save does not move
    /// the restored one to its new wall.
    pub fn hydrate_in_room(
        &self,
        lookup: &dyn CatalogLookup,
        room: &RoomDimensions,
    ) -> Result<Item, HydrateError> {
        let mut item = self.hydrate(lookup)?;
        if item.wall_mount.is_some() {
            let side = nearest_wall(item.position(), room);
            item.wall_mount = Some(mount_from_position(&item, side));
        }
        Ok(item)
    }

    /// Stand-in item when no catalog knows the id: named after the id,
    /// with a one meter cube footprint
    pub fn into_placeholder(self) -> Item {
        let mut item = Item::new(self.id.clone(), self.id, Footprint::unit());
        item.transform = self.transform;
        item.locked = self.locked;
        item
    }
}

/// Hydrate every item into `room`. Items the lookup does not know are
/// skipped and returned as errors.
pub fn hydrate_all(
    partials: &[PartialItem],
    lookup: &dyn CatalogLookup,
    room: &RoomDimensions,
) -> (Vec<Item>, Vec<HydrateError>) {
    let mut items = Vec::with_capacity(partials.len());
    let mut errors = Vec::new();
    for partial in partials {
        match partial.hydrate_in_room(lookup, room) {
            Ok(item) => items.push(item),
            Err(e) => {
                tracing::warn!("Skipping item on restore: {e}");
                errors.push(e);
            }
        }
    }
    (items, errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use shared::{WallMount, WallSide};

    fn sofa() -> Item {
        let mut item = Item::new("sofa-001_a1b2c3d4", "Modern Sofa", Footprint::new(2.2, 0.9, 0.8))
            .with_position([1.0, 0.4, -2.0])
            .with_yaw(0.5)
            .with_scale([1.0, 1.2, 1.0]);
        item.catalog_key = Some("sofa-001".into());
        item.locked = true;
        item
    }

    #[test]
    fn test_encode_keeps_only_transform_and_lock() {
        let snapshot = encode(&[sofa()], "manual_save", 42);
        assert_eq!(snapshot.timestamp, 42);
        assert_eq!(snapshot.description, "manual_save");
        let json = serde_json::to_value(&snapshot).unwrap();
        let entry = &json["items"][0];
        assert_eq!(entry["id"], "sofa-001_a1b2c3d4");
        assert_eq!(entry["scl"][1], 1.2);
        assert_eq!(entry["locked"], true);
        assert!(entry.get("name").is_none());
        assert!(entry.get("footprint").is_none());
    }

    #[test]
    fn test_decode_without_catalog_gives_placeholders() {
        let snapshot = encode(&[sofa()], "manual_save", 0);
        let partial = decode(&snapshot).remove(0);
        let placeholder = partial.into_placeholder();
        assert_eq!(placeholder.name, "sofa-001_a1b2c3d4");
        assert_eq!(placeholder.footprint, Footprint::unit());
        assert_eq!(placeholder.transform, sofa().transform);
        assert!(placeholder.locked);
    }

    #[test]
    fn test_hydrate_from_catalog() {
        let catalog = Catalog::builtin();
        let partials = decode(&encode(&[sofa()], "manual_save", 0));
        let item = partials[0].hydrate(&catalog).unwrap();
        assert_eq!(item, sofa());
    }

    #[test]
    fn test_hydrate_all_reports_unknown_ids() {
        let catalog = Catalog::builtin();
        let ghost = Item::new("ghost_1", "Ghost", Footprint::unit());
        let partials = decode(&encode(&[sofa(), ghost], "auto_save", 0));
        let (items, errors) = hydrate_all(&partials, &catalog, &RoomDimensions::default());
        assert_eq!(items.len(), 1);
        assert_eq!(
            errors,
            vec![HydrateError::UnknownCatalogEntry {
                id: "ghost_1".into()
            }]
        );
    }

    #[test]
    fn test_hydrate_wall_item_from_live_list() {
        let mut clock = Item::new("clock_1", "Clock", Footprint::new(0.4, 0.1, 0.4))
            .with_position([1.0, 2.0, -4.95]);
        clock.wall_mount = Some(WallMount::new(WallSide::North, 0.0, 0.0));
        let live = vec![clock.clone()];

        let mut moved = clock.clone();
        moved.transform.position = [-2.0, 1.2, -4.95];
        let partials = decode(&encode(&[moved], "manual_save", 0));
        let item = partials[0].hydrate(&live).unwrap();
        let mount = item.wall_mount.unwrap();
        assert_eq!(mount.side, WallSide::North);
        assert!((mount.u + 2.0).abs() < 1e-9);
        assert!((mount.height - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_hydrate_in_room_takes_side_from_position() {
        let room = RoomDimensions::default();
        let mut clock = Item::new("clock_1", "Clock", Footprint::new(0.4, 0.1, 0.4))
            .with_position([1.0, 2.0, -4.95]);
        clock.wall_mount = Some(WallMount::new(WallSide::North, 1.0, 1.8));
        let partials = decode(&encode(&[clock.clone()], "manual_save", 0));

        // The live clock has since moved to the east wall
        let mut remounted = clock;
        remounted.transform.position = [4.95, 1.2, 0.0];
        remounted.wall_mount = Some(WallMount::new(WallSide::East, 0.0, 1.0));
        let live = vec![remounted];

        let item = partials[0].hydrate_in_room(&live, &room).unwrap();
        let mount = item.wall_mount.unwrap();
        assert_eq!(mount.side, WallSide::North);
        assert!((mount.u - 1.0).abs() < 1e-9);
        assert!((mount.height - 1.8).abs() < 1e-9);
        assert_eq!(item.transform.position, [1.0, 2.0, -4.95]);
    }
}
