//! Factory functions for creating test data.
//!
//! Provides helpers to construct `Item`s, rooms and layouts used in tests
//! and by scripted command sessions.

use shared::*;

// ── Item factories ──────────────────────────────────────────────

/// Floor item of the given footprint, resting on the floor at `(x, z)`.
pub fn floor_item(id: &str, w: f64, d: f64, h: f64, x: f64, z: f64) -> Item {
    Item::new(id, id, Footprint::new(w, d, h)).with_position([x, h / 2.0, z])
}

/// Unit cube resting on the floor at `(x, z)`.
pub fn unit_cube_at(id: &str, x: f64, z: f64) -> Item {
    floor_item(id, 1.0, 1.0, 1.0, x, z)
}

/// Wall item with the default model orientation, not yet clamped.
pub fn wall_item(id: &str, w: f64, d: f64, h: f64, side: WallSide, u: f64, height: f64) -> Item {
    let mut item = Item::new(id, id, Footprint::new(w, d, h));
    item.wall_mount = Some(WallMount::new(side, u, height));
    item
}

/// Wall clock sized like the catalog entry.
pub fn clock_on(id: &str, side: WallSide, u: f64, height: f64) -> Item {
    wall_item(id, 0.4, 0.1, 0.4, side, u, height)
}

/// `n` unit cubes in a row along X, two meters apart, centred on the origin.
pub fn cube_row(n: usize) -> Vec<Item> {
    let start = -((n.saturating_sub(1)) as f64);
    (0..n)
        .map(|i| unit_cube_at(&format!("cube_{i}"), start + 2.0 * i as f64, 0.0))
        .collect()
}

// ── Room factories ──────────────────────────────────────────────

/// Room with the default wall thickness and margin.
pub fn room(width: f64, depth: f64, height: f64) -> RoomDimensions {
    RoomDimensions {
        width,
        depth,
        height,
        ..RoomDimensions::default()
    }
}

/// Room with no margin, so the envelope equals the inner walls.
pub fn bare_room(width: f64, depth: f64, height: f64) -> RoomDimensions {
    RoomDimensions {
        margin: 0.0,
        ..room(width, depth, height)
    }
}

// ── Layouts ─────────────────────────────────────────────────────

/// Small living room arrangement with catalog-style ids.
pub fn living_room_items() -> Vec<Item> {
    let mut sofa = Item::new("sofa-001_fixture", "Modern Sofa", Footprint::new(2.2, 0.9, 0.8))
        .with_position([0.0, 0.4, -2.0]);
    sofa.catalog_key = Some("sofa-001".into());

    let mut table = Item::new(
        "coffee-table-001_fixture",
        "Glass Coffee Table",
        Footprint::new(1.2, 0.6, 0.45),
    )
    .with_position([0.0, 0.225, 0.0]);
    table.catalog_key = Some("coffee-table-001".into());

    let mut lamp = Item::new("floor-lamp-001_fixture", "Floor Lamp", Footprint::new(0.4, 0.4, 1.8))
        .with_position([2.0, 0.9, -2.0])
        .with_yaw(0.5);
    lamp.catalog_key = Some("floor-lamp-001".into());
    lamp.locked = true;

    vec![sofa, table, lamp]
}
