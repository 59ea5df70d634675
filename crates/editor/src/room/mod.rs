//! Room configuration and boundary enforcement.
//!
//! `RoomConfig` is a shared handle to the active room dimensions. The
//! boundary engine and snap calculator hold clones of the same handle, so a
//! dimension update is visible to both without any global state.

pub mod orientation;
pub mod wall;

use std::sync::{Arc, RwLock};

use glam::DVec3;
use shared::{Item, RoomDimensions, RoomDimensionsUpdate};

use crate::geometry::{half_extents, item_bounds, Aabb};
use crate::sanitize::finite_or;

pub use orientation::{axis_vector, euler_to_quat, facing_rotation, quat_to_euler};
pub use wall::{
    clamp_wall_mount, mount_from_position, nearest_wall, oriented_half_extents, place_on_wall,
    wall_face, WallGeometry,
};

/// Tolerance for containment checks after clamping
pub const CONTAINMENT_TOLERANCE: f64 = 1e-9;

/// Shared, replaceable room configuration (last write wins)
#[derive(Debug, Clone, Default)]
pub struct RoomConfig {
    inner: Arc<RwLock<RoomDimensions>>,
}

impl RoomConfig {
    pub fn new(dimensions: RoomDimensions) -> Self {
        Self {
            inner: Arc::new(RwLock::new(dimensions)),
        }
    }

    /// Current dimensions (copy)
    pub fn get(&self) -> RoomDimensions {
        match self.inner.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// Merge a partial update into the active configuration.
    ///
    /// Sizes must be finite and positive, thickness and margin finite and
    /// non-negative. Invalid fields are ignored.
    pub fn update(&self, update: &RoomDimensionsUpdate) -> RoomDimensions {
        let positive = |v: Option<f64>| v.filter(|v| v.is_finite() && *v > 0.0);
        let non_negative = |v: Option<f64>| v.filter(|v| v.is_finite() && *v >= 0.0);
        let clean = RoomDimensionsUpdate {
            width: positive(update.width),
            depth: positive(update.depth),
            height: positive(update.height),
            wall_thickness: non_negative(update.wall_thickness),
            margin: non_negative(update.margin),
        };
        if clean != *update {
            tracing::warn!("Ignoring invalid room dimension fields in {:?}", update);
        }

        let merged = self.get().merged(&clean);
        self.replace(merged);
        merged
    }

    /// Replace the whole configuration
    pub fn replace(&self, dimensions: RoomDimensions) {
        match self.inner.write() {
            Ok(mut guard) => *guard = dimensions,
            Err(poisoned) => *poisoned.into_inner() = dimensions,
        }
        tracing::info!(
            "Room set to {}x{}x{} (margin {})",
            dimensions.width,
            dimensions.depth,
            dimensions.height,
            dimensions.margin
        );
    }

    pub fn envelope(&self) -> Envelope {
        Envelope::from_dimensions(&self.get())
    }
}

/// Usable interior volume of the room
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
    pub min_z: f64,
    pub max_z: f64,
}

impl Envelope {
    pub fn from_dimensions(room: &RoomDimensions) -> Self {
        Self {
            min_x: -room.width / 2.0 + room.margin,
            max_x: room.width / 2.0 - room.margin,
            min_y: 0.0,
            max_y: room.height - room.margin,
            min_z: -room.depth / 2.0 + room.margin,
            max_z: room.depth / 2.0 - room.margin,
        }
    }

    pub fn as_aabb(&self) -> Aabb {
        Aabb::new(
            DVec3::new(self.min_x, self.min_y, self.min_z),
            DVec3::new(self.max_x, self.max_y, self.max_z),
        )
    }

    /// Closed floor outline `[x, z]` for boundary display (first point repeated)
    pub fn outline(&self) -> [[f64; 2]; 5] {
        [
            [self.min_x, self.min_z],
            [self.max_x, self.min_z],
            [self.max_x, self.max_z],
            [self.min_x, self.max_z],
            [self.min_x, self.min_z],
        ]
    }
}

/// Pull `center` so `[center - half, center + half]` fits in `[min, max]`.
/// Too-large spans are centred.
fn clamp_axis(center: f64, half: f64, min: f64, max: f64) -> f64 {
    if max - min < 2.0 * half {
        return (min + max) / 2.0;
    }
    let lo = min + half;
    let hi = max - half;
    if center < lo {
        lo
    } else if center > hi {
        hi
    } else {
        center
    }
}

/// Authoritative containment and clamping against the room envelope
#[derive(Debug, Clone)]
pub struct BoundaryEngine {
    room: RoomConfig,
    /// Extra clearance added to item extents (0 by default)
    safety_margin: f64,
}

impl BoundaryEngine {
    pub fn new(room: RoomConfig) -> Self {
        Self {
            room,
            safety_margin: 0.0,
        }
    }

    pub fn with_safety_margin(mut self, margin: f64) -> Self {
        self.safety_margin = finite_or(margin, 0.0).max(0.0);
        self
    }

    pub fn room(&self) -> &RoomConfig {
        &self.room
    }

    pub fn safety_margin(&self) -> f64 {
        self.safety_margin
    }

    pub fn envelope(&self) -> Envelope {
        self.room.envelope()
    }

    /// True if the item lies fully inside the room.
    ///
    /// Floor items are tested against the margin envelope. Wall items may
    /// touch their wall, so they are tested against the bare interior faces.
    pub fn contains(&self, item: &Item) -> bool {
        if item.is_wall_mounted() {
            let room = self.room.get();
            let walls = Aabb::new(
                DVec3::new(-room.width / 2.0, 0.0, -room.depth / 2.0),
                DVec3::new(room.width / 2.0, room.height - room.margin, room.depth / 2.0),
            );
            let bounds = Aabb::from_center_half_extents(
                DVec3::from_array(item.position()),
                oriented_half_extents(item),
            );
            return walls.contains(&bounds, CONTAINMENT_TOLERANCE);
        }

        self.envelope()
            .as_aabb()
            .contains(&item_bounds(item, self.safety_margin), CONTAINMENT_TOLERANCE)
    }

    /// Position that brings `item` inside the room if it were at `position`
    pub fn clamp_position(&self, item: &Item, position: [f64; 3]) -> [f64; 3] {
        let env = self.envelope();
        let half = half_extents(item) + DVec3::splat(self.safety_margin);
        let fallback = item.position();
        let x = finite_or(position[0], finite_or(fallback[0], 0.0));
        let y = finite_or(position[1], finite_or(fallback[1], half.y));
        let z = finite_or(position[2], finite_or(fallback[2], 0.0));

        [
            clamp_axis(x, half.x, env.min_x, env.max_x),
            clamp_axis(y, half.y, env.min_y, env.max_y),
            clamp_axis(z, half.z, env.min_z, env.max_z),
        ]
    }

    /// Copy of `item` moved back inside the room. Rotation and scale are kept.
    ///
    /// Wall items are re-derived from their wall coordinates instead.
    pub fn clamp(&self, item: &Item) -> Item {
        if item.is_wall_mounted() {
            return clamp_wall_mount(item, &self.room.get());
        }

        let clamped = self.clamp_position(item, item.position());
        let mut out = item.clone();
        if clamped != item.position() {
            tracing::debug!(
                "Clamped {} from {:?} to {:?}",
                item.id,
                item.position(),
                clamped
            );
        }
        out.transform.position = clamped;
        out
    }

    pub fn is_wall_mounted(&self, item: &Item) -> bool {
        item.is_wall_mounted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{Footprint, WallSide};
    use std::f64::consts::FRAC_PI_4;

    const EPS: f64 = 1e-9;

    fn engine() -> BoundaryEngine {
        BoundaryEngine::new(RoomConfig::default())
    }

    #[test]
    fn test_envelope_from_defaults() {
        let env = RoomConfig::default().envelope();
        assert!((env.min_x + 4.7).abs() < EPS);
        assert!((env.max_x - 4.7).abs() < EPS);
        assert!((env.max_y - 4.7).abs() < EPS);
        assert_eq!(env.min_y, 0.0);
        let outline = env.outline();
        assert_eq!(outline[0], outline[4]);
    }

    #[test]
    fn test_clamp_pulls_item_off_east_wall() {
        let item = Item::new("t", "Table", Footprint::new(2.0, 1.5, 0.8))
            .with_position([4.9, 0.0, 0.0]);
        let clamped = engine().clamp(&item);
        assert!((clamped.position()[0] - 3.7).abs() < EPS);
        assert!((clamped.position()[1] - 0.4).abs() < EPS);
        assert_eq!(clamped.position()[2], 0.0);
        assert_eq!(clamped.transform.rotation, item.transform.rotation);
        assert!(engine().contains(&clamped));
        assert!(!engine().contains(&item));
    }

    #[test]
    fn test_clamp_idempotent_and_contained_over_sweep() {
        let engine = engine();
        for i in -8..=8 {
            for j in -8i32..=8 {
                let item = Item::new("s", "S", Footprint::new(1.7, 0.9, 1.1))
                    .with_position([i as f64 * 0.9, j as f64 * 0.4, j as f64 * 0.8])
                    .with_yaw(i as f64 * 0.37)
                    .with_scale([1.0 + (j.abs() as f64) * 0.1, 1.0, 0.8]);
                let once = engine.clamp(&item);
                let twice = engine.clamp(&once);
                for k in 0..3 {
                    assert!((once.position()[k] - twice.position()[k]).abs() < EPS);
                }
                assert!(engine.contains(&once), "not contained at ({i}, {j})");
            }
        }
    }

    #[test]
    fn test_oversized_item_is_centred() {
        let huge = Item::new("h", "Huge", Footprint::new(12.0, 1.0, 1.0))
            .with_position([3.0, 0.5, 1.0]);
        let clamped = engine().clamp(&huge);
        assert_eq!(clamped.position()[0], 0.0);
        assert_eq!(clamped.position()[2], 1.0);
    }

    #[test]
    fn test_non_finite_position_is_sanitised() {
        let item = Item::new("n", "N", Footprint::unit()).with_position([f64::NAN, 0.5, 1.0]);
        let clamped = engine().clamp(&item);
        assert_eq!(clamped.position()[0], 0.0);
        assert!(engine().contains(&clamped));
    }

    #[test]
    fn test_rotated_item_uses_projected_extents() {
        let item = Item::new("r", "R", Footprint::new(2.0, 2.0, 1.0))
            .with_position([4.6, 0.5, 0.0])
            .with_yaw(FRAC_PI_4);
        let clamped = engine().clamp(&item);
        let half = 2.0 * FRAC_PI_4.cos();
        assert!((clamped.position()[0] - (4.7 - half)).abs() < EPS);
    }

    #[test]
    fn test_safety_margin_shrinks_usable_space() {
        let engine = engine().with_safety_margin(0.1);
        let item = Item::new("t", "T", Footprint::new(2.0, 1.5, 0.8))
            .with_position([4.9, 0.4, 0.0]);
        let clamped = engine.clamp(&item);
        assert!((clamped.position()[0] - 3.6).abs() < EPS);
        assert!(engine.contains(&clamped));
    }

    #[test]
    fn test_room_update_is_shared_and_sanitised() {
        let room = RoomConfig::default();
        let engine = BoundaryEngine::new(room.clone());

        let merged = room.update(&RoomDimensionsUpdate {
            width: Some(6.0),
            depth: Some(-1.0),
            margin: Some(f64::NAN),
            ..Default::default()
        });
        assert_eq!(merged.width, 6.0);
        assert_eq!(merged.depth, 10.0);
        assert_eq!(merged.margin, 0.3);
        assert!((engine.envelope().max_x - 2.7).abs() < EPS);
    }

    #[test]
    fn test_wall_items_may_touch_their_wall() {
        let room = RoomConfig::default();
        let engine = BoundaryEngine::new(room.clone());
        let clock = Item::new("c", "Clock", Footprint::new(0.4, 0.1, 0.4));
        let mounted = place_on_wall(&clock, &room.get(), WallSide::North, 0.0, 1.0, 0.0);
        assert!(engine.contains(&mounted));

        let mut moved = mounted.clone();
        moved.wall_mount.as_mut().unwrap().u = 40.0;
        let clamped = engine.clamp(&moved);
        assert!((clamped.wall_mount.unwrap().u - 4.5).abs() < EPS);
    }
}
