//! Wall-mounted placement.
//!
//! A wall item lives on a vertical strip: a coordinate `u` along the wall
//! and a `height` of its lower face above the floor. Its 3D transform is
//! always re-derived from `(u, height)` so repeated edits stay exact.
//!
//! Walls sit at the room's interior faces. The general room margin does not
//! push wall items away from their own wall.

use std::f64::consts::{FRAC_PI_2, PI};

use glam::{DQuat, DVec3};
use shared::{Item, RoomDimensions, WallMount, WallSide};

use super::orientation::{facing_rotation, quat_to_euler};
use super::Envelope;
use crate::sanitize::finite_or;

/// Directions attached to each wall
pub trait WallGeometry {
    /// Fixed yaw that turns the canonical front (-Z) into the room
    fn base_yaw(self) -> f64;
    /// Unit normal pointing from the wall into the room
    fn inward_normal(self) -> DVec3;
    /// Unit direction of increasing `u` along the wall
    fn tangent(self) -> DVec3;
}

impl WallGeometry for WallSide {
    fn base_yaw(self) -> f64 {
        match self {
            WallSide::South => 0.0,
            WallSide::North => PI,
            WallSide::East => FRAC_PI_2,
            WallSide::West => -FRAC_PI_2,
        }
    }

    fn inward_normal(self) -> DVec3 {
        match self {
            WallSide::West => DVec3::X,
            WallSide::East => DVec3::NEG_X,
            WallSide::North => DVec3::Z,
            WallSide::South => DVec3::NEG_Z,
        }
    }

    fn tangent(self) -> DVec3 {
        match self {
            WallSide::West | WallSide::East => DVec3::Z,
            WallSide::North | WallSide::South => DVec3::X,
        }
    }
}

/// Coordinate of the wall's interior face along its normal axis
pub fn wall_face(side: WallSide, room: &RoomDimensions) -> f64 {
    match side {
        WallSide::West => -room.width / 2.0,
        WallSide::East => room.width / 2.0,
        WallSide::North => -room.depth / 2.0,
        WallSide::South => room.depth / 2.0,
    }
}

/// Scaled local half-sizes `(x, y, z)` before any rotation
fn local_half_sizes(item: &Item) -> DVec3 {
    let [w, h, d] = item.scaled_size();
    DVec3::new(w, h, d) * 0.5
}

/// Half-extent of an oriented box along a world direction
pub fn oriented_half_extent(rotation: DQuat, half: DVec3, direction: DVec3) -> f64 {
    (rotation * DVec3::X).dot(direction).abs() * half.x
        + (rotation * DVec3::Y).dot(direction).abs() * half.y
        + (rotation * DVec3::Z).dot(direction).abs() * half.z
}

/// World-axis half-extents of an item under its full rotation
pub fn oriented_half_extents(item: &Item) -> DVec3 {
    let rotation = super::orientation::euler_to_quat(item.transform.rotation);
    let half = local_half_sizes(item);
    DVec3::new(
        oriented_half_extent(rotation, half, DVec3::X),
        oriented_half_extent(rotation, half, DVec3::Y),
        oriented_half_extent(rotation, half, DVec3::Z),
    )
}

fn clamp_range(value: f64, lo: f64, hi: f64) -> f64 {
    if lo > hi {
        (lo + hi) / 2.0
    } else if value < lo {
        lo
    } else if value > hi {
        hi
    } else {
        value
    }
}

fn tangent_range(side: WallSide, envelope: &Envelope) -> (f64, f64) {
    match side {
        WallSide::West | WallSide::East => (envelope.min_z, envelope.max_z),
        WallSide::North | WallSide::South => (envelope.min_x, envelope.max_x),
    }
}

/// Re-derive a wall item's transform from its clamped `(u, height)`.
///
/// Items without a wall mount are returned unchanged.
pub fn clamp_wall_mount(item: &Item, room: &RoomDimensions) -> Item {
    let Some(mount) = item.wall_mount.as_ref() else {
        return item.clone();
    };
    let side = mount.side;
    let envelope = Envelope::from_dimensions(room);

    let rotation = facing_rotation(mount.front, mount.up, side);
    let half = local_half_sizes(item);
    let along_wall = oriented_half_extent(rotation, half, side.tangent());
    let along_normal = oriented_half_extent(rotation, half, side.inward_normal());
    let vertical = oriented_half_extent(rotation, half, DVec3::Y);

    let (wall_min, wall_max) = tangent_range(side, &envelope);
    let u = clamp_range(
        finite_or(mount.u, 0.0),
        wall_min + along_wall,
        wall_max - along_wall,
    );
    let height = clamp_range(
        finite_or(mount.height, 0.0),
        0.0,
        envelope.max_y - 2.0 * vertical,
    );
    let offset = finite_or(mount.offset, 0.0).max(0.0);

    let normal = side.inward_normal();
    let face = wall_face(side, room);
    // Wall plane point at the face, then out along the normal
    let on_plane = match side {
        WallSide::West | WallSide::East => DVec3::new(face, 0.0, 0.0),
        WallSide::North | WallSide::South => DVec3::new(0.0, 0.0, face),
    };
    let position = on_plane
        + side.tangent() * u
        + normal * (along_normal + offset)
        + DVec3::Y * (height + vertical);

    let mut placed = item.clone();
    placed.transform.position = position.to_array();
    placed.transform.rotation = quat_to_euler(rotation);
    placed.wall_mount = Some(WallMount {
        u,
        height,
        offset,
        ..mount.clone()
    });
    placed
}

/// Mount `item` on `side` at `(u, height)` and clamp it onto the wall strip.
///
/// The model orientation axes of an existing mount are kept.
pub fn place_on_wall(
    item: &Item,
    room: &RoomDimensions,
    side: WallSide,
    u: f64,
    height: f64,
    offset: f64,
) -> Item {
    let mut mount = WallMount::new(side, u, height);
    mount.offset = offset;
    if let Some(existing) = item.wall_mount.as_ref() {
        mount.front = existing.front;
        mount.up = existing.up;
    }

    let mut tagged = item.clone();
    tagged.wall_mount = Some(mount);
    clamp_wall_mount(&tagged, room)
}

/// Wall coordinates matching an item's current position on `side`
pub fn mount_from_position(item: &Item, side: WallSide) -> WallMount {
    let position = DVec3::from_array(item.position());
    let half = oriented_half_extents(item);
    let mut mount = item
        .wall_mount
        .clone()
        .unwrap_or_else(|| WallMount::new(side, 0.0, 0.0));
    mount.side = side;
    mount.u = position.dot(side.tangent());
    mount.height = position.y - half.y;
    mount
}

/// Wall whose interior face is closest to `point` in the floor plane.
///
/// Ties go to the X walls (west, then east).
pub fn nearest_wall(point: [f64; 3], room: &RoomDimensions) -> WallSide {
    let [x, _, z] = point;
    let distances = [
        (WallSide::West, x + room.width / 2.0),
        (WallSide::East, room.width / 2.0 - x),
        (WallSide::North, z + room.depth / 2.0),
        (WallSide::South, room.depth / 2.0 - z),
    ];

    let mut best = distances[0];
    for candidate in &distances[1..] {
        if candidate.1 < best.1 {
            best = *candidate;
        }
    }
    best.0
}
