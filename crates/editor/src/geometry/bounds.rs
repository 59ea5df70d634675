//! Axis-aligned bounding boxes for placed items.
//!
//! Only yaw is modelled. The scaled footprint rectangle is rotated about the
//! vertical axis and projected onto the world X/Z axes, which gives a
//! conservative box: it may be larger than the rotated rectangle, never
//! smaller. Consumers only need inside/outside and overlap answers.

use glam::DVec3;
use shared::Item;

/// Safety margin added to every half-extent for collision tests (meters)
pub const DEFAULT_SAFETY_MARGIN: f64 = 0.1;

/// Axis-aligned bounding box in room space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: DVec3,
    pub max: DVec3,
}

impl Aabb {
    pub fn new(min: DVec3, max: DVec3) -> Self {
        Self { min, max }
    }

    /// Box centered on `center` extending `half` along each axis
    pub fn from_center_half_extents(center: DVec3, half: DVec3) -> Self {
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Center of the bounding box
    pub fn center(&self) -> DVec3 {
        (self.min + self.max) * 0.5
    }

    /// Full size along each axis
    pub fn size(&self) -> DVec3 {
        self.max - self.min
    }

    /// Strict overlap test on all three axes. Boxes that only touch do not overlap.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }

    /// True if `other` lies inside `self`, allowing `tolerance` on every face.
    pub fn contains(&self, other: &Aabb, tolerance: f64) -> bool {
        other.min.x >= self.min.x - tolerance
            && other.max.x <= self.max.x + tolerance
            && other.min.y >= self.min.y - tolerance
            && other.max.y <= self.max.y + tolerance
            && other.min.z >= self.min.z - tolerance
            && other.max.z <= self.max.z + tolerance
    }

    /// Separation between the boxes along each axis.
    ///
    /// A component is negative when the projections overlap on that axis and
    /// zero when they touch.
    pub fn gap(&self, other: &Aabb) -> DVec3 {
        (other.min - self.max).max(self.min - other.max)
    }
}

/// Half-extents of the item's world-space box, without any margin.
pub fn half_extents(item: &Item) -> DVec3 {
    let scale = item.transform.scale;
    let half_w = item.footprint.width * scale[0] / 2.0;
    let half_d = item.footprint.depth * scale[2] / 2.0;
    let half_h = item.footprint.height * scale[1] / 2.0;

    let (sin, cos) = item.yaw().sin_cos();
    let (c, s) = (cos.abs(), sin.abs());

    DVec3::new(c * half_w + s * half_d, half_h, s * half_w + c * half_d)
}

/// Bounding box centered on the item's position, grown by `margin` on every side.
pub fn item_bounds(item: &Item, margin: f64) -> Aabb {
    let half = half_extents(item) + DVec3::splat(margin);
    Aabb::from_center_half_extents(DVec3::from_array(item.position()), half)
}
