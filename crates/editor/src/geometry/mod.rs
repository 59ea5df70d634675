//! Bounding volumes and item-vs-item collision queries.
//!
//! Everything here is a pure function of its inputs: nothing mutates the
//! live item list. Callers decide what to do with a collision.

pub mod bounds;
pub mod collision;

pub use bounds::{half_extents, item_bounds, Aabb, DEFAULT_SAFETY_MARGIN};
pub use collision::{
    drag_collision, find_nearby_free_position, items_overlap, move_to_free_position,
    overlapping_pairs, query_against_set, CollisionReport, DEFAULT_MAX_ATTEMPTS,
};
