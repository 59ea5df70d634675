//! Item-vs-item collision queries.
//!
//! Linear scans over the live item list; there is no spatial index. Item
//! counts are a few dozen to a few hundred, so O(n) per query is fine for
//! per-pointer-move use.

use std::f64::consts::TAU;

use shared::{Item, ItemId};

use super::bounds::{item_bounds, DEFAULT_SAFETY_MARGIN};

/// Angle increment between spiral search candidates (radians)
pub const SPIRAL_ANGLE_STEP: f64 = 0.5;
/// Radius increment between spiral search candidates (meters)
pub const SPIRAL_RADIUS_STEP: f64 = 0.5;
/// Spiral search never moves an item further than this (meters)
pub const MAX_SEARCH_DISTANCE: f64 = 5.0;
/// Default number of candidates tried by [`find_nearby_free_position`]
pub const DEFAULT_MAX_ATTEMPTS: usize = 50;

/// Result of testing one item against a set of others
#[derive(Debug, Clone, Default)]
pub struct CollisionReport<'a> {
    /// Every overlapping item, in list order
    pub colliding_with: Vec<&'a Item>,
}

impl<'a> CollisionReport<'a> {
    pub fn collides(&self) -> bool {
        !self.colliding_with.is_empty()
    }

    /// IDs of the colliding items
    pub fn ids(&self) -> Vec<ItemId> {
        self.colliding_with.iter().map(|i| i.id.clone()).collect()
    }
}

/// Pairwise overlap using the default safety margin. Symmetric in `a` and `b`.
pub fn items_overlap(a: &Item, b: &Item) -> bool {
    item_bounds(a, DEFAULT_SAFETY_MARGIN).overlaps(&item_bounds(b, DEFAULT_SAFETY_MARGIN))
}

/// Test `target` against `others`, skipping the target's own id and `exclude_id`.
pub fn query_against_set<'a>(
    target: &Item,
    others: &'a [Item],
    exclude_id: Option<&str>,
) -> CollisionReport<'a> {
    let target_bounds = item_bounds(target, DEFAULT_SAFETY_MARGIN);
    let colliding_with = others
        .iter()
        .filter(|other| other.id != target.id && Some(other.id.as_str()) != exclude_id)
        .filter(|other| target_bounds.overlaps(&item_bounds(other, DEFAULT_SAFETY_MARGIN)))
        .collect();

    CollisionReport { colliding_with }
}

/// Collision check for a drag in progress: `dragged` moved to `new_position`.
///
/// The dragged item's previous placement may still be in `others`; it is
/// excluded by id.
pub fn drag_collision<'a>(
    dragged: &Item,
    others: &'a [Item],
    new_position: [f64; 3],
) -> CollisionReport<'a> {
    let mut probe = dragged.clone();
    probe.transform.position = new_position;
    query_against_set(&probe, others, Some(&dragged.id))
}

/// Best-effort search for a collision-free position near `target`.
///
/// Returns the current position when it is already free. Otherwise walks an
/// outward spiral (Y held fixed) for at most `max_attempts` candidates and
/// returns the first free one, or `None` when every attempt is taken.
pub fn find_nearby_free_position(
    target: &Item,
    others: &[Item],
    max_attempts: usize,
) -> Option<[f64; 3]> {
    let origin = target.position();
    if !query_against_set(target, others, None).collides() {
        return Some(origin);
    }

    let mut probe = target.clone();
    for attempt in 1..=max_attempts {
        let step = attempt as f64;
        let angle = (step * SPIRAL_ANGLE_STEP) % TAU;
        let radius = (step * SPIRAL_RADIUS_STEP).min(MAX_SEARCH_DISTANCE);

        probe.transform.position = [
            origin[0] + angle.cos() * radius,
            origin[1],
            origin[2] + angle.sin() * radius,
        ];

        if !query_against_set(&probe, others, None).collides() {
            tracing::debug!(
                "Free position for {} found after {} attempts",
                target.id,
                attempt
            );
            return Some(probe.transform.position);
        }
    }

    tracing::debug!(
        "No free position for {} within {} attempts",
        target.id,
        max_attempts
    );
    None
}

/// Move `target` to a nearby free position, or leave it where it is.
pub fn move_to_free_position(target: &Item, others: &[Item]) -> Item {
    match find_nearby_free_position(target, others, DEFAULT_MAX_ATTEMPTS) {
        Some(position) => {
            let mut moved = target.clone();
            moved.transform.position = position;
            moved
        }
        None => {
            tracing::warn!("No safe position found for {}; keeping it in place", target.id);
            target.clone()
        }
    }
}

/// Every overlapping pair in `items`, each pair reported once in list order.
pub fn overlapping_pairs(items: &[Item]) -> Vec<(ItemId, ItemId)> {
    let mut pairs = Vec::new();
    for (i, a) in items.iter().enumerate() {
        for b in &items[i + 1..] {
            if items_overlap(a, b) {
                pairs.push((a.id.clone(), b.id.clone()));
            }
        }
    }
    pairs
}
