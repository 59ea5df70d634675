//! Input sanitising for geometry entering the editor.
//!
//! The constraint math assumes finite coordinates and strictly positive
//! sizes. Anything else is replaced at the API boundary instead of being
//! allowed to propagate NaN through clamping.

use shared::{Footprint, Item, Transform};

/// `value` if finite, otherwise `fallback`
pub fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

/// `value` if finite and strictly positive, otherwise `fallback` if that is,
/// otherwise `1.0`
pub fn positive_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else if fallback.is_finite() && fallback > 0.0 {
        fallback
    } else {
        1.0
    }
}

/// Replace non-finite components with the last known good ones.
pub fn sanitize_vector(new: [f64; 3], last_good: [f64; 3]) -> [f64; 3] {
    [
        finite_or(new[0], finite_or(last_good[0], 0.0)),
        finite_or(new[1], finite_or(last_good[1], 0.0)),
        finite_or(new[2], finite_or(last_good[2], 0.0)),
    ]
}

/// Replace non-positive or non-finite scale components.
pub fn sanitize_scale(new: [f64; 3], last_good: [f64; 3]) -> [f64; 3] {
    [
        positive_or(new[0], last_good[0]),
        positive_or(new[1], last_good[1]),
        positive_or(new[2], last_good[2]),
    ]
}

/// Transform with every component made usable, preferring values from `last_good`.
pub fn sanitize_transform(new: &Transform, last_good: &Transform) -> Transform {
    Transform {
        position: sanitize_vector(new.position, last_good.position),
        rotation: sanitize_vector(new.rotation, last_good.rotation),
        scale: sanitize_scale(new.scale, last_good.scale),
    }
}

pub fn sanitize_footprint(footprint: Footprint) -> Footprint {
    Footprint {
        width: positive_or(footprint.width, 1.0),
        depth: positive_or(footprint.depth, 1.0),
        height: positive_or(footprint.height, 1.0),
    }
}

/// Sanitise a freshly created item (no previous state to fall back on).
pub fn sanitize_item(item: &Item) -> Item {
    let mut clean = item.clone();
    clean.footprint = sanitize_footprint(item.footprint);
    clean.transform = sanitize_transform(&item.transform, &Transform::new());
    if let Some(mount) = clean.wall_mount.as_mut() {
        mount.u = finite_or(mount.u, 0.0);
        mount.height = finite_or(mount.height, 0.0);
        mount.offset = finite_or(mount.offset, 0.0);
    }
    clean
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finite_values_pass_through() {
        assert_eq!(sanitize_vector([1.0, -2.0, 3.5], [0.0; 3]), [1.0, -2.0, 3.5]);
        assert_eq!(sanitize_scale([2.0, 0.5, 1.0], [1.0; 3]), [2.0, 0.5, 1.0]);
    }

    #[test]
    fn test_nan_falls_back_to_last_good() {
        let v = sanitize_vector([f64::NAN, f64::INFINITY, 4.0], [1.0, 2.0, 3.0]);
        assert_eq!(v, [1.0, 2.0, 4.0]);
    }

    #[test]
    fn test_bad_last_good_falls_back_to_zero() {
        let v = sanitize_vector([f64::NAN, 0.0, 0.0], [f64::NAN, 0.0, 0.0]);
        assert_eq!(v, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_scale_rejects_zero_and_negative() {
        let s = sanitize_scale([0.0, -1.0, f64::NAN], [2.0, 0.0, 3.0]);
        assert_eq!(s, [2.0, 1.0, 3.0]);
    }

    #[test]
    fn test_sanitize_item_footprint() {
        let item = Item::new("a", "A", Footprint::new(0.0, f64::NAN, 2.0))
            .with_position([f64::NAN, 1.0, 2.0]);
        let clean = sanitize_item(&item);
        assert_eq!(clean.footprint, Footprint::new(1.0, 1.0, 2.0));
        assert_eq!(clean.position(), [0.0, 1.0, 2.0]);
    }
}
