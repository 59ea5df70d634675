//! Model orientation helpers for wall-mounted items.
//!
//! Euler triples are stored as `[x, y, z]` and applied in Y-X-Z order, so
//! `rotation[1]` is always the yaw used by the floor constraints.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use glam::{DQuat, DVec2, DVec3, EulerRot};
use shared::{Axis, WallSide};

use super::wall::WallGeometry;

/// Unit vector for a model axis
pub fn axis_vector(axis: Axis) -> DVec3 {
    DVec3::from_array(axis.to_array())
}

/// Quaternion for an `[x, y, z]` Euler triple (Y-X-Z order)
pub fn euler_to_quat(rotation: [f64; 3]) -> DQuat {
    DQuat::from_euler(EulerRot::YXZ, rotation[1], rotation[0], rotation[2])
}

/// `[x, y, z]` Euler triple for a quaternion (Y-X-Z order).
///
/// Pure yaw rotations come back as `[0, yaw, 0]` with yaw in `(-PI, PI]`.
pub fn quat_to_euler(q: DQuat) -> [f64; 3] {
    let q = q.normalize();
    if q.x.abs() < 1e-12 && q.z.abs() < 1e-12 {
        return [0.0, normalize_angle(2.0 * q.y.atan2(q.w)), 0.0];
    }
    let (y, x, z) = q.to_euler(EulerRot::YXZ);
    [x, y, z]
}

/// Wrap an angle into `(-PI, PI]`
pub fn normalize_angle(angle: f64) -> f64 {
    let mut a = angle % TAU;
    if a > PI {
        a -= TAU;
    } else if a <= -PI {
        a += TAU;
    }
    a
}

/// Rotation that turns a model so `front` faces into the room from `side`.
///
/// The model's front axis is first aligned with the canonical front (-Z),
/// then rolled about Z so its `up` axis points as close to world up as
/// possible, then yawed by the wall's base angle.
pub fn facing_rotation(front: Axis, up: Axis, side: WallSide) -> DQuat {
    let align = DQuat::from_rotation_arc(axis_vector(front), DVec3::NEG_Z);

    let up_aligned = align * axis_vector(up);
    let projected = DVec2::new(up_aligned.x, up_aligned.y);
    let roll = if projected.length_squared() > 1e-12 {
        DQuat::from_rotation_z(FRAC_PI_2 - projected.y.atan2(projected.x))
    } else {
        // up parallel to front: nothing to correct
        DQuat::IDENTITY
    };

    (DQuat::from_rotation_y(side.base_yaw()) * roll * align).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn approx_vec(a: DVec3, b: DVec3) -> bool {
        (a - b).abs().max_element() < EPS
    }

    #[test]
    fn test_default_axes_face_inward_normal() {
        for &side in WallSide::all() {
            let q = facing_rotation(Axis::NegZ, Axis::PosY, side);
            assert!(
                approx_vec(q * DVec3::NEG_Z, side.inward_normal()),
                "{side:?}: front {:?}",
                q * DVec3::NEG_Z
            );
            assert!(approx_vec(q * DVec3::Y, DVec3::Y));
        }
    }

    #[test]
    fn test_default_axes_are_pure_yaw() {
        let q = facing_rotation(Axis::NegZ, Axis::PosY, WallSide::North);
        let e = quat_to_euler(q);
        assert_eq!(e[0], 0.0);
        assert_eq!(e[2], 0.0);
        assert!((e[1] - PI).abs() < EPS);

        let e = quat_to_euler(facing_rotation(Axis::NegZ, Axis::PosY, WallSide::West));
        assert!((e[1] + FRAC_PI_2).abs() < EPS);
    }

    #[test]
    fn test_custom_front_axis_is_aligned() {
        // Model authored facing +X with +Z up
        let q = facing_rotation(Axis::PosX, Axis::PosZ, WallSide::East);
        assert!(approx_vec(q * DVec3::X, WallSide::East.inward_normal()));
        assert!(approx_vec(q * DVec3::Z, DVec3::Y));
    }

    #[test]
    fn test_opposite_front_axis() {
        let q = facing_rotation(Axis::PosZ, Axis::PosY, WallSide::South);
        assert!(approx_vec(q * DVec3::Z, WallSide::South.inward_normal()));
        assert!(approx_vec(q * DVec3::Y, DVec3::Y));
    }

    #[test]
    fn test_euler_roundtrip_general_rotation() {
        let rotation = [0.3, -1.1, 0.2];
        let back = quat_to_euler(euler_to_quat(rotation));
        for i in 0..3 {
            assert!((back[i] - rotation[i]).abs() < EPS, "{back:?}");
        }
    }

    #[test]
    fn test_normalize_angle() {
        assert!((normalize_angle(2.5 * PI) - FRAC_PI_2).abs() < EPS);
        assert!((normalize_angle(-1.5 * PI) - FRAC_PI_2).abs() < EPS);
        assert!((normalize_angle(-PI) - PI).abs() < EPS);
        assert!((normalize_angle(0.5) - 0.5).abs() < EPS);
    }
}
