//! Grid and rotation snapping
//!
//! Rounding is `f64::round` (half away from zero) on every axis, so
//! snapping is symmetric for negative inputs.

mod cache;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shared::Item;

pub use cache::{SnapCache, SnapKey, DEFAULT_SNAP_CACHE_CAPACITY};

use crate::geometry::half_extents;
use crate::room::RoomConfig;

/// Grid snapping configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    pub enabled: bool,
    /// Size of one major grid square (meters)
    pub size: f64,
    /// Subdivisions per major square; the snap step is `size / divisions`
    pub divisions: u32,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            size: 10.0,
            divisions: 10,
        }
    }
}

impl GridSettings {
    /// Snap step, or `None` when the settings cannot form a lattice
    pub fn cell_size(&self) -> Option<f64> {
        let cell = self.size / self.divisions as f64;
        (cell.is_finite() && cell > 0.0).then_some(cell)
    }
}

/// Rotation snapping configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationSnapSettings {
    pub enabled: bool,
    /// Snap angle (degrees)
    pub angle: f64,
}

impl Default for RotationSnapSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            angle: 15.0,
        }
    }
}

/// Round each component of `position` to the nearest multiple of `size / divisions`.
///
/// Y is snapped too. Degenerate settings return the input unchanged.
pub fn grid_snap(position: [f64; 3], size: f64, divisions: u32) -> [f64; 3] {
    let cell = size / divisions as f64;
    if !(cell.is_finite() && cell > 0.0) {
        return position;
    }
    position.map(|v| (v / cell).round() * cell)
}

/// Round each Euler component to the nearest multiple of `angle_degrees`.
pub fn rotation_snap(rotation: [f64; 3], angle_degrees: f64) -> [f64; 3] {
    let step = angle_degrees.to_radians();
    if !(step.is_finite() && step > 0.0) {
        return rotation;
    }
    rotation.map(|v| (v / step).round() * step)
}

/// True when any snap setting differs between the two configurations
pub fn snap_settings_changed(
    current_grid: &GridSettings,
    current_rotation: &RotationSnapSettings,
    previous_grid: &GridSettings,
    previous_rotation: &RotationSnapSettings,
) -> bool {
    current_grid != previous_grid || current_rotation != previous_rotation
}

/// Snapping with a per-instance result cache
#[derive(Debug)]
pub struct SnapCalculator {
    room: RoomConfig,
    grid: GridSettings,
    rotation: RotationSnapSettings,
    cache: SnapCache,
}

impl SnapCalculator {
    pub fn new(room: RoomConfig, grid: GridSettings, rotation: RotationSnapSettings) -> Self {
        Self {
            room,
            grid,
            rotation,
            cache: SnapCache::default(),
        }
    }

    pub fn grid(&self) -> &GridSettings {
        &self.grid
    }

    pub fn rotation(&self) -> &RotationSnapSettings {
        &self.rotation
    }

    /// Replace the settings. Returns false when nothing changed.
    pub fn set_settings(&mut self, grid: GridSettings, rotation: RotationSnapSettings) -> bool {
        if !snap_settings_changed(&grid, &rotation, &self.grid, &self.rotation) {
            return false;
        }
        tracing::debug!("Snap settings changed: {:?} {:?}", grid, rotation);
        self.grid = grid;
        self.rotation = rotation;
        true
    }

    /// Memoised [`grid_snap`] with the current grid, ignoring `enabled`
    pub fn snap_position(&mut self, position: [f64; 3]) -> Arc<[f64; 3]> {
        let GridSettings { size, divisions, .. } = self.grid;
        self.cache
            .get_or_insert_with(SnapKey::grid(position, size, divisions), || {
                grid_snap(position, size, divisions)
            })
    }

    /// Memoised [`rotation_snap`] with the current angle, ignoring `enabled`
    pub fn snap_rotation(&mut self, rotation: [f64; 3]) -> Arc<[f64; 3]> {
        let angle = self.rotation.angle;
        self.cache
            .get_or_insert_with(SnapKey::rotation(rotation, angle), || {
                rotation_snap(rotation, angle)
            })
    }

    /// Apply enabled snapping to an item.
    ///
    /// Floor items snap X/Z and yaw; Y and pitch/roll pass through. A lattice
    /// point that would push the item past the envelope is pulled inward a
    /// cell at a time until it fits. When no lattice point fits (the item is
    /// wider than the envelope, or the cell is too coarse) the result may
    /// still lie outside and is left to the boundary clamp. Wall items snap
    /// their wall coordinate instead of X/Z.
    pub fn snap_item(&mut self, item: &Item) -> Item {
        let mut out = item.clone();

        if self.grid.enabled {
            if let Some(cell) = self.grid.cell_size() {
                if let Some(mount) = out.wall_mount.as_mut() {
                    mount.u = (mount.u / cell).round() * cell;
                } else {
                    let snapped = self.snap_position(item.position());
                    let half = half_extents(item);
                    let env = self.room.envelope();
                    out.transform.position[0] =
                        pull_inward(snapped[0], half.x, cell, env.min_x, env.max_x);
                    out.transform.position[2] =
                        pull_inward(snapped[2], half.z, cell, env.min_z, env.max_z);
                }
            }
        }

        if self.rotation.enabled && !item.is_wall_mounted() {
            let snapped = self.snap_rotation(item.transform.rotation);
            out.transform.rotation[1] = snapped[1];
        }

        out
    }

    pub fn cache(&self) -> &SnapCache {
        &self.cache
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}

/// Step `value` along the lattice until `[value - half, value + half]`
/// lies in `[min, max]`. Gives up when the span cannot fit.
fn pull_inward(value: f64, half: f64, cell: f64, min: f64, max: f64) -> f64 {
    if !value.is_finite() || 2.0 * half > max - min {
        return value;
    }
    let mut value = value;
    while value + half > max {
        value -= cell;
    }
    while value - half < min {
        value += cell;
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::Footprint;
    use std::f64::consts::FRAC_PI_4;

    const EPS: f64 = 1e-9;

    fn approx(a: [f64; 3], b: [f64; 3]) -> bool {
        (0..3).all(|i| (a[i] - b[i]).abs() < EPS)
    }

    fn calculator(grid: GridSettings, rotation: RotationSnapSettings) -> SnapCalculator {
        SnapCalculator::new(RoomConfig::default(), grid, rotation)
    }

    #[test]
    fn test_grid_snap_half_cells() {
        let snapped = grid_snap([1.7, 2.3, 3.8], 2.0, 4);
        assert!(approx(snapped, [1.5, 2.5, 4.0]), "{snapped:?}");
    }

    #[test]
    fn test_grid_snap_negative_is_symmetric() {
        let snapped = grid_snap([-1.7, -2.3, -3.8], 2.0, 4);
        assert!(approx(snapped, [-1.5, -2.5, -4.0]), "{snapped:?}");
    }

    #[test]
    fn test_grid_snap_exact_half_rounds_away_from_zero() {
        // 0.25 / 0.5 = 0.5 exactly
        let snapped = grid_snap([0.25, -0.25, 0.75], 1.0, 2);
        assert_eq!(snapped, [0.5, -0.5, 1.0]);
    }

    #[test]
    fn test_grid_snap_idempotent_over_sweep() {
        for i in -50..=50 {
            let p = [i as f64 * 0.137, i as f64 * -0.071, i as f64 * 0.49];
            let once = grid_snap(p, 2.0, 4);
            assert_eq!(grid_snap(once, 2.0, 4), once, "input {p:?}");
        }
    }

    #[test]
    fn test_grid_snap_degenerate_settings() {
        assert_eq!(grid_snap([0.3, 0.4, 0.5], 1.0, 0), [0.3, 0.4, 0.5]);
        assert_eq!(grid_snap([0.3, 0.4, 0.5], 0.0, 4), [0.3, 0.4, 0.5]);
    }

    #[test]
    fn test_rotation_snap_45_degrees() {
        let snapped = rotation_snap([0.0, 0.7, 0.0], 45.0);
        assert!((snapped[1] - FRAC_PI_4).abs() < EPS);
        assert_eq!(snapped[0], 0.0);

        let snapped = rotation_snap([0.3, 0.7, 1.2], 45.0);
        assert!(approx(snapped, [0.0, FRAC_PI_4, 2.0 * FRAC_PI_4]));
    }

    #[test]
    fn test_rotation_snap_lattice_points_are_fixed() {
        for angle in [15.0, 30.0, 45.0, 90.0] {
            let step = f64::to_radians(angle);
            for k in -24..=24 {
                let value = k as f64 * step;
                let snapped = rotation_snap([value, value, value], angle);
                assert!(approx(snapped, [value; 3]), "angle {angle} k {k}");
            }
        }
    }

    #[test]
    fn test_rotation_snap_exact_half_step() {
        let step = 90.0f64.to_radians();
        let snapped = rotation_snap([step / 2.0, -step / 2.0, 0.0], 90.0);
        assert!((snapped[0] - step).abs() < EPS);
        assert!((snapped[1] + step).abs() < EPS);
    }

    #[test]
    fn test_settings_change_detection() {
        let grid = GridSettings {
            enabled: true,
            size: 2.0,
            divisions: 4,
        };
        let rot = RotationSnapSettings {
            enabled: true,
            angle: 45.0,
        };
        assert!(!snap_settings_changed(&grid, &rot, &grid, &rot));
        assert!(snap_settings_changed(
            &GridSettings { size: 1.0, ..grid },
            &rot,
            &grid,
            &rot
        ));
        assert!(snap_settings_changed(
            &GridSettings { enabled: false, ..grid },
            &rot,
            &grid,
            &rot
        ));
        assert!(snap_settings_changed(
            &grid,
            &RotationSnapSettings { angle: 90.0, ..rot },
            &grid,
            &rot
        ));
    }

    #[test]
    fn test_calculator_cache_reuses_results() {
        let mut calc = calculator(GridSettings::default(), RotationSnapSettings::default());
        let a = calc.snap_position([0.33, 0.5, 1.27]);
        let b = calc.snap_position([0.33, 0.5, 1.27]);
        assert!(Arc::ptr_eq(&a, &b));

        let r1 = calc.snap_rotation([0.0, 0.3, 0.0]);
        let r2 = calc.snap_rotation([0.0, 0.3, 0.0]);
        assert!(Arc::ptr_eq(&r1, &r2));
        assert_eq!(calc.cache().len(), 2);

        calc.clear_cache();
        let c = calc.snap_position([0.33, 0.5, 1.27]);
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(*a, *c);
    }

    #[test]
    fn test_calculator_keys_include_settings() {
        let mut calc = calculator(
            GridSettings {
                enabled: true,
                size: 1.0,
                divisions: 2,
            },
            RotationSnapSettings::default(),
        );
        let coarse = calc.snap_position([0.3, 0.0, 0.0]);
        assert!(calc.set_settings(
            GridSettings {
                enabled: true,
                size: 1.0,
                divisions: 10,
            },
            RotationSnapSettings::default()
        ));
        let fine = calc.snap_position([0.3, 0.0, 0.0]);
        assert!((coarse[0] - 0.5).abs() < EPS);
        assert!((fine[0] - 0.3).abs() < EPS);
        assert!(!calc.set_settings(*calc.grid(), *calc.rotation()));
    }

    #[test]
    fn test_snap_item_keeps_height_and_pitch() {
        let mut calc = calculator(
            GridSettings {
                enabled: true,
                size: 1.0,
                divisions: 2,
            },
            RotationSnapSettings {
                enabled: true,
                angle: 45.0,
            },
        );
        let mut item = Item::new("a", "A", Footprint::unit()).with_position([1.1, 0.37, -0.8]);
        item.transform.rotation = [0.1, 0.7, 0.2];

        let snapped = calc.snap_item(&item);
        assert!(approx(snapped.position(), [1.0, 0.37, -1.0]));
        assert_eq!(snapped.transform.rotation[0], 0.1);
        assert_eq!(snapped.transform.rotation[2], 0.2);
        assert!((snapped.yaw() - FRAC_PI_4).abs() < EPS);
    }

    #[test]
    fn test_snap_item_pulls_lattice_point_inward() {
        let mut calc = calculator(
            GridSettings {
                enabled: true,
                size: 1.0,
                divisions: 1,
            },
            RotationSnapSettings::default(),
        );
        // Nearest lattice point x = 5 puts the right face past max_x = 4.7
        let item = Item::new("a", "A", Footprint::unit()).with_position([4.6, 0.5, 0.0]);
        let snapped = calc.snap_item(&item);
        assert_eq!(snapped.position()[0], 4.0);
    }

    #[test]
    fn test_snap_item_pulls_wide_item_several_cells() {
        let mut calc = calculator(
            GridSettings {
                enabled: true,
                size: 1.0,
                divisions: 2,
            },
            RotationSnapSettings::default(),
        );
        // Half width 1.5 against max_x = 4.7: one cell back from 4.5 is not enough
        let item = Item::new("a", "A", Footprint::new(3.0, 1.0, 1.0)).with_position([4.6, 0.5, 0.0]);
        let snapped = calc.snap_item(&item);
        assert_eq!(snapped.position()[0], 3.0);
        assert!(snapped.position()[0] + 1.5 <= calc.room.envelope().max_x);
    }

    #[test]
    fn test_pull_inward_leaves_oversized_span() {
        assert_eq!(pull_inward(0.5, 6.0, 0.5, -4.7, 4.7), 0.5);
        assert_eq!(pull_inward(-4.5, 0.5, 1.0, -4.7, 4.7), -3.5);
    }

    #[test]
    fn test_snap_item_disabled_is_identity() {
        let mut calc = calculator(GridSettings::default(), RotationSnapSettings::default());
        let item = Item::new("a", "A", Footprint::unit())
            .with_position([1.234, 0.5, 2.345])
            .with_yaw(0.123);
        assert_eq!(calc.snap_item(&item), item);
        assert!(calc.cache().is_empty());
    }
}
