//! Editor settings

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub use crate::snap::{GridSettings, RotationSnapSettings};
use crate::state::history::DEFAULT_HISTORY_LIMIT;

/// When snapping runs relative to the boundary clamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapOrder {
    /// Snap raw input, then clamp the snapped point into the room
    #[default]
    BeforeClamp,
    /// Clamp, snap the clamped point, clamp again
    AfterClamp,
}

/// What a transform does when the result overlaps other items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionMode {
    /// Skip collision checks
    Ignore,
    /// Commit the move and report the overlapping items
    #[default]
    Flag,
    /// Reject the move; the item stays at its last valid position
    Block,
}

fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

/// All editor settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorSettings {
    #[serde(default)]
    pub grid: GridSettings,
    #[serde(default)]
    pub rotation_snap: RotationSnapSettings,
    #[serde(default)]
    pub snap_order: SnapOrder,
    #[serde(default)]
    pub collision_mode: CollisionMode,
    /// Maximum undo depth
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    /// Lock an item when a drag gesture ends
    #[serde(default)]
    pub auto_lock: bool,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            grid: GridSettings::default(),
            rotation_snap: RotationSnapSettings::default(),
            snap_order: SnapOrder::default(),
            collision_mode: CollisionMode::default(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            auto_lock: false,
        }
    }
}

impl EditorSettings {
    /// Platform settings file (`<config dir>/settings.json`)
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "room-editor", "room-editor")
            .map(|dirs| dirs.config_dir().join("settings.json"))
    }

    /// Load settings from the platform config dir, or defaults
    pub fn load() -> Self {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load settings from `path`. Missing or unreadable files give defaults.
    pub fn load_from(path: &Path) -> Self {
        let Ok(json) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        match serde_json::from_str(&json) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("Ignoring corrupt settings file {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Save settings to the platform config dir
    pub fn save(&self) -> std::io::Result<()> {
        match Self::default_path() {
            Some(path) => self.save_to(&path),
            None => Ok(()),
        }
    }

    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
    }
}
