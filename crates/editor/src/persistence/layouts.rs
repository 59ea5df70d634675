//! Saved layouts and the auto-save slot

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shared::{CompressedSnapshot, Item, LayoutMetadata, SavedLayout};

use super::codec::{decode, encode, PartialItem};
use super::storage::Storage;
use super::{now_millis, StorageError, AUTO_SAVE_KEY, LAYOUTS_KEY, SETTINGS_KEY};

/// Nominal storage capacity used by [`LayoutStore::usage`] (bytes)
pub const NOMINAL_CAPACITY: usize = 5 * 1024 * 1024;
/// Layouts older than this are removed by cleanup (30 days, ms)
pub const RETENTION_MS: u64 = 30 * 24 * 60 * 60 * 1000;

pub const MANUAL_SAVE_DESCRIPTION: &str = "manual_save";
pub const AUTO_SAVE_DESCRIPTION: &str = "auto_save";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StorageSettings {
    pub max_layouts: usize,
    #[serde(rename = "autoSaveInterval")]
    pub auto_save_interval_ms: u64,
    /// Auto-save is skipped when disabled
    pub compression_enabled: bool,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            max_layouts: 10,
            auto_save_interval_ms: 30_000,
            compression_enabled: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupReport {
    pub removed: usize,
    pub freed_bytes: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StorageUsage {
    pub used: usize,
    pub total: usize,
    pub percentage: f64,
}

type Clock = Arc<dyn Fn() -> u64 + Send + Sync>;

/// Layout collection on top of a [`Storage`] backend
pub struct LayoutStore<S: Storage> {
    storage: S,
    clock: Clock,
}

impl<S: Storage> LayoutStore<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            clock: Arc::new(now_millis),
        }
    }

    /// Store with a custom millisecond clock
    pub fn with_clock(storage: S, clock: impl Fn() -> u64 + Send + Sync + 'static) -> Self {
        Self {
            storage,
            clock: Arc::new(clock),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    fn now(&self) -> u64 {
        (self.clock)()
    }

    /// Stored settings merged over the defaults
    pub fn settings(&self) -> StorageSettings {
        let Some(json) = self.storage.get(SETTINGS_KEY) else {
            return StorageSettings::default();
        };
        serde_json::from_str(&json).unwrap_or_else(|e| {
            tracing::warn!("Corrupt storage settings, using defaults: {e}");
            StorageSettings::default()
        })
    }

    pub fn save_settings(&mut self, settings: &StorageSettings) -> Result<(), StorageError> {
        let json = serde_json::to_string(settings)?;
        self.storage.set(SETTINGS_KEY, json)?;
        tracing::info!("Saved storage settings: {settings:?}");
        Ok(())
    }

    /// Every saved layout in storage order. A corrupt record reads as empty.
    pub fn load_all_layouts(&self) -> Vec<SavedLayout> {
        let Some(json) = self.storage.get(LAYOUTS_KEY) else {
            return Vec::new();
        };
        serde_json::from_str(&json).unwrap_or_else(|e| {
            tracing::warn!("Corrupt layout collection, ignoring it: {e}");
            Vec::new()
        })
    }

    fn write_layouts(&mut self, layouts: &[SavedLayout]) -> Result<(), StorageError> {
        let json = serde_json::to_string(layouts)?;
        self.storage.set(LAYOUTS_KEY, json)
    }

    /// Save items as a new layout and return its id.
    ///
    /// At capacity the oldest layout is evicted first.
    pub fn save_layout(
        &mut self,
        name: &str,
        items: &[Item],
        description: Option<&str>,
        tags: Option<Vec<String>>,
    ) -> Result<String, StorageError> {
        let now = self.now();
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        let id = format!("layout_{now}_{}", &suffix[..9]);

        let layout = SavedLayout {
            metadata: LayoutMetadata {
                id: id.clone(),
                name: name.to_string(),
                timestamp: now,
                item_count: items.len(),
                description: Some(description.unwrap_or_default().to_string()),
                tags: Some(tags.unwrap_or_default()),
            },
            data: encode(items, MANUAL_SAVE_DESCRIPTION, now),
        };

        let max = self.settings().max_layouts.max(1);
        let mut layouts = self.load_all_layouts();
        while layouts.len() >= max {
            let Some(oldest) = layouts
                .iter()
                .enumerate()
                .min_by_key(|(_, l)| l.metadata.timestamp)
                .map(|(i, _)| i)
            else {
                break;
            };
            let evicted = layouts.remove(oldest);
            tracing::info!("Evicted layout {} ({})", evicted.metadata.id, evicted.metadata.name);
        }
        layouts.push(layout);
        self.write_layouts(&layouts)?;

        tracing::info!("Saved layout {id} \"{name}\" with {} items", items.len());
        Ok(id)
    }

    pub fn layout(&self, id: &str) -> Option<SavedLayout> {
        self.load_all_layouts()
            .into_iter()
            .find(|l| l.metadata.id == id)
    }

    /// Items of a saved layout, `None` if there is no such layout
    pub fn load_layout(&self, id: &str) -> Option<Vec<PartialItem>> {
        let layout = self.layout(id);
        if layout.is_none() {
            tracing::debug!("Layout {id} not found");
        }
        layout.map(|l| decode(&l.data))
    }

    /// Metadata of every layout, newest first
    pub fn layout_metadata(&self) -> Vec<LayoutMetadata> {
        let mut metadata: Vec<_> = self
            .load_all_layouts()
            .into_iter()
            .map(|l| l.metadata)
            .collect();
        metadata.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        metadata
    }

    /// Returns false if no layout has this id
    pub fn delete_layout(&mut self, id: &str) -> Result<bool, StorageError> {
        let mut layouts = self.load_all_layouts();
        let before = layouts.len();
        layouts.retain(|l| l.metadata.id != id);
        if layouts.len() == before {
            return Ok(false);
        }
        self.write_layouts(&layouts)?;
        tracing::info!("Deleted layout {id}");
        Ok(true)
    }

    /// Overwrite the auto-save slot
    pub fn auto_save(&mut self, items: &[Item]) -> Result<(), StorageError> {
        if !self.settings().compression_enabled {
            tracing::debug!("Auto-save disabled");
            return Ok(());
        }
        let snapshot = encode(items, AUTO_SAVE_DESCRIPTION, self.now());
        self.storage.set(AUTO_SAVE_KEY, serde_json::to_string(&snapshot)?)?;
        tracing::info!("Auto-saved {} items", items.len());
        Ok(())
    }

    pub fn auto_save_snapshot(&self) -> Option<CompressedSnapshot> {
        let json = self.storage.get(AUTO_SAVE_KEY)?;
        match serde_json::from_str(&json) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                tracing::warn!("Corrupt auto-save slot, ignoring it: {e}");
                None
            }
        }
    }

    pub fn load_auto_save(&self) -> Option<Vec<PartialItem>> {
        self.auto_save_snapshot().map(|s| decode(&s))
    }

    /// Remove layouts older than the retention window
    pub fn cleanup(&mut self) -> Result<CleanupReport, StorageError> {
        let now = self.now();
        self.cleanup_at(now)
    }

    pub fn cleanup_at(&mut self, now: u64) -> Result<CleanupReport, StorageError> {
        let before_bytes = self.storage.get(LAYOUTS_KEY).map_or(0, |s| s.len());
        let mut layouts = self.load_all_layouts();
        let before = layouts.len();
        layouts.retain(|l| now.saturating_sub(l.metadata.timestamp) < RETENTION_MS);
        let removed = before - layouts.len();
        if removed == 0 {
            return Ok(CleanupReport {
                removed: 0,
                freed_bytes: 0,
            });
        }

        self.write_layouts(&layouts)?;
        let after_bytes = self.storage.get(LAYOUTS_KEY).map_or(0, |s| s.len());
        let report = CleanupReport {
            removed,
            freed_bytes: before_bytes.saturating_sub(after_bytes),
        };
        tracing::info!(
            "Cleanup removed {} layouts ({} bytes), {} remain",
            report.removed,
            report.freed_bytes,
            layouts.len()
        );
        Ok(report)
    }

    /// Advisory usage of the store's keys against [`NOMINAL_CAPACITY`]
    pub fn usage(&self) -> StorageUsage {
        let used: usize = [LAYOUTS_KEY, AUTO_SAVE_KEY, SETTINGS_KEY]
            .iter()
            .filter_map(|key| self.storage.get(key))
            .map(|value| value.len())
            .sum();
        StorageUsage {
            used,
            total: NOMINAL_CAPACITY,
            percentage: used as f64 / NOMINAL_CAPACITY as f64 * 100.0,
        }
    }
}
