//! Layout persistence
//!
//! Items are stored as compressed snapshots (id + transform + lock flag)
//! in a key/value [`Storage`]. Reads of missing or corrupt records degrade
//! to "nothing found"; only writes report errors.

pub mod autosave;
pub mod codec;
pub mod layouts;
pub mod storage;

pub use autosave::AutoSaver;
pub use codec::{decode, encode, hydrate_all, PartialItem};
pub use layouts::{CleanupReport, LayoutStore, StorageSettings, StorageUsage};
pub use storage::{FileStorage, MemoryStorage, Storage};

/// Storage key holding every saved layout
pub const LAYOUTS_KEY: &str = "room_layouts";
/// Storage key of the single auto-save slot
pub const AUTO_SAVE_KEY: &str = "room_auto_save";
/// Storage key of [`StorageSettings`]
pub const SETTINGS_KEY: &str = "room_storage_settings";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage is full: {needed} bytes needed, {available} available. Delete old layouts or run cleanup")]
    QuotaExceeded { needed: usize, available: usize },
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not serialize layout data: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HydrateError {
    #[error("no catalog entry matches item {id}")]
    UnknownCatalogEntry { id: String },
}

/// Milliseconds since the Unix epoch
pub fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
