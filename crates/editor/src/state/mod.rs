pub mod editor;
pub mod history;
pub mod settings;

pub use editor::{EditorState, TransformOutcome};
pub use history::{History, HistoryEntry, DEFAULT_HISTORY_LIMIT};
pub use settings::{CollisionMode, EditorSettings, SnapOrder};
