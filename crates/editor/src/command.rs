//! JSON command protocol for scripted editing sessions.
//!
//! Each command maps onto one harness/editor operation and answers with a
//! [`CommandResponse`] envelope.

use serde::{Deserialize, Serialize};
use shared::{Item, ItemId, RoomDimensionsUpdate, WallSide};

use crate::harness::EditorHarness;
use crate::persistence::Storage;
use crate::snap::{GridSettings, RotationSnapSettings};
use crate::state::{CollisionMode, TransformOutcome};

/// A command the editor can execute.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum EditorCommand {
    /// Place a catalog entry
    AddItem {
        catalog_key: String,
        #[serde(default)]
        position: [f64; 3],
    },
    /// Add a fully described item
    AddCustomItem {
        item: Item,
    },
    RemoveItem {
        id: ItemId,
    },
    DuplicateItem {
        id: ItemId,
    },
    MoveItem {
        id: ItemId,
        position: [f64; 3],
    },
    RotateItem {
        id: ItemId,
        rotation: [f64; 3],
    },
    ScaleItem {
        id: ItemId,
        scale: [f64; 3],
    },
    LockItem {
        id: ItemId,
    },
    UnlockItem {
        id: ItemId,
    },
    MountOnWall {
        id: ItemId,
        side: WallSide,
        u: f64,
        height: f64,
        #[serde(default)]
        offset: f64,
    },
    /// Undo the last operation.
    Undo,
    /// Redo the last undone operation.
    Redo,
    /// Remove every item.
    Clear,
    /// Merge new room dimensions; items are pushed back inside.
    UpdateRoom {
        dimensions: RoomDimensionsUpdate,
    },
    /// Overlaps of one item, or every overlapping pair without an id.
    CheckCollisions {
        #[serde(default)]
        id: Option<ItemId>,
    },
    FindFreePosition {
        id: ItemId,
        #[serde(default)]
        max_attempts: Option<usize>,
        /// Move the item there when found
        #[serde(default)]
        apply: bool,
    },
    SnapSettings {
        #[serde(default)]
        grid: Option<GridSettings>,
        #[serde(default)]
        rotation: Option<RotationSnapSettings>,
    },
    SetCollisionMode {
        mode: CollisionMode,
    },
    ApplyTemplate {
        id: String,
    },
    SaveLayout {
        name: String,
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        tags: Option<Vec<String>>,
    },
    LoadLayout {
        id: String,
    },
    DeleteLayout {
        id: String,
    },
    ListLayouts,
    AutoSave,
    LoadAutoSave,
    /// Drop layouts past the retention window.
    Cleanup,
    Usage,
    /// Inspect the room: list all items.
    Inspect,
    /// Export the item list as JSON.
    ExportLayout,
}

/// Response from executing a command.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommandResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl CommandResponse {
    fn ok() -> Self {
        Self {
            success: true,
            error: None,
            data: None,
        }
    }

    fn ok_with_data(data: serde_json::Value) -> Self {
        Self {
            success: true,
            error: None,
            data: Some(data),
        }
    }

    fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(msg.into()),
            data: None,
        }
    }

    fn err_with_data(msg: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            success: false,
            error: Some(msg.into()),
            data: Some(data),
        }
    }
}

fn transform_response(id: &str, outcome: TransformOutcome) -> CommandResponse {
    match outcome {
        TransformOutcome::Applied { colliding_with } => CommandResponse::ok_with_data(
            serde_json::json!({ "applied": true, "colliding_with": colliding_with }),
        ),
        TransformOutcome::Unchanged => {
            CommandResponse::ok_with_data(serde_json::json!({ "applied": false }))
        }
        TransformOutcome::Locked => CommandResponse::err(format!("Item {id} is locked")),
        TransformOutcome::Blocked { colliding_with } => CommandResponse::err_with_data(
            format!("Item {id} would collide"),
            serde_json::json!({ "colliding_with": colliding_with }),
        ),
        TransformOutcome::NotFound => CommandResponse::err(format!("Item not found: {id}")),
    }
}

/// Execute a single command on the harness.
pub fn execute_command<S: Storage>(
    harness: &mut EditorHarness<S>,
    cmd: EditorCommand,
) -> CommandResponse {
    match cmd {
        EditorCommand::AddItem {
            catalog_key,
            position,
        } => {
            if harness.catalog.get(&catalog_key).is_none() {
                return CommandResponse::err(format!("Unknown catalog entry: {catalog_key}"));
            }
            match harness.place(&catalog_key, position) {
                Some(id) => CommandResponse::ok_with_data(serde_json::json!({
                    "id": id,
                    "position": harness.position_of(&id),
                })),
                None => CommandResponse::err(format!("Could not add {catalog_key}")),
            }
        }

        EditorCommand::AddCustomItem { item } => {
            let requested = item.id.clone();
            match harness.add_item(item) {
                Some(id) => CommandResponse::ok_with_data(serde_json::json!({
                    "id": id,
                    "position": harness.position_of(&id),
                })),
                None => CommandResponse::err(format!("Item id already in use: {requested}")),
            }
        }

        EditorCommand::RemoveItem { id } => {
            let removed = harness.remove(&id);
            CommandResponse::ok_with_data(serde_json::json!({ "removed": removed }))
        }

        EditorCommand::DuplicateItem { id } => match harness.editor.duplicate_item(&id) {
            Some(new_id) => CommandResponse::ok_with_data(serde_json::json!({ "id": new_id })),
            None => CommandResponse::err(format!("Item not found: {id}")),
        },

        EditorCommand::MoveItem { id, position } => {
            let outcome = harness.move_item(&id, position);
            transform_response(&id, outcome)
        }

        EditorCommand::RotateItem { id, rotation } => {
            let outcome = harness.editor.rotate_item(&id, rotation);
            transform_response(&id, outcome)
        }

        EditorCommand::ScaleItem { id, scale } => {
            let outcome = harness.editor.scale_item(&id, scale);
            transform_response(&id, outcome)
        }

        EditorCommand::LockItem { id } => {
            if harness.item(&id).is_none() {
                return CommandResponse::err(format!("Item not found: {id}"));
            }
            let locked = harness.editor.lock_item(&id);
            CommandResponse::ok_with_data(serde_json::json!({ "locked": locked }))
        }

        EditorCommand::UnlockItem { id } => {
            if harness.item(&id).is_none() {
                return CommandResponse::err(format!("Item not found: {id}"));
            }
            let unlocked = harness.editor.unlock_item(&id);
            CommandResponse::ok_with_data(serde_json::json!({ "unlocked": unlocked }))
        }

        EditorCommand::MountOnWall {
            id,
            side,
            u,
            height,
            offset,
        } => {
            let outcome = harness.editor.mount_on_wall(&id, side, u, height, offset);
            transform_response(&id, outcome)
        }

        EditorCommand::Undo => {
            let success = harness.undo();
            CommandResponse::ok_with_data(serde_json::json!({ "undone": success }))
        }

        EditorCommand::Redo => {
            let success = harness.redo();
            CommandResponse::ok_with_data(serde_json::json!({ "redone": success }))
        }

        EditorCommand::Clear => {
            harness.clear();
            CommandResponse::ok()
        }

        EditorCommand::UpdateRoom { dimensions } => {
            harness.update_room(&dimensions);
            CommandResponse::ok_with_data(serde_json::json!({ "room": harness.editor.room().get() }))
        }

        EditorCommand::CheckCollisions { id: Some(id) } => {
            if harness.item(&id).is_none() {
                return CommandResponse::err(format!("Item not found: {id}"));
            }
            let colliding_with = harness.editor.collisions_for(&id);
            CommandResponse::ok_with_data(serde_json::json!({
                "collides": !colliding_with.is_empty(),
                "colliding_with": colliding_with,
            }))
        }

        EditorCommand::CheckCollisions { id: None } => {
            let pairs = harness.editor.overlapping_pairs();
            CommandResponse::ok_with_data(serde_json::json!({ "pairs": pairs }))
        }

        EditorCommand::FindFreePosition {
            id,
            max_attempts,
            apply,
        } => {
            if harness.item(&id).is_none() {
                return CommandResponse::err(format!("Item not found: {id}"));
            }
            let attempts = max_attempts.unwrap_or(crate::geometry::DEFAULT_MAX_ATTEMPTS);
            let position = harness.editor.find_free_position(&id, attempts);
            let applied = match (apply, position) {
                (true, Some(p)) => harness.move_item(&id, p).is_applied(),
                _ => false,
            };
            CommandResponse::ok_with_data(serde_json::json!({
                "position": position,
                "applied": applied,
            }))
        }

        EditorCommand::SnapSettings { grid, rotation } => {
            let grid = grid.unwrap_or(harness.editor.settings().grid);
            let rotation = rotation.unwrap_or(harness.editor.settings().rotation_snap);
            let changed = harness.editor.set_snap_settings(grid, rotation);
            CommandResponse::ok_with_data(serde_json::json!({
                "changed": changed,
                "grid": grid,
                "rotation": rotation,
            }))
        }

        EditorCommand::SetCollisionMode { mode } => {
            harness.editor.set_collision_mode(mode);
            CommandResponse::ok()
        }

        EditorCommand::ApplyTemplate { id } => match harness.apply_template(&id) {
            Some(result) => CommandResponse::ok_with_data(serde_json::json!(result)),
            None => CommandResponse::err(format!("Unknown template: {id}")),
        },

        EditorCommand::SaveLayout {
            name,
            description,
            tags,
        } => match harness.save_layout(&name, description.as_deref(), tags) {
            Ok(id) => CommandResponse::ok_with_data(serde_json::json!({ "id": id })),
            Err(e) => CommandResponse::err(format!("Failed to save layout: {e}")),
        },

        EditorCommand::LoadLayout { id } => match harness.load_layout(&id) {
            Some(report) => CommandResponse::ok_with_data(serde_json::json!(report)),
            None => CommandResponse::err(format!("Layout not found: {id}")),
        },

        EditorCommand::DeleteLayout { id } => match harness.delete_layout(&id) {
            Ok(deleted) => CommandResponse::ok_with_data(serde_json::json!({ "deleted": deleted })),
            Err(e) => CommandResponse::err(format!("Failed to delete layout: {e}")),
        },

        EditorCommand::ListLayouts => {
            let layouts = harness.layouts();
            CommandResponse::ok_with_data(serde_json::json!({ "layouts": layouts }))
        }

        EditorCommand::AutoSave => match harness.auto_save() {
            Ok(()) => CommandResponse::ok(),
            Err(e) => CommandResponse::err(format!("Auto-save failed: {e}")),
        },

        EditorCommand::LoadAutoSave => match harness.restore_auto_save() {
            Some(report) => CommandResponse::ok_with_data(serde_json::json!(report)),
            None => CommandResponse::err("No auto-save found"),
        },

        EditorCommand::Cleanup => match harness.store.cleanup() {
            Ok(report) => CommandResponse::ok_with_data(serde_json::json!(report)),
            Err(e) => CommandResponse::err(format!("Cleanup failed: {e}")),
        },

        EditorCommand::Usage => {
            CommandResponse::ok_with_data(serde_json::json!(harness.store.usage()))
        }

        EditorCommand::Inspect => {
            let items: Vec<serde_json::Value> = harness
                .editor
                .items()
                .iter()
                .map(|item| {
                    serde_json::json!({
                        "id": item.id,
                        "name": item.name,
                        "position": item.position(),
                        "yaw": item.yaw(),
                        "locked": item.locked,
                        "wall": item.wall_mount.as_ref().map(|m| m.side),
                    })
                })
                .collect();
            CommandResponse::ok_with_data(serde_json::json!({
                "item_count": items.len(),
                "items": items,
                "room": harness.editor.room().get(),
                "can_undo": harness.editor.can_undo(),
                "can_redo": harness.editor.can_redo(),
                "version": harness.editor.version(),
            }))
        }

        EditorCommand::ExportLayout => {
            let json = harness.export_layout_json();
            CommandResponse::ok_with_data(serde_json::json!({ "layout_json": json }))
        }
    }
}

/// Parse and execute a single JSON command string.
pub fn execute_json<S: Storage>(
    harness: &mut EditorHarness<S>,
    json: &str,
) -> Result<CommandResponse, String> {
    let cmd: EditorCommand =
        serde_json::from_str(json).map_err(|e| format!("Invalid command JSON: {e}"))?;
    Ok(execute_command(harness, cmd))
}

/// Parse and execute multiple JSON commands (array).
pub fn execute_json_batch<S: Storage>(
    harness: &mut EditorHarness<S>,
    json: &str,
) -> Result<Vec<CommandResponse>, String> {
    let cmds: Vec<EditorCommand> =
        serde_json::from_str(json).map_err(|e| format!("Invalid commands JSON: {e}"))?;
    Ok(cmds
        .into_iter()
        .map(|cmd| execute_command(harness, cmd))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_serde_undo() {
        let json = r#"{"command": "undo"}"#;
        let cmd: EditorCommand = serde_json::from_str(json).unwrap();
        assert!(matches!(cmd, EditorCommand::Undo));
    }

    #[test]
    fn test_command_serde_mount_on_wall() {
        let json = r#"{"command": "mount_on_wall", "id": "clock_1", "side": "north", "u": 1.0, "height": 1.5}"#;
        let cmd: EditorCommand = serde_json::from_str(json).unwrap();
        match cmd {
            EditorCommand::MountOnWall { side, offset, .. } => {
                assert_eq!(side, WallSide::North);
                assert_eq!(offset, 0.0);
            }
            _ => panic!("Expected MountOnWall"),
        }
    }

    #[test]
    fn test_command_serde_partial_snap_settings() {
        let json = r#"{"command": "snap_settings", "grid": {"enabled": true}}"#;
        let cmd: EditorCommand = serde_json::from_str(json).unwrap();
        match cmd {
            EditorCommand::SnapSettings { grid, rotation } => {
                let grid = grid.unwrap();
                assert!(grid.enabled);
                assert_eq!(grid.divisions, 10);
                assert!(rotation.is_none());
            }
            _ => panic!("Expected SnapSettings"),
        }
    }

    #[test]
    fn test_execute_add_item() {
        let mut h = EditorHarness::new();
        let resp = execute_json(
            &mut h,
            r#"{"command": "add_item", "catalog_key": "sofa-001", "position": [9.0, 0.0, 0.0]}"#,
        )
        .unwrap();
        assert!(resp.success);
        let data = resp.data.unwrap();
        assert!((data["position"][0].as_f64().unwrap() - 3.6).abs() < 1e-9);
        assert_eq!(h.item_count(), 1);

        let resp = execute_json(&mut h, r#"{"command": "add_item", "catalog_key": "throne"}"#).unwrap();
        assert!(!resp.success);
        assert!(resp.error.unwrap().contains("throne"));
    }

    #[test]
    fn test_execute_move_locked_reports_error() {
        let mut h = EditorHarness::new();
        let id = h.place("desk-001", [0.0, 0.0, 0.0]).unwrap();
        h.editor.lock_item(&id);

        let cmd = EditorCommand::MoveItem {
            id: id.clone(),
            position: [1.0, 0.0, 1.0],
        };
        let resp = execute_command(&mut h, cmd);
        assert!(!resp.success);
        assert!(resp.error.unwrap().contains("locked"));
        assert_eq!(h.position_of(&id).unwrap()[0], 0.0);
    }

    #[test]
    fn test_execute_inspect() {
        let mut h = EditorHarness::new();
        h.place("desk-001", [0.0, 0.0, 0.0]);
        h.place("office-chair-001", [2.0, 0.0, 0.0]);

        let resp = execute_json(&mut h, r#"{"command": "inspect"}"#).unwrap();
        assert!(resp.success);
        let data = resp.data.unwrap();
        assert_eq!(data["item_count"], 2);
        assert_eq!(data["can_undo"], true);
    }

    #[test]
    fn test_execute_undo_redo() {
        let mut h = EditorHarness::new();
        h.place("desk-001", [0.0, 0.0, 0.0]);

        let resp = execute_json(&mut h, r#"{"command": "undo"}"#).unwrap();
        assert_eq!(resp.data.unwrap()["undone"], true);
        assert_eq!(h.item_count(), 0);

        let resp = execute_json(&mut h, r#"{"command": "redo"}"#).unwrap();
        assert_eq!(resp.data.unwrap()["redone"], true);
        assert_eq!(h.item_count(), 1);
    }

    #[test]
    fn test_execute_check_collisions() {
        let mut h = EditorHarness::new();
        let a = h.place("desk-001", [0.0, 0.0, 0.0]).unwrap();
        let b = h.place("office-chair-001", [0.5, 0.0, 0.0]).unwrap();

        let resp = execute_command(&mut h, EditorCommand::CheckCollisions { id: Some(a) });
        let data = resp.data.unwrap();
        assert_eq!(data["collides"], true);
        assert_eq!(data["colliding_with"][0], b);

        let resp = execute_json(&mut h, r#"{"command": "check_collisions"}"#).unwrap();
        assert_eq!(resp.data.unwrap()["pairs"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_execute_json_invalid() {
        let mut h = EditorHarness::new();
        let err = execute_json(&mut h, "not json").unwrap_err();
        assert!(err.starts_with("Invalid command JSON"));
        let err = execute_json_batch(&mut h, r#"{"command": "undo"}"#).unwrap_err();
        assert!(err.starts_with("Invalid commands JSON"));
    }

    #[test]
    fn test_execute_batch() {
        let mut h = EditorHarness::new();
        let json = r#"[
            {"command": "add_item", "catalog_key": "bed-001"},
            {"command": "save_layout", "name": "Bedroom"},
            {"command": "list_layouts"},
            {"command": "usage"}
        ]"#;
        let responses = execute_json_batch(&mut h, json).unwrap();
        assert_eq!(responses.len(), 4);
        assert!(responses.iter().all(|r| r.success));
        let layouts = responses[2].data.as_ref().unwrap()["layouts"].as_array().unwrap().len();
        assert_eq!(layouts, 1);
        assert!(responses[3].data.as_ref().unwrap()["used"].as_u64().unwrap() > 0);
    }
}
