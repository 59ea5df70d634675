//! JSON command sessions driven through the harness.

use room_editor_lib::command::{execute_json, execute_json_batch, EditorCommand, execute_command};
use room_editor_lib::harness::EditorHarness;

#[test]
fn furnish_save_clear_and_reload() {
    let mut h = EditorHarness::new();
    let responses = execute_json_batch(
        &mut h,
        r#"[
            {"command": "add_item", "catalog_key": "sofa-001", "position": [0.0, 0.0, -2.0]},
            {"command": "add_item", "catalog_key": "coffee-table-001"},
            {"command": "add_item", "catalog_key": "clock", "position": [0.0, 0.0, -4.5]},
            {"command": "save_layout", "name": "Living", "tags": ["cozy"]}
        ]"#,
    )
    .unwrap();
    assert!(responses.iter().all(|r| r.success));
    let layout_id = responses[3].data.as_ref().unwrap()["id"].as_str().unwrap().to_string();

    let resp = execute_json(&mut h, r#"{"command": "clear"}"#).unwrap();
    assert!(resp.success);
    assert_eq!(h.item_count(), 0);

    let resp = execute_command(&mut h, EditorCommand::LoadLayout { id: layout_id.clone() });
    assert!(resp.success);
    let data = resp.data.unwrap();
    assert_eq!(data["loaded"], 3);
    assert_eq!(data["skipped"].as_array().unwrap().len(), 0);
    assert!(h.all_contained());

    let resp = execute_json(&mut h, r#"{"command": "list_layouts"}"#).unwrap();
    let layouts = resp.data.unwrap()["layouts"].clone();
    assert_eq!(layouts[0]["name"], "Living");
    assert_eq!(layouts[0]["itemCount"], 3);
    assert_eq!(layouts[0]["tags"][0], "cozy");

    let resp = execute_command(&mut h, EditorCommand::DeleteLayout { id: layout_id.clone() });
    assert_eq!(resp.data.unwrap()["deleted"], true);
    let resp = execute_command(&mut h, EditorCommand::LoadLayout { id: layout_id });
    assert!(!resp.success);
    assert!(resp.error.unwrap().starts_with("Layout not found"));
}

#[test]
fn room_shrink_pushes_items_inside() {
    let mut h = EditorHarness::new();
    let resp = execute_json(
        &mut h,
        r#"{"command": "add_item", "catalog_key": "wardrobe-001", "position": [4.0, 0.0, 4.0]}"#,
    )
    .unwrap();
    let id = resp.data.unwrap()["id"].as_str().unwrap().to_string();

    let resp = execute_json(
        &mut h,
        r#"{"command": "update_room", "dimensions": {"width": 4.0, "depth": 4.0}}"#,
    )
    .unwrap();
    assert!(resp.success);
    assert_eq!(resp.data.unwrap()["room"]["width"], 4.0);

    let position = h.position_of(&id).unwrap();
    // maxX = 2 - 0.3, half width 0.6
    assert!((position[0] - 1.1).abs() < 1e-9);
    assert!(h.all_contained());
}

#[test]
fn snapping_and_rotation_through_commands() {
    let mut h = EditorHarness::new();
    let responses = execute_json_batch(
        &mut h,
        r#"[
            {"command": "snap_settings", "grid": {"enabled": true, "size": 1.0, "divisions": 2},
             "rotation": {"enabled": true, "angle": 45.0}},
            {"command": "add_item", "catalog_key": "side-table-001", "position": [1.3, 0.0, -0.8]},
            {"command": "snap_settings", "grid": {"enabled": true, "size": 1.0, "divisions": 2}}
        ]"#,
    )
    .unwrap();
    assert_eq!(responses[0].data.as_ref().unwrap()["changed"], true);
    assert_eq!(responses[2].data.as_ref().unwrap()["changed"], false);

    let id = responses[1].data.as_ref().unwrap()["id"].as_str().unwrap().to_string();
    assert_eq!(h.position_of(&id).unwrap(), [1.5, 0.3, -1.0]);

    let resp = execute_command(
        &mut h,
        EditorCommand::RotateItem {
            id: id.clone(),
            rotation: [0.0, 0.7, 0.0],
        },
    );
    assert!(resp.success);
    let yaw = h.item(&id).unwrap().yaw();
    assert!((yaw - std::f64::consts::FRAC_PI_4).abs() < 1e-9);
}

#[test]
fn block_mode_rejects_colliding_move() {
    let mut h = EditorHarness::new();
    let a = h.place("desk-001", [-2.0, 0.0, 0.0]).unwrap();
    let b = h.place("desk-001", [2.0, 0.0, 0.0]).unwrap();

    let resp = execute_json(&mut h, r#"{"command": "set_collision_mode", "mode": "block"}"#).unwrap();
    assert!(resp.success);

    let resp = execute_command(
        &mut h,
        EditorCommand::MoveItem {
            id: b.clone(),
            position: [-1.8, 0.0, 0.0],
        },
    );
    assert!(!resp.success);
    assert_eq!(resp.data.unwrap()["colliding_with"][0], a);
    assert_eq!(h.position_of(&b).unwrap()[0], 2.0);
}

#[test]
fn find_free_position_resolves_overlap() {
    let mut h = EditorHarness::new();
    let a = h.place("side-table-001", [0.0, 0.0, 0.0]).unwrap();
    let b = h.place("side-table-001", [0.2, 0.0, 0.0]).unwrap();
    assert_eq!(h.editor.collisions_for(&b), vec![a]);

    let resp = execute_command(
        &mut h,
        EditorCommand::FindFreePosition {
            id: b.clone(),
            max_attempts: None,
            apply: true,
        },
    );
    assert!(resp.success);
    assert_eq!(resp.data.unwrap()["applied"], true);
    assert!(h.editor.collisions_for(&b).is_empty());
}

#[test]
fn templates_auto_save_and_usage() {
    let mut h = EditorHarness::new();
    let resp = execute_json(&mut h, r#"{"command": "apply_template", "id": "modern-living-room"}"#).unwrap();
    assert!(resp.success);
    assert_eq!(resp.data.unwrap()["applied"], 3);

    let resp = execute_json(&mut h, r#"{"command": "apply_template", "id": "spaceship"}"#).unwrap();
    assert!(!resp.success);

    assert!(execute_json(&mut h, r#"{"command": "auto_save"}"#).unwrap().success);
    let resp = execute_json(&mut h, r#"{"command": "usage"}"#).unwrap();
    let usage = resp.data.unwrap();
    assert!(usage["used"].as_u64().unwrap() > 0);
    assert_eq!(usage["total"], 5 * 1024 * 1024);

    execute_json(&mut h, r#"{"command": "clear"}"#).unwrap();
    let resp = execute_json(&mut h, r#"{"command": "load_auto_save"}"#).unwrap();
    assert!(resp.success);
    assert_eq!(h.item_count(), 3);

    let resp = execute_json(&mut h, r#"{"command": "cleanup"}"#).unwrap();
    assert_eq!(resp.data.unwrap()["removed"], 0);
}

#[test]
fn wall_mount_and_export() {
    let mut h = EditorHarness::new();
    let id = h.place("wall-art-001", [0.0, 0.0, 0.0]).unwrap();

    let resp = execute_json(
        &mut h,
        &format!(r#"{{"command": "mount_on_wall", "id": "{id}", "side": "east", "u": 9.0, "height": 1.2}}"#),
    )
    .unwrap();
    assert!(resp.success);
    let mount = h.item(&id).unwrap().wall_mount.clone().unwrap();
    assert_eq!(mount.side, shared::WallSide::East);
    assert!((mount.u - 4.3).abs() < 1e-9);

    let resp = execute_json(&mut h, r#"{"command": "export_layout"}"#).unwrap();
    let json = resp.data.unwrap()["layout_json"].as_str().unwrap().to_string();
    let items: Vec<shared::Item> = serde_json::from_str(&json).unwrap();
    assert_eq!(items.len(), 1);
    assert!(items[0].wall_mount.is_some());
}
