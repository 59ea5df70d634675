//! Room templates: predefined furniture arrangements

use std::f64::consts::{FRAC_PI_2, PI};

use serde::{Deserialize, Serialize};
use shared::{Item, LockedSnapSettings, RoomDimensions};

use crate::catalog::{Catalog, Category};
use crate::state::EditorState;

/// Rotation snap recorded on items a template locks (degrees)
const TEMPLATE_ROTATION_SNAP: f64 = 15.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateItem {
    pub catalog_key: String,
    /// Floor position; Y is derived from the catalog entry
    pub position: [f64; 3],
    #[serde(default)]
    pub rotation: [f64; 3],
    #[serde(default = "unit_scale")]
    pub scale: [f64; 3],
    #[serde(default)]
    pub locked: bool,
}

fn unit_scale() -> [f64; 3] {
    [1.0, 1.0, 1.0]
}

impl TemplateItem {
    fn at(catalog_key: &str, x: f64, z: f64) -> Self {
        Self {
            catalog_key: catalog_key.to_string(),
            position: [x, 0.0, z],
            rotation: [0.0; 3],
            scale: unit_scale(),
            locked: false,
        }
    }

    fn yawed(mut self, yaw: f64) -> Self {
        self.rotation = [0.0, yaw, 0.0];
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomTemplate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: Category,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Grid size recorded on locked items
    #[serde(default = "default_grid_size")]
    pub grid_size: f64,
    /// Room to switch to before placing; the current room is kept when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<RoomDimensions>,
    pub items: Vec<TemplateItem>,
}

fn default_grid_size() -> f64 {
    10.0
}

/// Outcome of applying a template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateApplication {
    pub applied: usize,
    pub total: usize,
    /// Catalog keys with no catalog entry
    pub skipped: Vec<String>,
}

pub fn builtin_templates() -> Vec<RoomTemplate> {
    vec![
        RoomTemplate {
            id: "modern-living-room".into(),
            name: "Modern Living Room".into(),
            description: "A clean and modern living room setup with essential furniture".into(),
            category: Category::Living,
            tags: vec!["modern".into(), "minimal".into(), "sofa".into()],
            grid_size: 10.0,
            dimensions: None,
            items: vec![
                TemplateItem::at("sofa-001", 0.0, -2.0),
                TemplateItem::at("coffee-table-001", 0.0, 0.0),
                TemplateItem::at("tv-stand-001", 0.0, 3.0).yawed(PI),
            ],
        },
        RoomTemplate {
            id: "cozy-bedroom".into(),
            name: "Cozy Bedroom".into(),
            description: "A warm bedroom with a queen bed, nightstands and a wardrobe".into(),
            category: Category::Bedroom,
            tags: vec!["cozy".into(), "bed".into()],
            grid_size: 10.0,
            dimensions: None,
            items: vec![
                TemplateItem::at("bed-001", 0.0, 0.0),
                TemplateItem::at("bedside-table-001", 1.5, 1.0),
                TemplateItem::at("bedside-table-001", -1.5, 1.0),
                TemplateItem::at("wardrobe-001", -3.0, -2.0).yawed(FRAC_PI_2),
            ],
        },
        RoomTemplate {
            id: "modern-kitchen".into(),
            name: "Modern Kitchen".into(),
            description: "Dining corner with a round table and two chairs".into(),
            category: Category::Kitchen,
            tags: vec!["dining".into()],
            grid_size: 10.0,
            dimensions: None,
            items: vec![
                TemplateItem::at("dining-table-001", 3.0, 2.0),
                TemplateItem::at("simple-chair-001", 3.0, 3.5),
                TemplateItem::at("simple-chair-001", 3.0, 0.5).yawed(PI),
            ],
        },
    ]
}

pub fn template_by_id(id: &str) -> Option<RoomTemplate> {
    builtin_templates().into_iter().find(|t| t.id == id)
}

impl EditorState {
    /// Replace the room contents with a template's arrangement.
    ///
    /// Entries the catalog does not know are skipped. The whole change is
    /// one undo step.
    pub fn apply_template(&mut self, template: &RoomTemplate, catalog: &Catalog) -> TemplateApplication {
        if let Some(dimensions) = template.dimensions {
            self.room.replace(dimensions);
        }
        let room = self.room.get();

        let mut items: Vec<Item> = Vec::with_capacity(template.items.len());
        let mut skipped = Vec::new();
        for entry in &template.items {
            let Some(mut item) = catalog.create_item(&entry.catalog_key, entry.position, &room) else {
                tracing::warn!("Template {}: unknown catalog entry {}", template.id, entry.catalog_key);
                skipped.push(entry.catalog_key.clone());
                continue;
            };
            if item.wall_mount.is_none() {
                item.transform.rotation = entry.rotation;
            }
            item.transform.scale = entry.scale;
            if entry.locked {
                item.locked = true;
                item.snap_settings = Some(LockedSnapSettings {
                    grid_enabled: template.grid_size > 0.0,
                    grid_size: template.grid_size,
                    grid_divisions: template.grid_size.max(1.0) as u32,
                    rotation_snap_enabled: true,
                    rotation_snap_angle: TEMPLATE_ROTATION_SNAP,
                });
            }
            items.push(item);
        }

        let applied = self.replace_items(items, &format!("template_applied_{}", template.id));
        tracing::info!(
            "Applied template {}: {applied}/{} items",
            template.id,
            template.items.len()
        );
        TemplateApplication {
            applied,
            total: template.items.len(),
            skipped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::Footprint;

    #[test]
    fn test_builtin_templates_use_known_entries() {
        let catalog = Catalog::builtin();
        for template in builtin_templates() {
            for item in &template.items {
                assert!(
                    catalog.get(&item.catalog_key).is_some(),
                    "{} uses unknown {}",
                    template.id,
                    item.catalog_key
                );
            }
        }
        assert!(template_by_id("cozy-bedroom").is_some());
        assert!(template_by_id("castle").is_none());
    }

    #[test]
    fn test_apply_template_is_one_undo_step() {
        let mut editor = EditorState::default();
        editor.add_item(Item::new("box", "Box", Footprint::unit()).with_position([4.0, 0.5, 4.0]));

        let template = template_by_id("cozy-bedroom").unwrap();
        let result = editor.apply_template(&template, &Catalog::builtin());
        assert_eq!(result.applied, 4);
        assert_eq!(result.total, 4);
        assert!(result.skipped.is_empty());
        assert!(editor.get_item("box").is_none());
        assert!(editor.items().iter().all(|i| editor.boundary().contains(i)));
        assert!(editor.overlapping_pairs().is_empty());

        let wardrobe = editor
            .items()
            .iter()
            .find(|i| i.catalog_key.as_deref() == Some("wardrobe-001"))
            .unwrap();
        assert!((wardrobe.yaw() - FRAC_PI_2).abs() < 1e-9);
        assert!((wardrobe.position()[1] - 1.0).abs() < 1e-9);

        assert!(editor.undo());
        assert_eq!(editor.item_count(), 1);
        assert!(editor.get_item("box").is_some());
    }

    #[test]
    fn test_apply_template_skips_unknown_and_locks() {
        let template = RoomTemplate {
            id: "custom".into(),
            name: "Custom".into(),
            description: String::new(),
            category: Category::Office,
            tags: vec![],
            grid_size: 4.0,
            dimensions: Some(RoomDimensions {
                width: 6.0,
                depth: 6.0,
                ..RoomDimensions::default()
            }),
            items: vec![
                TemplateItem {
                    locked: true,
                    ..TemplateItem::at("desk-001", 10.0, 0.0)
                },
                TemplateItem::at("hover-chair", 0.0, 0.0),
            ],
        };
        let mut editor = EditorState::default();
        let result = editor.apply_template(&template, &Catalog::builtin());
        assert_eq!(result.applied, 1);
        assert_eq!(result.skipped, vec!["hover-chair".to_string()]);
        assert_eq!(editor.room().get().width, 6.0);

        let desk = &editor.items()[0];
        assert!(desk.locked);
        assert_eq!(desk.snap_settings.as_ref().unwrap().grid_divisions, 4);
        assert!(editor.boundary().contains(desk));
    }
}
