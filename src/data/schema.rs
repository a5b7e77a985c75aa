use bevy::asset::Asset;
use bevy::reflect::TypePath;
use serde_derive::Deserialize;

use crate::equipment::{EquipmentSlotType, Equippable};

/// 物品的视觉模板：装备时若没有现成实例，就按它生成实体
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VisualTemplate {
    pub name: String,
    /// 生成的实例是否自带刚体
    #[serde(default)]
    pub rigid_body: bool,
    #[serde(default = "default_mass")]
    pub mass: f32,
    #[serde(default = "default_scale")]
    pub scale: f32,
}

fn default_mass() -> f32 {
    1.0
}

fn default_scale() -> f32 {
    1.0
}

impl VisualTemplate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rigid_body: false,
            mass: default_mass(),
            scale: default_scale(),
        }
    }

    pub fn with_rigid_body(mut self, mass: f32) -> Self {
        self.rigid_body = true;
        self.mass = mass;
        self
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemDefinition {
    pub id: String,
    pub name: String,
    pub slot: EquipmentSlotType,
    #[serde(default)]
    pub prefab: Option<VisualTemplate>,
}

impl ItemDefinition {
    /// 没有视觉模板的物品，名字与 id 相同
    pub fn new(id: &str, slot: EquipmentSlotType) -> Self {
        Self {
            id: id.to_string(),
            name: id.to_string(),
            slot,
            prefab: None,
        }
    }

    pub fn with_prefab(mut self, prefab: VisualTemplate) -> Self {
        self.prefab = Some(prefab);
        self
    }
}

impl Equippable for ItemDefinition {
    fn slot_type(&self) -> EquipmentSlotType {
        self.slot
    }

    fn prefab(&self) -> Option<&VisualTemplate> {
        self.prefab.as_ref()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Asset, TypePath, Deserialize, Debug)]
pub struct ItemList {
    pub items: Vec<ItemDefinition>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::asset::ron;

    const ITEMS: &str = r#"(
        items: [
            (
                id: "iron_sword",
                name: "Iron Sword",
                slot: PrimaryWeapon,
                prefab: Some((name: "iron_sword_mesh", rigid_body: true, mass: 2.5)),
            ),
            (id: "bare_hands", name: "Bare Hands", slot: Melee),
        ],
    )"#;

    #[test]
    fn parses_item_list_from_ron() {
        let list: ItemList = ron::de::from_str(ITEMS).unwrap();
        assert_eq!(list.items.len(), 2);

        let sword = &list.items[0];
        assert_eq!(sword.slot_type(), EquipmentSlotType::PrimaryWeapon);
        let prefab = sword.prefab().unwrap();
        assert!(prefab.rigid_body);
        assert_eq!(prefab.mass, 2.5);
        assert_eq!(prefab.scale, 1.0);

        let hands = &list.items[1];
        assert!(hands.prefab().is_none());
        assert_eq!(Equippable::name(hands), "Bare Hands");
    }
}
