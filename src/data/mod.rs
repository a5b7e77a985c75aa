pub mod schema;
pub mod loader;

use bevy::prelude::*;
use schema::ItemList;
use std::collections::HashMap;
use std::sync::Arc;
use crate::core::states::AppState;
use crate::equipment::ItemRef;

pub const ITEMS_PATH: &str = "data/items.ron";

// --------------------------- 资源 ---------------------------
#[derive(Resource, Default)]
pub struct ItemAssets {
    pub handle: Option<Handle<ItemList>>,
}

/// 加载完成后的物品表，按 id 共享给装备系统
#[derive(Resource, Default)]
pub struct ItemCatalog {
    items: HashMap<String, ItemRef>,
    order: Vec<String>,
}

impl ItemCatalog {
    pub fn from_list(list: &ItemList) -> Self {
        let mut catalog = Self::default();
        for entry in &list.items {
            let key = entry.id.to_lowercase();
            catalog.order.push(key.clone());
            catalog.items.insert(key, Arc::new(entry.clone()));
        }
        catalog
    }

    pub fn get(&self, id: &str) -> Option<ItemRef> {
        self.items.get(&id.to_lowercase()).cloned()
    }

    /// 按数据文件中的顺序遍历
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ItemRef)> {
        self.order
            .iter()
            .filter_map(|id| self.items.get(id).map(|item| (id.as_str(), item)))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// --------------------------- 插件 ---------------------------
pub struct DataPlugin;
impl Plugin for DataPlugin {
    fn build(&self, app: &mut App) {
        app
            // 注册资产类型 & Loader
            .init_asset::<ItemList>()
            .register_asset_loader(loader::RonItemLoader)
            // 注册资源
            .init_resource::<ItemAssets>()
            .init_resource::<ItemCatalog>()
            // Loading 流程
            .add_systems(OnEnter(AppState::Loading), start_loading)
            .add_systems(
                Update,
                check_loaded.run_if(in_state(AppState::Loading)),
            );
    }
}

// --------------------------- 系统 ---------------------------
fn start_loading(
    mut item_assets: ResMut<ItemAssets>,
    asset_server: Res<AssetServer>,
) {
    let handle: Handle<ItemList> = asset_server.load(ITEMS_PATH);
    item_assets.handle = Some(handle);
}

fn check_loaded(
    mut next: ResMut<NextState<AppState>>,
    mut catalog: ResMut<ItemCatalog>,
    item_assets: Res<ItemAssets>,
    lists: Res<Assets<ItemList>>,
) {
    if let Some(h) = &item_assets.handle {
        if let Some(list) = lists.get(h) {
            *catalog = ItemCatalog::from_list(list);
            info!("✔ Items loaded: {}", catalog.len());
            next.set(AppState::InGame);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::schema::ItemDefinition;
    use crate::equipment::EquipmentSlotType;

    #[test]
    fn catalog_keeps_file_order_and_ignores_case() {
        let list = ItemList {
            items: vec![
                ItemDefinition::new("Sword", EquipmentSlotType::PrimaryWeapon),
                ItemDefinition::new("cap", EquipmentSlotType::Head),
            ],
        };
        let catalog = ItemCatalog::from_list(&list);

        let ids: Vec<&str> = catalog.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["sword", "cap"]);
        assert_eq!(
            catalog.get("SWORD").unwrap().slot_type(),
            EquipmentSlotType::PrimaryWeapon
        );
        assert!(catalog.get("shield").is_none());
    }
}
