use bevy::prelude::*;

use crate::core::resources::EquipmentSettings;
use crate::equipment::events::SubscriptionId;
use crate::sockets::{SlotSocketMapping, SlotSocketTable};

use super::systems::release_subscriptions;

/// 负责装备实例的生成、挂接、销毁与丢弃，挂在带装备控制器的角色上
///
/// `enabled` 为真时订阅装备事件，置为假后由同步系统取消订阅。
/// 组件被移除或覆盖时，留在控制器上的订阅一并撤掉。
#[derive(Component, Debug)]
#[component(on_replace = release_subscriptions)]
pub struct EquipmentVisualHandler {
    /// 挂点表所在实体；为空时启用时自动查找
    pub sockets: Option<Entity>,
    pub mappings: SlotSocketTable,
    pub add_rigid_body_on_drop: bool,
    pub drop_force: f32,
    pub enabled: bool,
    pub(crate) subscriptions: Vec<SubscriptionId>,
}

impl Default for EquipmentVisualHandler {
    fn default() -> Self {
        Self {
            sockets: None,
            mappings: SlotSocketTable::default(),
            add_rigid_body_on_drop: true,
            drop_force: 2.0,
            enabled: true,
            subscriptions: Vec::new(),
        }
    }
}

impl EquipmentVisualHandler {
    pub fn new(mappings: &[SlotSocketMapping]) -> Self {
        Self {
            mappings: SlotSocketTable::new(mappings),
            ..default()
        }
    }

    pub fn from_settings(settings: &EquipmentSettings) -> Self {
        Self {
            mappings: SlotSocketTable::new(&settings.mappings),
            add_rigid_body_on_drop: settings.add_rigid_body_on_drop,
            drop_force: settings.drop_force,
            ..default()
        }
    }

    pub fn is_subscribed(&self) -> bool {
        !self.subscriptions.is_empty()
    }
}
