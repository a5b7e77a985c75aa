use bevy::prelude::*;

use crate::equipment::events::SubscriptionId;
use crate::equipment::ItemRef;

use super::systems::release_drop_listener;

/// 放在地上、可以被拾取的物品实例
#[derive(Component, Debug, Clone)]
pub struct WorldItem {
    pub definition: ItemRef,
}

/// 拾取判定开关；物品被装备后关闭，被丢弃后重新打开
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickupCollider {
    pub enabled: bool,
}

impl Default for PickupCollider {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// 能拾取地上物品的角色
#[derive(Component, Debug, Clone, Copy)]
pub struct Interactor {
    pub radius: f32,
}

impl Default for Interactor {
    fn default() -> Self {
        Self { radius: 2.0 }
    }
}

/// 记录角色上已订阅的丢弃监听器，保证每个控制器只订阅一次；组件移除时退订
#[derive(Component, Debug)]
#[component(on_replace = release_drop_listener)]
pub struct PickupListener {
    pub(crate) subscription: SubscriptionId,
}

/// 请求某个角色拾取物品；不指定名称时拾取身边最近的
#[derive(Event, Debug, Clone)]
pub struct PickupRequest {
    pub interactor: Entity,
    pub name: Option<String>,
}
