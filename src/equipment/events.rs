use bevy::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;

use super::components::EquipmentSlotType;
use super::context::{EquipContext, InstanceSource, ItemRef};

// --------------------------- 广播事件 ---------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EquipmentEventKind {
    ItemEquipped,
    ItemUnequipped,
    ItemDropped,
    SlotCleared,
}

impl EquipmentEventKind {
    pub const ALL: [EquipmentEventKind; 4] = [
        EquipmentEventKind::ItemEquipped,
        EquipmentEventKind::ItemUnequipped,
        EquipmentEventKind::ItemDropped,
        EquipmentEventKind::SlotCleared,
    ];
}

/// 装备状态机同步广播的事件，上下文按值携带
#[derive(Debug, Clone)]
pub enum EquipmentEvent {
    ItemEquipped(EquipContext),
    ItemUnequipped(EquipContext),
    ItemDropped(EquipContext),
    SlotCleared(EquipmentSlotType),
}

impl EquipmentEvent {
    pub fn kind(&self) -> EquipmentEventKind {
        match self {
            EquipmentEvent::ItemEquipped(_) => EquipmentEventKind::ItemEquipped,
            EquipmentEvent::ItemUnequipped(_) => EquipmentEventKind::ItemUnequipped,
            EquipmentEvent::ItemDropped(_) => EquipmentEventKind::ItemDropped,
            EquipmentEvent::SlotCleared(_) => EquipmentEventKind::SlotCleared,
        }
    }

    pub fn context(&self) -> Option<&EquipContext> {
        match self {
            EquipmentEvent::ItemEquipped(context)
            | EquipmentEvent::ItemUnequipped(context)
            | EquipmentEvent::ItemDropped(context) => Some(context),
            EquipmentEvent::SlotCleared(_) => None,
        }
    }
}

// --------------------------- 监听器 ---------------------------

/// 装备事件监听器
///
/// 在广播线程上同步调用，`owner` 为发出事件的装备控制器所在实体。
/// 回调期间可以自由访问 `World`，包括对同一控制器再次订阅或取消订阅。
pub trait EquipmentListener: Send + Sync + 'static {
    fn on_event(&self, world: &mut World, owner: Entity, event: &EquipmentEvent);
}

impl<F> EquipmentListener for F
where
    F: Fn(&mut World, Entity, &EquipmentEvent) + Send + Sync + 'static,
{
    fn on_event(&self, world: &mut World, owner: Entity, event: &EquipmentEvent) {
        self(world, owner, event)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// 按事件类型分组的监听器列表，保持注册顺序
#[derive(Default)]
pub struct EquipmentEvents {
    next_id: u64,
    listeners: HashMap<EquipmentEventKind, Vec<(SubscriptionId, Arc<dyn EquipmentListener>)>>,
}

impl EquipmentEvents {
    pub fn subscribe(
        &mut self,
        kind: EquipmentEventKind,
        listener: Arc<dyn EquipmentListener>,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.entry(kind).or_default().push((id, listener));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        for list in self.listeners.values_mut() {
            if let Some(index) = list.iter().position(|(sub, _)| *sub == id) {
                list.remove(index);
                return true;
            }
        }
        false
    }

    /// 当前订阅者的快照，广播期间的增删不影响本次分发
    pub fn listeners_for(&self, kind: EquipmentEventKind) -> Vec<Arc<dyn EquipmentListener>> {
        self.listeners
            .get(&kind)
            .map(|list| list.iter().map(|(_, l)| l.clone()).collect())
            .unwrap_or_default()
    }

    pub fn listener_count(&self, kind: EquipmentEventKind) -> usize {
        self.listeners.get(&kind).map_or(0, Vec::len)
    }
}

// --------------------------- 请求事件 ---------------------------

/// 请求装备（由 CLI / 脚本发出，下一帧处理）
#[derive(Event)]
pub struct EquipRequest {
    pub owner: Entity,
    pub item: ItemRef,
    pub source: InstanceSource,
}

#[derive(Event)]
pub struct UnequipRequest {
    pub owner: Entity,
    pub slot: EquipmentSlotType,
}

#[derive(Event)]
pub struct DropRequest {
    pub owner: Entity,
    pub slot: EquipmentSlotType,
}
