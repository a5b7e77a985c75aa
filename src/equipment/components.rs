use bevy::prelude::*;
use serde_derive::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use super::context::{EquipContext, ItemRef};
use super::events::{EquipmentEventKind, EquipmentEvents, EquipmentListener, SubscriptionId};

/// 装备槽类型，`None` 表示未分配 / 无效
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum EquipmentSlotType {
    #[default]
    None,
    PrimaryWeapon,
    SecondaryWeapon,
    Melee,
    Head,
    Body,
    Face,
    Backpack,
    Accessory,
}

impl EquipmentSlotType {
    /// 所有有效槽位（不含 `None`）
    pub const ALL: [EquipmentSlotType; 8] = [
        EquipmentSlotType::PrimaryWeapon,
        EquipmentSlotType::SecondaryWeapon,
        EquipmentSlotType::Melee,
        EquipmentSlotType::Head,
        EquipmentSlotType::Body,
        EquipmentSlotType::Face,
        EquipmentSlotType::Backpack,
        EquipmentSlotType::Accessory,
    ];

    pub fn is_none(self) -> bool {
        self == EquipmentSlotType::None
    }

    /// 命令行用：忽略大小写，允许 `primary_weapon` / `primaryweapon` 两种写法
    pub fn parse(token: &str) -> Option<Self> {
        let wanted = token.replace(['_', '-'], "").to_lowercase();
        Self::ALL
            .into_iter()
            .find(|slot| slot.to_string().to_lowercase() == wanted)
    }
}

impl fmt::Display for EquipmentSlotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// 角色身上的装备状态机
///
/// 每个有效槽位最多一个占用者；槽位被占用时才存在对应的 [`EquipContext`]。
/// 状态迁移（装备 / 卸下 / 丢弃）需要访问 `World`，见
/// [`EquipmentMut`](super::systems::EquipmentMut)。
#[derive(Component)]
pub struct EquipmentController {
    equipped: HashMap<EquipmentSlotType, Option<ItemRef>>,
    active_contexts: HashMap<EquipmentSlotType, EquipContext>,
    events: EquipmentEvents,
}

impl Default for EquipmentController {
    fn default() -> Self {
        let equipped = EquipmentSlotType::ALL
            .into_iter()
            .map(|slot| (slot, None))
            .collect();
        Self {
            equipped,
            active_contexts: HashMap::new(),
            events: EquipmentEvents::default(),
        }
    }
}

impl EquipmentController {
    pub fn get_equipped(&self, slot: EquipmentSlotType) -> Option<ItemRef> {
        self.equipped.get(&slot).cloned().flatten()
    }

    pub fn is_slot_occupied(&self, slot: EquipmentSlotType) -> bool {
        matches!(self.equipped.get(&slot), Some(Some(_)))
    }

    pub fn context(&self, slot: EquipmentSlotType) -> Option<&EquipContext> {
        self.active_contexts.get(&slot)
    }

    /// 返回槽位表的拷贝，调用方无法借此修改内部状态
    pub fn all_equipped(&self) -> HashMap<EquipmentSlotType, Option<ItemRef>> {
        self.equipped.clone()
    }

    /// 仅供视觉处理器回写生成的实例；槽位已清空时忽略（过期回调）
    pub fn set_spawned_instance(&mut self, slot: EquipmentSlotType, instance: Entity) {
        match self.active_contexts.get_mut(&slot) {
            Some(context) => context.spawned_instance = Some(instance),
            None => debug!("[EquipmentController] {slot} 没有活动上下文，忽略实例 {instance}"),
        }
    }

    pub fn spawned_instance(&self, slot: EquipmentSlotType) -> Option<Entity> {
        self.active_contexts
            .get(&slot)
            .and_then(|context| context.spawned_instance)
    }

    pub fn events(&self) -> &EquipmentEvents {
        &self.events
    }

    pub fn subscribe(
        &mut self,
        kind: EquipmentEventKind,
        listener: impl EquipmentListener,
    ) -> SubscriptionId {
        self.events.subscribe(kind, Arc::new(listener))
    }

    /// 同一个监听器订阅多种事件时使用
    pub fn subscribe_shared(
        &mut self,
        kind: EquipmentEventKind,
        listener: Arc<dyn EquipmentListener>,
    ) -> SubscriptionId {
        self.events.subscribe(kind, listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    pub fn listener_count(&self, kind: EquipmentEventKind) -> usize {
        self.events.listener_count(kind)
    }

    pub fn snapshot(&self) -> EquipmentSnapshot {
        let slots = EquipmentSlotType::ALL
            .into_iter()
            .map(|slot| {
                let entry = SlotSnapshot {
                    item: self.get_equipped(slot).map(|item| item.name().to_string()),
                    spawned_instance: self.spawned_instance(slot).map(|e| e.to_string()),
                };
                (slot.to_string(), entry)
            })
            .collect();
        EquipmentSnapshot { slots }
    }

    pub(crate) fn occupy(&mut self, item: ItemRef, context: EquipContext) {
        let slot = item.slot_type();
        self.equipped.insert(slot, Some(item));
        self.active_contexts.insert(slot, context);
    }

    /// 清空槽位并取出其上下文；槽位为空时返回 `None`
    pub(crate) fn vacate(
        &mut self,
        slot: EquipmentSlotType,
        equipper: Entity,
    ) -> Option<EquipContext> {
        let item = self.equipped.get_mut(&slot)?.take()?;
        let context = self
            .active_contexts
            .remove(&slot)
            .unwrap_or_else(|| EquipContext::new(item, equipper, Default::default()));
        Some(context)
    }
}

/// 调试输出用的只读视图
#[derive(Debug, Clone, Serialize)]
pub struct EquipmentSnapshot {
    pub slots: BTreeMap<String, SlotSnapshot>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SlotSnapshot {
    pub item: Option<String>,
    pub spawned_instance: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::schema::ItemDefinition;
    use crate::equipment::context::InstanceSource;

    fn sword() -> ItemRef {
        Arc::new(ItemDefinition::new("sword", EquipmentSlotType::PrimaryWeapon))
    }

    #[test]
    fn starts_with_every_valid_slot_empty() {
        let controller = EquipmentController::default();
        let all = controller.all_equipped();
        assert_eq!(all.len(), EquipmentSlotType::ALL.len());
        assert!(!all.contains_key(&EquipmentSlotType::None));
        assert!(all.values().all(Option::is_none));
    }

    #[test]
    fn all_equipped_is_a_copy() {
        let mut controller = EquipmentController::default();
        let item = sword();
        let context = EquipContext::new(item.clone(), Entity::PLACEHOLDER, InstanceSource::Spawn);
        controller.occupy(item, context);

        let mut copy = controller.all_equipped();
        copy.insert(EquipmentSlotType::PrimaryWeapon, None);

        assert!(controller.is_slot_occupied(EquipmentSlotType::PrimaryWeapon));
    }

    #[test]
    fn spawned_instance_ignored_without_context() {
        let mut world = World::new();
        let instance = world.spawn_empty().id();
        let mut controller = EquipmentController::default();

        controller.set_spawned_instance(EquipmentSlotType::Head, instance);

        assert!(controller.spawned_instance(EquipmentSlotType::Head).is_none());
        assert!(controller.context(EquipmentSlotType::Head).is_none());
    }

    #[test]
    fn vacate_returns_stored_context() {
        let mut world = World::new();
        let instance = world.spawn_empty().id();
        let mut controller = EquipmentController::default();
        let item = sword();
        controller.occupy(
            item.clone(),
            EquipContext::new(item, Entity::PLACEHOLDER, InstanceSource::Spawn),
        );
        controller.set_spawned_instance(EquipmentSlotType::PrimaryWeapon, instance);

        let context = controller
            .vacate(EquipmentSlotType::PrimaryWeapon, Entity::PLACEHOLDER)
            .unwrap();

        assert_eq!(context.spawned_instance, Some(instance));
        assert!(!controller.is_slot_occupied(EquipmentSlotType::PrimaryWeapon));
        assert!(controller.vacate(EquipmentSlotType::PrimaryWeapon, Entity::PLACEHOLDER).is_none());
    }

    #[test]
    fn parses_slot_names_from_cli() {
        assert_eq!(
            EquipmentSlotType::parse("primary_weapon"),
            Some(EquipmentSlotType::PrimaryWeapon)
        );
        assert_eq!(EquipmentSlotType::parse("HEAD"), Some(EquipmentSlotType::Head));
        assert_eq!(EquipmentSlotType::parse("none"), None);
    }

    #[test]
    fn snapshot_lists_occupant_names() {
        let mut controller = EquipmentController::default();
        let item = sword();
        controller.occupy(
            item.clone(),
            EquipContext::new(item, Entity::PLACEHOLDER, InstanceSource::Spawn),
        );

        let snapshot = controller.snapshot();
        assert_eq!(
            snapshot.slots["PrimaryWeapon"].item.as_deref(),
            Some("sword")
        );
        assert!(snapshot.slots["Head"].item.is_none());
    }
}
