use super::{components::*, context::*, events::*};
use crate::core::events::LogEvent;
use crate::sockets::systems::world_transform;
use bevy::prelude::*;

/// 在 `World` 上对某个角色的装备状态机执行状态迁移
pub trait EquipmentWorldExt {
    fn equipment(&mut self, owner: Entity) -> EquipmentMut<'_>;
}

impl EquipmentWorldExt for World {
    fn equipment(&mut self, owner: Entity) -> EquipmentMut<'_> {
        EquipmentMut { world: self, owner }
    }
}

/// 装备控制器的可变访问入口
///
/// 所有迁移都在调用帧内同步完成：先修改槽位表，再按固定顺序广播事件，
/// 监听器全部返回后调用才结束。失败只返回 `false` 并记录日志。
pub struct EquipmentMut<'w> {
    world: &'w mut World,
    owner: Entity,
}

impl EquipmentMut<'_> {
    pub fn controller(&self) -> Option<&EquipmentController> {
        self.world.get::<EquipmentController>(self.owner)
    }

    pub fn get_equipped(&self, slot: EquipmentSlotType) -> Option<ItemRef> {
        self.controller()?.get_equipped(slot)
    }

    pub fn is_slot_occupied(&self, slot: EquipmentSlotType) -> bool {
        self.controller()
            .is_some_and(|controller| controller.is_slot_occupied(slot))
    }

    pub fn spawned_instance(&self, slot: EquipmentSlotType) -> Option<Entity> {
        self.controller()?.spawned_instance(slot)
    }

    /// 装备物品；目标槽位已被占用时先走丢弃流程，旧物品不会被静默销毁
    pub fn equip(
        &mut self,
        item: impl Into<Option<ItemRef>>,
        character: Entity,
        source: InstanceSource,
    ) -> bool {
        let Some(item) = item.into() else {
            warn!("[EquipmentController] 无法装备空物品");
            return false;
        };

        let slot = item.slot_type();
        if slot.is_none() {
            warn!("[EquipmentController] {} 的槽位类型为 None", item.name());
            return false;
        }

        let Some(occupied) = self.controller().map(|c| c.is_slot_occupied(slot)) else {
            warn!("[EquipmentController] 实体 {} 没有装备控制器", self.owner);
            return false;
        };

        if occupied {
            self.drop_item(slot, character);
        }

        let context = EquipContext::new(item.clone(), character, source);
        if let Some(mut controller) = self.world.get_mut::<EquipmentController>(self.owner) {
            controller.occupy(item, context.clone());
        }

        broadcast(self.world, self.owner, EquipmentEvent::ItemEquipped(context));

        info!("[EquipmentController] 已装备到 {slot}");
        true
    }

    /// 卸下到（抽象的）背包，视觉实例由监听器销毁
    pub fn unequip(&mut self, slot: EquipmentSlotType, character: Entity) -> bool {
        let Some(context) = self.take_slot(slot, character) else {
            return false;
        };

        broadcast(self.world, self.owner, EquipmentEvent::ItemUnequipped(context));
        broadcast(self.world, self.owner, EquipmentEvent::SlotCleared(slot));

        info!("[EquipmentController] 已从 {slot} 卸下");
        true
    }

    /// 丢到世界中，视觉实例由监听器交给物理
    pub fn drop_item(&mut self, slot: EquipmentSlotType, character: Entity) -> bool {
        let Some(mut context) = self.take_slot(slot, character) else {
            return false;
        };

        context.drop_pose = Some(drop_pose_of(self.world, character));

        broadcast(self.world, self.owner, EquipmentEvent::ItemDropped(context));
        broadcast(self.world, self.owner, EquipmentEvent::SlotCleared(slot));

        info!("[EquipmentController] 已从 {slot} 丢弃");
        true
    }

    fn take_slot(&mut self, slot: EquipmentSlotType, character: Entity) -> Option<EquipContext> {
        let Some(mut controller) = self.world.get_mut::<EquipmentController>(self.owner) else {
            warn!("[EquipmentController] 实体 {} 没有装备控制器", self.owner);
            return None;
        };

        if !controller.is_slot_occupied(slot) {
            warn!("[EquipmentController] {slot} 槽位为空");
            return None;
        }

        controller.vacate(slot, character)
    }
}

/// 按注册顺序同步通知监听器
fn broadcast(world: &mut World, owner: Entity, event: EquipmentEvent) {
    let listeners = match world.get::<EquipmentController>(owner) {
        Some(controller) => controller.events().listeners_for(event.kind()),
        None => return,
    };

    for listener in listeners {
        listener.on_event(world, owner, &event);
    }
}

/// 角色的世界位置与朝向；角色可能挂在载具或其它实体下面
fn drop_pose_of(world: &World, character: Entity) -> DropPose {
    if world.get::<Transform>(character).is_none() {
        warn!("[EquipmentController] 角色 {character} 没有 Transform，使用默认丢弃位置");
        return DropPose::default();
    }

    let transform = world_transform(world, character);
    DropPose {
        position: transform.translation,
        direction: transform.forward().as_vec3(),
    }
}

/// 处理本帧积压的装备请求
pub fn process_equipment_requests(world: &mut World) {
    let equips = drain_events::<EquipRequest>(world);
    for request in equips {
        let name = request.item.name().to_string();
        let ok = world
            .equipment(request.owner)
            .equip(request.item, request.owner, request.source);
        let message = if ok {
            format!("已装备 {name}")
        } else {
            format!("无法装备 {name}")
        };
        world.send_event(LogEvent(message));
    }

    let unequips = drain_events::<UnequipRequest>(world);
    for request in unequips {
        let ok = world
            .equipment(request.owner)
            .unequip(request.slot, request.owner);
        let message = if ok {
            format!("已卸下 {}", request.slot)
        } else {
            format!("{} 槽位为空", request.slot)
        };
        world.send_event(LogEvent(message));
    }

    let drops = drain_events::<DropRequest>(world);
    for request in drops {
        let ok = world
            .equipment(request.owner)
            .drop_item(request.slot, request.owner);
        let message = if ok {
            format!("已丢弃 {}", request.slot)
        } else {
            format!("{} 槽位为空", request.slot)
        };
        world.send_event(LogEvent(message));
    }
}

fn drain_events<E: Event>(world: &mut World) -> Vec<E> {
    world
        .get_resource_mut::<Events<E>>()
        .map(|mut events| events.drain().collect())
        .unwrap_or_default()
}
