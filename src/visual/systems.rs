use super::components::*;
use crate::data::schema::VisualTemplate;
use crate::equipment::events::{EquipmentEvent, EquipmentEventKind, EquipmentListener, SubscriptionId};
use crate::equipment::{EquipContext, EquipmentController, EquipmentSlotType, InstanceSource};
use crate::physics::{item_body, make_kinematic, release};
use crate::sockets::CharacterEquipmentSockets;
use crate::sockets::systems::world_transform;
use bevy::ecs::component::HookContext;
use bevy::ecs::world::DeferredWorld;
use bevy::prelude::*;
use std::sync::Arc;

/// 订阅到装备控制器上的监听器，实际配置读自 owner 上的 [`EquipmentVisualHandler`]
struct VisualAttachment;

impl EquipmentListener for VisualAttachment {
    fn on_event(&self, world: &mut World, owner: Entity, event: &EquipmentEvent) {
        if world.get::<EquipmentVisualHandler>(owner).is_none() {
            return;
        }

        match event {
            EquipmentEvent::ItemEquipped(context) => handle_equipped(world, owner, context),
            EquipmentEvent::ItemUnequipped(context) => handle_unequipped(world, context),
            EquipmentEvent::ItemDropped(context) => handle_dropped(world, owner, context),
            EquipmentEvent::SlotCleared(slot) => {
                debug!("[EquipmentVisualHandler] {slot} 已清空");
            }
        }
    }
}

/// 订阅 owner 的全部装备事件；已订阅时什么也不做
pub fn enable_visual_handler(world: &mut World, owner: Entity) -> bool {
    let Some(handler) = world.get::<EquipmentVisualHandler>(owner) else {
        warn!("[EquipmentVisualHandler] 实体 {owner} 没有视觉处理器");
        return false;
    };
    if handler.is_subscribed() {
        return true;
    }
    let needs_sockets = handler.sockets.is_none();

    if world.get::<EquipmentController>(owner).is_none() {
        warn!("[EquipmentVisualHandler] 实体 {owner} 没有装备控制器");
        return false;
    }

    let sockets = if needs_sockets {
        CharacterEquipmentSockets::get_from(world, owner)
    } else {
        None
    };

    let listener: Arc<dyn EquipmentListener> = Arc::new(VisualAttachment);
    let subscriptions: Vec<SubscriptionId> = match world.get_mut::<EquipmentController>(owner) {
        Some(mut controller) => EquipmentEventKind::ALL
            .into_iter()
            .map(|kind| controller.subscribe_shared(kind, listener.clone()))
            .collect(),
        None => return false,
    };

    if let Some(mut handler) = world.get_mut::<EquipmentVisualHandler>(owner) {
        if needs_sockets {
            if sockets.is_none() {
                warn!("[EquipmentVisualHandler] 实体 {owner} 附近暂时没有挂点表，装备时再查找");
            }
            handler.sockets = sockets;
        }
        handler.subscriptions = subscriptions;
        handler.enabled = true;
    }
    true
}

/// 取消全部订阅，与 [`enable_visual_handler`] 对称
pub fn disable_visual_handler(world: &mut World, owner: Entity) -> bool {
    let Some(mut handler) = world.get_mut::<EquipmentVisualHandler>(owner) else {
        return false;
    };
    handler.enabled = false;
    let subscriptions = std::mem::take(&mut handler.subscriptions);

    if let Some(mut controller) = world.get_mut::<EquipmentController>(owner) {
        for id in subscriptions {
            controller.unsubscribe(id);
        }
    }
    true
}

/// 处理器组件被移除、覆盖或随实体销毁时，撤掉它留在控制器上的订阅
pub(crate) fn release_subscriptions(mut world: DeferredWorld, context: HookContext) {
    let subscriptions = match world.get::<EquipmentVisualHandler>(context.entity) {
        Some(handler) if handler.is_subscribed() => handler.subscriptions.clone(),
        _ => return,
    };

    if let Some(mut controller) = world.get_mut::<EquipmentController>(context.entity) {
        for id in subscriptions {
            controller.unsubscribe(id);
        }
    }
}

/// 根据 `enabled` 标志补齐订阅 / 取消订阅；启用失败时清掉标志，不再每帧重试
pub fn sync_visual_handlers(world: &mut World) {
    let mut handlers = world.query::<(Entity, &EquipmentVisualHandler)>();
    let pending: Vec<(Entity, bool)> = handlers
        .iter(world)
        .filter(|(_, handler)| handler.enabled != handler.is_subscribed())
        .map(|(owner, handler)| (owner, handler.enabled))
        .collect();

    for (owner, enabled) in pending {
        if !enabled {
            disable_visual_handler(world, owner);
        } else if !enable_visual_handler(world, owner) {
            if let Some(mut handler) = world.get_mut::<EquipmentVisualHandler>(owner) {
                handler.enabled = false;
            }
        }
    }
}

/// 按模板生成视觉实体
pub fn instantiate(world: &mut World, template: &VisualTemplate) -> Entity {
    let mut entity = world.spawn((
        Name::new(template.name.clone()),
        Transform::from_scale(Vec3::splat(template.scale)),
        Visibility::default(),
    ));
    if template.rigid_body {
        entity.insert(item_body(template.mass));
    }
    entity.id()
}

pub fn spawned_instance(world: &World, owner: Entity, slot: EquipmentSlotType) -> Option<Entity> {
    world
        .get::<EquipmentController>(owner)?
        .spawned_instance(slot)
}

/// 挂点表所在实体；启用时没找到的话在这里补查并记住
fn socket_holder(world: &mut World, owner: Entity) -> Option<Entity> {
    let handler = world.get::<EquipmentVisualHandler>(owner)?;
    if let Some(holder) = handler.sockets {
        return Some(holder);
    }

    let Some(holder) = CharacterEquipmentSockets::get_from(world, owner) else {
        debug!("[EquipmentVisualHandler] 没有分配挂点表");
        return None;
    };
    if let Some(mut handler) = world.get_mut::<EquipmentVisualHandler>(owner) {
        handler.sockets = Some(holder);
    }
    Some(holder)
}

/// 槽位 → 映射表 → 挂点表 → 挂点实体
fn resolve_socket(world: &mut World, owner: Entity, slot: EquipmentSlotType) -> Option<Entity> {
    let holder = socket_holder(world, owner)?;

    let Some(socket_type) = world
        .get::<EquipmentVisualHandler>(owner)?
        .mappings
        .socket_for(slot)
    else {
        warn!("[EquipmentVisualHandler] {slot} 没有挂点映射");
        return None;
    };

    world
        .get::<CharacterEquipmentSockets>(holder)?
        .get_socket(socket_type)
}

fn handle_equipped(world: &mut World, owner: Entity, context: &EquipContext) {
    let template = context.item.prefab();
    if template.is_none() && !context.has_existing_instance() {
        return;
    }

    let slot = context.slot_type();
    let instance = match (context.source, template) {
        (InstanceSource::Adopt(existing), _) => {
            if !world.entities().contains(existing) {
                warn!("[EquipmentVisualHandler] 要接管的实例 {existing} 已不存在");
                return;
            }
            existing
        }
        (InstanceSource::Spawn, Some(template)) => instantiate(world, template),
        (InstanceSource::Spawn, None) => return,
    };

    // 挂在角色身上的实例跟随骨骼移动，不参与模拟
    make_kinematic(world, instance);

    match resolve_socket(world, owner, slot) {
        Some(socket) => {
            let (translation, rotation) = world
                .get::<EquipmentVisualHandler>(owner)
                .map_or((Vec3::ZERO, Quat::IDENTITY), |handler| {
                    handler.mappings.local_offset(slot)
                });
            let scale = world
                .get::<Transform>(instance)
                .map_or(Vec3::ONE, |transform| transform.scale);
            world.entity_mut(instance).insert((
                ChildOf(socket),
                Transform {
                    translation,
                    rotation,
                    scale,
                },
            ));
        }
        None => {
            warn!("[EquipmentVisualHandler] {slot} 没有可用挂点，实例 {instance} 保持未挂接");
        }
    }

    if let Some(mut controller) = world.get_mut::<EquipmentController>(owner) {
        controller.set_spawned_instance(slot, instance);
    }
}

/// 卸下即回到背包，视觉实例直接销毁
fn handle_unequipped(world: &mut World, context: &EquipContext) {
    let Some(instance) = context.spawned_instance else {
        return;
    };
    if world.entities().contains(instance) {
        world.despawn(instance);
    }
}

fn handle_dropped(world: &mut World, owner: Entity, context: &EquipContext) {
    let Some(instance) = context.spawned_instance else {
        return;
    };
    if !world.entities().contains(instance) {
        warn!("[EquipmentVisualHandler] 要丢弃的实例 {instance} 已不存在");
        return;
    }

    // 脱离角色层级，保持当前世界位置
    let pose = world_transform(world, instance);
    world.entity_mut(instance).remove::<ChildOf>().insert(pose);

    let (add_body, drop_force) = world
        .get::<EquipmentVisualHandler>(owner)
        .map_or((false, 0.0), |handler| {
            (handler.add_rigid_body_on_drop, handler.drop_force)
        });
    if add_body {
        release(world, instance, context.drop_direction() * drop_force);
    }
}
