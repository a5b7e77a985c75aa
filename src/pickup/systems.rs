use super::components::*;
use crate::core::events::LogEvent;
use crate::equipment::events::{EquipmentEvent, EquipmentEventKind};
use crate::equipment::{EquipmentController, EquipmentWorldExt, InstanceSource, ItemRef};
use crate::physics::make_kinematic;
use crate::visual::systems::instantiate;
use bevy::ecs::component::HookContext;
use bevy::ecs::world::DeferredWorld;
use bevy::prelude::*;

/// 在地上放一个可拾取的物品；有视觉模板时按模板生成
pub fn spawn_world_item(world: &mut World, item: ItemRef, position: Vec3) -> Entity {
    let entity = match item.prefab() {
        Some(template) => instantiate(world, template),
        None => world
            .spawn((Name::new(item.name().to_string()), Transform::default(), Visibility::default()))
            .id(),
    };

    let mut entity = world.entity_mut(entity);
    if let Some(mut transform) = entity.get_mut::<Transform>() {
        transform.translation = position;
    }
    entity.insert((WorldItem { definition: item }, PickupCollider::default()));
    entity.id()
}

/// `interactor` 拾取并装备 `item`，直接接管地上的实例
pub fn interact(world: &mut World, item: Entity, interactor: Entity) -> bool {
    let Some(definition) = world.get::<WorldItem>(item).map(|w| w.definition.clone()) else {
        warn!("[Pickup] 实体 {item} 不是可拾取物品");
        return false;
    };

    if world
        .get::<PickupCollider>(item)
        .is_some_and(|collider| !collider.enabled)
    {
        debug!("[Pickup] {} 当前不可拾取", definition.name());
        return false;
    }

    if !world
        .equipment(interactor)
        .equip(definition, interactor, InstanceSource::Adopt(item))
    {
        return false;
    }

    make_kinematic(world, item);
    if let Some(mut collider) = world.get_mut::<PickupCollider>(item) {
        collider.enabled = false;
    }

    ensure_drop_listener(world, interactor);
    true
}

/// 拾取半径内最近的、可拾取的物品，返回被拾取的实体
pub fn try_pickup(world: &mut World, interactor: Entity) -> Option<Entity> {
    let origin = world.get::<Transform>(interactor)?.translation;
    let radius = world
        .get::<Interactor>(interactor)
        .map_or(Interactor::default().radius, |i| i.radius);

    let mut candidates = world
        .query_filtered::<(Entity, &Transform, &PickupCollider), (With<WorldItem>, Without<ChildOf>)>();
    let nearest = candidates
        .iter(world)
        .filter(|(_, _, collider)| collider.enabled)
        .map(|(entity, transform, _)| (entity, transform.translation.distance(origin)))
        .filter(|(_, distance)| *distance <= radius)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(entity, _)| entity)?;

    interact(world, nearest, interactor).then_some(nearest)
}

/// 按物品名称（忽略大小写）拾取，不受拾取半径限制
pub fn pickup_named(world: &mut World, interactor: Entity, name: &str) -> Option<Entity> {
    let mut candidates = world.query_filtered::<(Entity, &WorldItem, &PickupCollider), Without<ChildOf>>();
    let target = candidates
        .iter(world)
        .find(|(_, item, collider)| {
            collider.enabled && item.definition.name().eq_ignore_ascii_case(name)
        })
        .map(|(entity, _, _)| entity)?;

    interact(world, target, interactor).then_some(target)
}

/// 丢弃的实例若是地上物品，重新打开拾取判定
fn restore_collider(world: &mut World, _owner: Entity, event: &EquipmentEvent) {
    let Some(instance) = event.context().and_then(|context| context.spawned_instance) else {
        return;
    };
    if let Some(mut collider) = world.get_mut::<PickupCollider>(instance) {
        collider.enabled = true;
        debug!("[Pickup] {instance} 重新可拾取");
    }
}

fn ensure_drop_listener(world: &mut World, owner: Entity) {
    if world.get::<PickupListener>(owner).is_some() {
        return;
    }
    let Some(mut controller) = world.get_mut::<EquipmentController>(owner) else {
        return;
    };
    let subscription = controller.subscribe(EquipmentEventKind::ItemDropped, restore_collider);
    world
        .entity_mut(owner)
        .insert(PickupListener { subscription });
}

pub(crate) fn release_drop_listener(mut world: DeferredWorld, context: HookContext) {
    let Some(subscription) = world
        .get::<PickupListener>(context.entity)
        .map(|listener| listener.subscription)
    else {
        return;
    };
    if let Some(mut controller) = world.get_mut::<EquipmentController>(context.entity) {
        controller.unsubscribe(subscription);
    }
}

/// 处理本帧积压的拾取请求
pub fn process_pickup_requests(world: &mut World) {
    let requests: Vec<PickupRequest> = world
        .get_resource_mut::<Events<PickupRequest>>()
        .map(|mut events| events.drain().collect())
        .unwrap_or_default();

    for request in requests {
        let picked = match &request.name {
            Some(name) => pickup_named(world, request.interactor, name),
            None => try_pickup(world, request.interactor),
        };
        let message = match picked {
            Some(item) => {
                let name = world
                    .get::<WorldItem>(item)
                    .map_or_else(|| item.to_string(), |w| w.definition.name().to_string());
                format!("已拾取 {name}")
            }
            None => "附近没有可拾取的物品".to_string(),
        };
        world.send_event(LogEvent(message));
    }
}
