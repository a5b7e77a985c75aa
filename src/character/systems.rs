use super::{components::*, events::*};
use crate::core::events::LogEvent;
use crate::core::resources::EquipmentSettings;
use crate::data::ItemCatalog;
use crate::equipment::{EquipmentController, ItemRef};
use crate::pickup::{spawn_world_item, Interactor};
use crate::sockets::components::SocketRegistryIndex;
use crate::sockets::{install_socket_registry, CharacterEquipmentSockets, EquipmentSocket};
use crate::visual::{enable_visual_handler, EquipmentVisualHandler};
use bevy::prelude::*;
use std::collections::HashMap;

/// 地上物品围绕角色摆放的半径
const ITEM_RING_RADIUS: f32 = 1.5;

/// 生成一个带骨架、挂点表、装备控制器和视觉处理器的角色
///
/// 挂点表放在 `Armature` 子实体上，角色根实体通过索引找到它。
pub fn spawn_character(world: &mut World, name: &str, position: Vec3) -> Entity {
    let character = world
        .spawn((
            Name::new(name.to_string()),
            Transform::from_translation(position),
            Visibility::default(),
            EquipmentController::default(),
            Interactor::default(),
        ))
        .id();
    let armature = world
        .spawn((
            Name::new("Armature"),
            Transform::default(),
            Visibility::default(),
            ChildOf(character),
        ))
        .id();

    let mut bones: HashMap<&str, Entity> = HashMap::new();
    for bone in DEMO_SKELETON {
        let parent = bone
            .parent
            .and_then(|parent| bones.get(parent).copied())
            .unwrap_or(armature);
        let mut entity = world.spawn((
            Name::new(bone.name),
            Transform::from_translation(bone.offset),
            Visibility::default(),
            ChildOf(parent),
        ));
        if let Some(socket) = bone.socket {
            entity.insert(EquipmentSocket::new(socket));
        }
        bones.insert(bone.name, entity.id());
    }

    install_socket_registry(world, armature);

    let handler = world
        .get_resource::<EquipmentSettings>()
        .map(EquipmentVisualHandler::from_settings)
        .unwrap_or_default();
    world.entity_mut(character).insert(handler);
    enable_visual_handler(world, character);

    character
}

/// 初始化玩家实体
pub fn spawn_player(world: &mut World) {
    let player = spawn_character(world, "Player", Vec3::ZERO);
    world.entity_mut(player).insert(Player);
    info!("✔ Player spawned: {player}");
}

/// 把物品表里的每件物品放到玩家周围
pub fn spawn_world_items(world: &mut World) {
    let items: Vec<ItemRef> = world
        .get_resource::<ItemCatalog>()
        .map(|catalog| catalog.iter().map(|(_, item)| item.clone()).collect())
        .unwrap_or_default();

    let count = items.len();
    for (i, item) in items.into_iter().enumerate() {
        let angle = std::f32::consts::TAU * i as f32 / count as f32;
        let position = Vec3::new(angle.sin(), 0.0, -angle.cos()) * ITEM_RING_RADIUS;
        spawn_world_item(world, item, position);
    }
    info!("✔ World items spawned: {count}");
}

/// 显示装备状态
pub fn show_equipment(
    mut ev_show: EventReader<ShowEquipment>,
    mut ev_log: EventWriter<LogEvent>,
    controllers: Query<&EquipmentController>,
    player_query: Query<&EquipmentController, With<Player>>,
) {
    for ev in ev_show.read() {
        let controller = if let Some(entity) = ev.entity {
            controllers.get(entity).ok()
        } else {
            player_query.single().ok()
        };

        let Some(controller) = controller else {
            ev_log.write(LogEvent("未找到装备控制器".to_string()));
            continue;
        };

        let message = match serde_json::to_string_pretty(&controller.snapshot()) {
            Ok(json) => json,
            Err(err) => format!("装备状态序列化失败: {err}"),
        };
        ev_log.write(LogEvent(message));
    }
}

/// 显示挂点表
pub fn show_sockets(
    mut ev_show: EventReader<ShowSockets>,
    mut ev_log: EventWriter<LogEvent>,
    index: Option<Res<SocketRegistryIndex>>,
    registries: Query<&CharacterEquipmentSockets>,
    names: Query<&Name>,
    player_query: Query<Entity, With<Player>>,
) {
    for ev in ev_show.read() {
        let Some(target) = ev.entity.or_else(|| player_query.single().ok()) else {
            ev_log.write(LogEvent("未找到角色".to_string()));
            continue;
        };
        let holder = index
            .as_ref()
            .and_then(|index| index.get(target))
            .unwrap_or(target);

        let Ok(sockets) = registries.get(holder) else {
            ev_log.write(LogEvent("未找到挂点表".to_string()));
            continue;
        };

        let mut lines: Vec<String> = sockets
            .all_sockets()
            .iter()
            .map(|(socket_type, anchor)| {
                let bone = names
                    .get(*anchor)
                    .map_or_else(|_| anchor.to_string(), |name| name.to_string());
                format!("  {socket_type} -> {bone}")
            })
            .collect();
        lines.sort();

        ev_log.write(LogEvent(format!(
            "=== 挂点 ({}) ===\n{}",
            sockets.len(),
            lines.join("\n")
        )));
    }
}
