use super::components::*;
use bevy::prelude::*;
use std::collections::VecDeque;

/// 直接子实体，按层级顺序
pub(crate) fn children_of(world: &World, entity: Entity) -> Vec<Entity> {
    world
        .get::<Children>(entity)
        .map(|children| children.to_vec())
        .unwrap_or_default()
}

pub(crate) fn parent_of(world: &World, entity: Entity) -> Option<Entity> {
    world.get::<ChildOf>(entity).map(|child_of| child_of.parent())
}

/// 层级中最顶层的祖先（自身没有父级时返回自身）
pub(crate) fn root_of(world: &World, entity: Entity) -> Entity {
    let mut current = entity;
    while let Some(parent) = parent_of(world, current) {
        current = parent;
    }
    current
}

/// 沿祖先链合成的世界变换，不依赖变换传播系统
pub fn world_transform(world: &World, entity: Entity) -> Transform {
    let mut transform = world.get::<Transform>(entity).copied().unwrap_or_default();
    let mut current = entity;
    while let Some(parent) = parent_of(world, current) {
        if let Some(parent_transform) = world.get::<Transform>(parent) {
            transform = parent_transform.mul_transform(transform);
        }
        current = parent;
    }
    transform
}

/// 深度优先收集所有后代，包括隐藏的实体
fn descendants_of(world: &World, root: Entity) -> Vec<Entity> {
    let mut found = Vec::new();
    let mut stack: Vec<Entity> = children_of(world, root).into_iter().rev().collect();
    while let Some(entity) = stack.pop() {
        found.push(entity);
        stack.extend(children_of(world, entity).into_iter().rev());
    }
    found
}

/// 清空并重新扫描 `holder` 下所有挂点，返回注册成功的数量
pub fn find_all_sockets(world: &mut World, holder: Entity) -> usize {
    let found: Vec<(Entity, EquipmentSocketType)> = descendants_of(world, holder)
        .into_iter()
        .filter_map(|entity| {
            world
                .get::<EquipmentSocket>(entity)
                .map(|socket| (entity, socket.socket_type))
        })
        .collect();

    let Some(mut sockets) = world.get_mut::<CharacterEquipmentSockets>(holder) else {
        warn!("[CharacterEquipmentSockets] 实体 {holder} 没有挂点表");
        return 0;
    };

    sockets.clear();
    for (anchor, socket_type) in found {
        sockets.register(socket_type, anchor);
    }

    let total = sockets.len();
    info!("[CharacterEquipmentSockets] 共找到 {total} 个挂点 ({holder})");
    total
}

/// 为 `holder` 安装挂点表：插入组件、扫描挂点，并登记到所属角色的索引
pub fn install_socket_registry(world: &mut World, holder: Entity) -> usize {
    if world.get::<CharacterEquipmentSockets>(holder).is_none() {
        world
            .entity_mut(holder)
            .insert(CharacterEquipmentSockets::default());
    }

    let character = root_of(world, holder);
    world
        .get_resource_or_insert_with(SocketRegistryIndex::default)
        .insert(character, holder);

    find_all_sockets(world, holder)
}

impl CharacterEquipmentSockets {
    /// 从任意实体出发找到所属角色的挂点表所在实体
    ///
    /// 依次查找：索引缓存、自身、祖先、后代。
    pub fn get_from(world: &World, target: Entity) -> Option<Entity> {
        if !world.entities().contains(target) {
            return None;
        }

        let has_registry = |entity: Entity| world.get::<CharacterEquipmentSockets>(entity).is_some();

        if let Some(holder) = world
            .get_resource::<SocketRegistryIndex>()
            .and_then(|index| index.get(target))
            .filter(|holder| has_registry(*holder))
        {
            return Some(holder);
        }

        if has_registry(target) {
            return Some(target);
        }

        let mut current = target;
        while let Some(parent) = parent_of(world, current) {
            if has_registry(parent) {
                return Some(parent);
            }
            current = parent;
        }

        let mut queue: VecDeque<Entity> = children_of(world, target).into();
        while let Some(entity) = queue.pop_front() {
            if has_registry(entity) {
                return Some(entity);
            }
            queue.extend(children_of(world, entity));
        }

        None
    }
}

/// 挂点表被移除（包括角色销毁）后清理索引
pub fn prune_socket_index(
    mut removed: RemovedComponents<CharacterEquipmentSockets>,
    mut index: Option<ResMut<SocketRegistryIndex>>,
) {
    for holder in removed.read() {
        if let Some(index) = index.as_mut() {
            index.forget_holder(holder);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Rig {
        character: Entity,
        hand: Entity,
        spine: Entity,
        duplicate_hand: Entity,
    }

    fn spawn_rig(world: &mut World) -> Rig {
        let character = world.spawn(Transform::default()).id();
        let spine = world
            .spawn((
                Transform::default(),
                EquipmentSocket::new(EquipmentSocketType::Back),
                ChildOf(character),
            ))
            .id();
        let hand = world
            .spawn((
                Transform::default(),
                EquipmentSocket::new(EquipmentSocketType::RightHand),
                ChildOf(spine),
            ))
            .id();
        let duplicate_hand = world
            .spawn((
                Transform::default(),
                Visibility::Hidden,
                EquipmentSocket::new(EquipmentSocketType::RightHand),
                ChildOf(character),
            ))
            .id();
        world.spawn((
            Transform::default(),
            EquipmentSocket::new(EquipmentSocketType::None),
            ChildOf(character),
        ));
        Rig {
            character,
            hand,
            spine,
            duplicate_hand,
        }
    }

    #[test]
    fn scan_registers_nested_sockets_first_wins() {
        let mut world = World::new();
        let rig = spawn_rig(&mut world);

        let total = install_socket_registry(&mut world, rig.character);

        assert_eq!(total, 2);
        let sockets = world
            .get::<CharacterEquipmentSockets>(rig.character)
            .unwrap();
        assert!(sockets.has_socket(EquipmentSocketType::RightHand));
        assert_eq!(sockets.get_socket(EquipmentSocketType::RightHand), Some(rig.hand));
        assert_ne!(
            sockets.get_socket(EquipmentSocketType::RightHand),
            Some(rig.duplicate_hand)
        );
        assert_eq!(sockets.get_socket(EquipmentSocketType::Back), Some(rig.spine));
        assert!(!sockets.has_socket(EquipmentSocketType::None));
    }

    #[test]
    fn rescan_clears_stale_sockets() {
        let mut world = World::new();
        let rig = spawn_rig(&mut world);
        install_socket_registry(&mut world, rig.character);

        world.despawn(rig.spine);
        let total = find_all_sockets(&mut world, rig.character);

        assert_eq!(total, 1);
        let sockets = world
            .get::<CharacterEquipmentSockets>(rig.character)
            .unwrap();
        assert_eq!(
            sockets.get_socket(EquipmentSocketType::RightHand),
            Some(rig.duplicate_hand)
        );
        assert!(!sockets.has_socket(EquipmentSocketType::Back));
    }

    #[test]
    fn world_transform_composes_ancestors() {
        let mut world = World::new();
        let root = world
            .spawn(Transform::from_xyz(10.0, 0.0, 0.0).with_scale(Vec3::splat(2.0)))
            .id();
        let child = world
            .spawn((Transform::from_xyz(1.0, 2.0, 0.0), ChildOf(root)))
            .id();
        let bare = world.spawn(ChildOf(child)).id();

        let world_pose = world_transform(&world, bare);
        assert!(world_pose.translation.abs_diff_eq(Vec3::new(12.0, 4.0, 0.0), 1e-5));
        assert_eq!(world_pose.scale, Vec3::splat(2.0));
    }

    #[test]
    fn get_from_walks_up_and_down() {
        let mut world = World::new();
        let rig = spawn_rig(&mut world);
        install_socket_registry(&mut world, rig.character);

        assert_eq!(
            CharacterEquipmentSockets::get_from(&world, rig.character),
            Some(rig.character)
        );
        assert_eq!(
            CharacterEquipmentSockets::get_from(&world, rig.hand),
            Some(rig.character)
        );

        let stranger = world.spawn_empty().id();
        assert_eq!(CharacterEquipmentSockets::get_from(&world, stranger), None);
    }

    #[test]
    fn get_from_finds_registry_on_descendant() {
        let mut world = World::new();
        let character = world.spawn(Transform::default()).id();
        let armature = world
            .spawn((Transform::default(), ChildOf(character)))
            .id();
        world
            .entity_mut(armature)
            .insert(CharacterEquipmentSockets::default());

        assert_eq!(
            CharacterEquipmentSockets::get_from(&world, character),
            Some(armature)
        );
    }

    #[test]
    fn index_maps_character_to_nested_holder() {
        let mut world = World::new();
        let character = world.spawn(Transform::default()).id();
        let armature = world
            .spawn((Transform::default(), ChildOf(character)))
            .id();

        install_socket_registry(&mut world, armature);

        let index = world.resource::<SocketRegistryIndex>();
        assert_eq!(index.get(character), Some(armature));
        assert_eq!(
            CharacterEquipmentSockets::get_from(&world, character),
            Some(armature)
        );
    }

    #[test]
    fn despawned_character_leaves_index() {
        let mut app = App::new();
        app.init_resource::<SocketRegistryIndex>()
            .add_systems(Update, prune_socket_index);
        let rig = spawn_rig(app.world_mut());
        install_socket_registry(app.world_mut(), rig.character);
        assert_eq!(app.world().resource::<SocketRegistryIndex>().len(), 1);

        app.world_mut().despawn(rig.character);
        app.update();

        assert!(app.world().resource::<SocketRegistryIndex>().is_empty());
    }
}
