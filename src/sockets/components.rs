use bevy::prelude::*;
use serde_derive::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// 角色身上的挂点类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EquipmentSocketType {
    #[default]
    None,

    // 武器
    RightHand,
    LeftHand,
    Back,
    Hip,

    // 护甲 / 服装
    Head,
    Face,
    Chest,
    Backpack,

    // 其他
    LeftShoulder,
    RightShoulder,
    Belt,
}

impl fmt::Display for EquipmentSocketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// 单个挂点，放在角色层级中的空实体上
#[derive(Component, Debug, Clone, Copy)]
pub struct EquipmentSocket {
    pub socket_type: EquipmentSocketType,
}

impl EquipmentSocket {
    pub fn new(socket_type: EquipmentSocketType) -> Self {
        Self { socket_type }
    }
}

/// 角色的挂点表，挂在角色根实体上
#[derive(Component, Debug, Default)]
pub struct CharacterEquipmentSockets {
    sockets: HashMap<EquipmentSocketType, Entity>,
}

impl CharacterEquipmentSockets {
    /// 获取挂点实体，找不到时记录警告
    pub fn get_socket(&self, socket_type: EquipmentSocketType) -> Option<Entity> {
        let socket = self.sockets.get(&socket_type).copied();
        if socket.is_none() {
            warn!("[CharacterEquipmentSockets] 未找到挂点: {socket_type}");
        }
        socket
    }

    pub fn has_socket(&self, socket_type: EquipmentSocketType) -> bool {
        self.sockets.contains_key(&socket_type)
    }

    pub fn all_sockets(&self) -> &HashMap<EquipmentSocketType, Entity> {
        &self.sockets
    }

    pub fn len(&self) -> usize {
        self.sockets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sockets.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.sockets.clear();
    }

    /// 注册挂点：`None` 直接跳过，重复类型保留先注册的那个
    pub(crate) fn register(&mut self, socket_type: EquipmentSocketType, anchor: Entity) -> bool {
        if socket_type == EquipmentSocketType::None {
            return false;
        }

        if let Some(existing) = self.sockets.get(&socket_type) {
            warn!(
                "[CharacterEquipmentSockets] 重复的挂点类型: {socket_type}（保留 {existing}，忽略 {anchor}）"
            );
            return false;
        }

        self.sockets.insert(socket_type, anchor);
        debug!("[CharacterEquipmentSockets] 找到挂点: {socket_type} -> {anchor}");
        true
    }
}

/// 角色 → 挂点表所在实体的索引
///
/// 作为 `World` 资源存在（每个会话一份），挂点表安装时写入，
/// 组件被移除或角色销毁时由 [`prune_socket_index`](super::systems::prune_socket_index) 清理。
#[derive(Resource, Debug, Default)]
pub struct SocketRegistryIndex {
    by_character: HashMap<Entity, Entity>,
}

impl SocketRegistryIndex {
    pub fn insert(&mut self, character: Entity, holder: Entity) {
        self.by_character.insert(character, holder);
    }

    pub fn get(&self, character: Entity) -> Option<Entity> {
        self.by_character.get(&character).copied()
    }

    /// 移除所有指向 `holder` 或以它为键的条目
    pub fn forget_holder(&mut self, holder: Entity) {
        self.by_character
            .retain(|character, registry| *character != holder && *registry != holder);
    }

    pub fn len(&self) -> usize {
        self.by_character.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_character.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_registration_wins() {
        let mut world = World::new();
        let first = world.spawn_empty().id();
        let second = world.spawn_empty().id();
        let mut sockets = CharacterEquipmentSockets::default();

        assert!(sockets.register(EquipmentSocketType::RightHand, first));
        assert!(!sockets.register(EquipmentSocketType::RightHand, second));

        assert!(sockets.has_socket(EquipmentSocketType::RightHand));
        assert_eq!(sockets.get_socket(EquipmentSocketType::RightHand), Some(first));
        assert_eq!(sockets.len(), 1);
    }

    #[test]
    fn none_is_never_registered() {
        let mut world = World::new();
        let anchor = world.spawn_empty().id();
        let mut sockets = CharacterEquipmentSockets::default();

        assert!(!sockets.register(EquipmentSocketType::None, anchor));
        assert!(!sockets.has_socket(EquipmentSocketType::None));
        assert!(sockets.is_empty());
    }

    #[test]
    fn index_forgets_removed_holders() {
        let mut world = World::new();
        let hero = world.spawn_empty().id();
        let rig = world.spawn_empty().id();
        let other = world.spawn_empty().id();
        let mut index = SocketRegistryIndex::default();
        index.insert(hero, rig);
        index.insert(other, other);

        index.forget_holder(rig);

        assert!(index.get(hero).is_none());
        assert_eq!(index.get(other), Some(other));
    }
}
