use bevy::prelude::*;
use std::fmt::Debug;
use std::sync::Arc;

use super::components::EquipmentSlotType;
use crate::data::schema::VisualTemplate;

/// 可装备物品需要实现的接口
///
/// 装备系统只读取槽位类型与视觉模板，物品数据本身视为不可变。
pub trait Equippable: Debug + Send + Sync + 'static {
    fn slot_type(&self) -> EquipmentSlotType;

    /// 没有现成实例时用来生成视觉实体的模板
    fn prefab(&self) -> Option<&VisualTemplate>;

    /// 仅用于日志与调试输出
    fn name(&self) -> &str {
        "unnamed"
    }
}

pub type ItemRef = Arc<dyn Equippable>;

/// 装备时视觉实例的来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InstanceSource {
    /// 按物品模板生成新实体
    #[default]
    Spawn,
    /// 直接接管一个已存在的实体（地面拾取）
    Adopt(Entity),
}

/// 丢弃瞬间角色的位置与朝向
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropPose {
    pub position: Vec3,
    pub direction: Vec3,
}

impl Default for DropPose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            direction: Vec3::NEG_Z,
        }
    }
}

/// 一次装备 / 卸下 / 丢弃操作的完整上下文
#[derive(Debug, Clone)]
pub struct EquipContext {
    pub item: ItemRef,
    pub equipper: Entity,
    pub source: InstanceSource,
    /// 由视觉处理器在装备后回写
    pub spawned_instance: Option<Entity>,
    /// 仅丢弃操作会填写
    pub drop_pose: Option<DropPose>,
}

impl EquipContext {
    pub fn new(item: ItemRef, equipper: Entity, source: InstanceSource) -> Self {
        Self {
            item,
            equipper,
            source,
            spawned_instance: None,
            drop_pose: None,
        }
    }

    pub fn existing_instance(&self) -> Option<Entity> {
        match self.source {
            InstanceSource::Adopt(entity) => Some(entity),
            InstanceSource::Spawn => None,
        }
    }

    pub fn has_existing_instance(&self) -> bool {
        self.existing_instance().is_some()
    }

    pub fn has_spawned_instance(&self) -> bool {
        self.spawned_instance.is_some()
    }

    pub fn slot_type(&self) -> EquipmentSlotType {
        self.item.slot_type()
    }

    pub fn drop_direction(&self) -> Vec3 {
        self.drop_pose.unwrap_or_default().direction
    }
}
