use bevy::prelude::*;

use crate::sockets::EquipmentSocketType;

/// 玩家标记组件
#[derive(Component)]
pub struct Player;

/// 角色骨架上的一个节点：名称、相对父骨骼的位置、可选挂点
#[derive(Debug, Clone, Copy)]
pub struct Bone {
    pub name: &'static str,
    pub parent: Option<&'static str>,
    pub offset: Vec3,
    pub socket: Option<EquipmentSocketType>,
}

impl Bone {
    const fn new(name: &'static str, parent: Option<&'static str>, offset: Vec3) -> Self {
        Self {
            name,
            parent,
            offset,
            socket: None,
        }
    }

    const fn socket(mut self, socket: EquipmentSocketType) -> Self {
        self.socket = Some(socket);
        self
    }
}

/// 演示角色的骨架，父骨骼总在子骨骼之前
pub const DEMO_SKELETON: &[Bone] = &[
    Bone::new("Hips", None, Vec3::new(0.0, 1.0, 0.0))
        .socket(EquipmentSocketType::Hip),
    Bone::new("Belt", Some("Hips"), Vec3::new(0.0, 0.0, 0.12))
        .socket(EquipmentSocketType::Belt),
    Bone::new("Spine", Some("Hips"), Vec3::new(0.0, 0.3, 0.0))
        .socket(EquipmentSocketType::Chest),
    Bone::new("Back", Some("Spine"), Vec3::new(0.0, 0.1, 0.15))
        .socket(EquipmentSocketType::Back),
    Bone::new("Backpack", Some("Spine"), Vec3::new(0.0, 0.05, 0.25))
        .socket(EquipmentSocketType::Backpack),
    Bone::new("Neck", Some("Spine"), Vec3::new(0.0, 0.3, 0.0)),
    Bone::new("Head", Some("Neck"), Vec3::new(0.0, 0.15, 0.0))
        .socket(EquipmentSocketType::Head),
    Bone::new("Face", Some("Head"), Vec3::new(0.0, 0.0, -0.1))
        .socket(EquipmentSocketType::Face),
    Bone::new("LeftShoulder", Some("Spine"), Vec3::new(-0.2, 0.25, 0.0))
        .socket(EquipmentSocketType::LeftShoulder),
    Bone::new("LeftHand", Some("LeftShoulder"), Vec3::new(-0.1, -0.5, 0.0))
        .socket(EquipmentSocketType::LeftHand),
    Bone::new("RightShoulder", Some("Spine"), Vec3::new(0.2, 0.25, 0.0))
        .socket(EquipmentSocketType::RightShoulder),
    Bone::new("RightHand", Some("RightShoulder"), Vec3::new(0.1, -0.5, 0.0))
        .socket(EquipmentSocketType::RightHand),
];
