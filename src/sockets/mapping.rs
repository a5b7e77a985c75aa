use bevy::prelude::*;
use serde_derive::{Deserialize, Serialize};
use std::collections::HashMap;

use super::components::EquipmentSocketType;
use crate::equipment::EquipmentSlotType;

/// 槽位 → 挂点的配置项
///
/// 偏移在挂接后作为局部变换应用；旋转偏移为欧拉角（度），
/// 依次绕 Y、X、Z 轴旋转。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlotSocketMapping {
    pub slot: EquipmentSlotType,
    pub socket: EquipmentSocketType,
    #[serde(default)]
    pub position_offset: [f32; 3],
    #[serde(default)]
    pub rotation_offset: [f32; 3],
}

impl SlotSocketMapping {
    pub fn new(slot: EquipmentSlotType, socket: EquipmentSocketType) -> Self {
        Self {
            slot,
            socket,
            position_offset: [0.0; 3],
            rotation_offset: [0.0; 3],
        }
    }

    pub fn with_offset(mut self, position: Vec3, rotation_degrees: Vec3) -> Self {
        self.position_offset = position.to_array();
        self.rotation_offset = rotation_degrees.to_array();
        self
    }

    pub fn translation(&self) -> Vec3 {
        Vec3::from_array(self.position_offset)
    }

    pub fn rotation(&self) -> Quat {
        let [x, y, z] = self.rotation_offset;
        Quat::from_euler(EulerRot::YXZ, y.to_radians(), x.to_radians(), z.to_radians())
    }
}

/// 槽位映射查询表，同一槽位多次配置时以最后一条为准
#[derive(Debug, Clone, Default)]
pub struct SlotSocketTable {
    by_slot: HashMap<EquipmentSlotType, SlotSocketMapping>,
}

impl SlotSocketTable {
    pub fn new(mappings: &[SlotSocketMapping]) -> Self {
        let mut by_slot = HashMap::new();
        for mapping in mappings {
            if mapping.slot.is_none() {
                warn!("[SlotSocketTable] 忽略槽位为 None 的映射 ({})", mapping.socket);
                continue;
            }
            if by_slot.insert(mapping.slot, *mapping).is_some() {
                warn!("[SlotSocketTable] {} 配置了多次，使用最后一条", mapping.slot);
            }
        }
        Self { by_slot }
    }

    pub fn socket_for(&self, slot: EquipmentSlotType) -> Option<EquipmentSocketType> {
        self.by_slot.get(&slot).map(|mapping| mapping.socket)
    }

    pub fn mapping(&self, slot: EquipmentSlotType) -> Option<&SlotSocketMapping> {
        self.by_slot.get(&slot)
    }

    /// 挂接后的局部偏移，没有配置时为零偏移
    pub fn local_offset(&self, slot: EquipmentSlotType) -> (Vec3, Quat) {
        self.mapping(slot)
            .map_or((Vec3::ZERO, Quat::IDENTITY), |mapping| {
                (mapping.translation(), mapping.rotation())
            })
    }

    pub fn len(&self) -> usize {
        self.by_slot.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_slot.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn later_entries_override_earlier_ones() {
        let table = SlotSocketTable::new(&[
            SlotSocketMapping::new(EquipmentSlotType::PrimaryWeapon, EquipmentSocketType::Back),
            SlotSocketMapping::new(EquipmentSlotType::PrimaryWeapon, EquipmentSocketType::RightHand),
            SlotSocketMapping::new(EquipmentSlotType::None, EquipmentSocketType::Hip),
        ]);

        assert_eq!(table.len(), 1);
        assert_eq!(
            table.socket_for(EquipmentSlotType::PrimaryWeapon),
            Some(EquipmentSocketType::RightHand)
        );
        assert_eq!(table.socket_for(EquipmentSlotType::None), None);
    }

    #[test]
    fn offsets_default_to_identity() {
        let table = SlotSocketTable::default();
        let (translation, rotation) = table.local_offset(EquipmentSlotType::Head);
        assert_eq!(translation, Vec3::ZERO);
        assert_eq!(rotation, Quat::IDENTITY);
    }

    #[test]
    fn rotation_offset_is_in_degrees() {
        let mapping = SlotSocketMapping::new(EquipmentSlotType::Body, EquipmentSocketType::Chest)
            .with_offset(Vec3::new(0.0, 0.1, 0.2), Vec3::new(0.0, 90.0, 0.0));

        assert_eq!(mapping.translation(), Vec3::new(0.0, 0.1, 0.2));
        assert!(mapping
            .rotation()
            .abs_diff_eq(Quat::from_rotation_y(FRAC_PI_2), 1e-5));
    }
}
