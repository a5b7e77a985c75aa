use bevy::prelude::*;

/// 显示装备状态（用于命令行）
#[derive(Event)]
pub struct ShowEquipment {
    pub entity: Option<Entity>, // None 表示显示玩家装备
}

/// 显示挂点表（用于命令行）
#[derive(Event)]
pub struct ShowSockets {
    pub entity: Option<Entity>,
}
