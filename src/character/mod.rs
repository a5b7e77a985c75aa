pub mod components;
pub mod events;
pub mod systems;

use crate::core::states::AppState;
use bevy::prelude::*;
use events::*;
use systems::*;

pub struct CharacterPlugin;

impl Plugin for CharacterPlugin {
    fn build(&self, app: &mut App) {
        app
            // 注册事件
            .add_event::<ShowEquipment>()
            .add_event::<ShowSockets>()
            // 在游戏开始时生成玩家和地上的物品
            .add_systems(
                OnEnter(AppState::InGame),
                (spawn_player, spawn_world_items).chain(),
            )
            // 游戏中的系统
            .add_systems(
                Update,
                (show_equipment, show_sockets).run_if(in_state(AppState::InGame)),
            );
    }
}
