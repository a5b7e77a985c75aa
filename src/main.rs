use bevy::prelude::*;

mod character;
mod core;
mod data;
mod equipment;
mod interface;
mod physics;
mod pickup;
mod sockets;
mod visual;

use character::CharacterPlugin;
use crate::core::CorePlugin;
use crate::core::events::forward_log_event;
use equipment::EquipmentPlugin;
use interface::debug_cli::DebugCliPlugin;
use physics::PhysicsPlugin;
use pickup::PickupPlugin;
use sockets::SocketPlugin;
use visual::VisualPlugin;
use crate::core::states;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                visible: false,
                ..default()
            }),   // visible窗口，实现“无 UI”
            ..default()
        }))
        .add_plugins(CorePlugin)
        .add_plugins(DebugCliPlugin)
        .add_plugins(data::DataPlugin)
        .add_plugins((SocketPlugin, EquipmentPlugin, VisualPlugin, PhysicsPlugin, PickupPlugin))
        .add_plugins(CharacterPlugin)
        .add_systems(Update, forward_log_event) // 简单打印
        .add_systems(Startup, |mut next: ResMut<NextState<states::AppState>>| {
            next.set(states::AppState::Loading);
        })
        .run();
}
