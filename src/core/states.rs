use bevy::prelude::*;

/// 应用的大状态：物品表加载完成后进入 InGame
#[derive(States, Debug, Clone, Eq, PartialEq, Hash, Default)]
pub enum AppState {
    #[default]
    Startup,
    Loading,
    InGame,
}
