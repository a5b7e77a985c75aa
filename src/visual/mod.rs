pub mod components;
pub mod systems;

use bevy::prelude::*;
use systems::sync_visual_handlers;

pub use components::EquipmentVisualHandler;
pub use systems::{disable_visual_handler, enable_visual_handler, spawned_instance};

pub struct VisualPlugin;
impl Plugin for VisualPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, sync_visual_handlers);
    }
}
