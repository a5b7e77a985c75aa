pub mod components;
pub mod context;
pub mod events;
pub mod systems;

use crate::core::states::AppState;
use bevy::prelude::*;
use events::*;
use systems::*;

pub use components::{EquipmentController, EquipmentSlotType};
pub use context::{DropPose, EquipContext, Equippable, InstanceSource, ItemRef};
pub use systems::{EquipmentMut, EquipmentWorldExt};

pub struct EquipmentPlugin;
impl Plugin for EquipmentPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<EquipRequest>()
            .add_event::<UnequipRequest>()
            .add_event::<DropRequest>()
            .add_systems(
                Update,
                process_equipment_requests.run_if(in_state(AppState::InGame)),
            );
    }
}
