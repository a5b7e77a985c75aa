pub mod components;
pub mod mapping;
pub mod systems;

use bevy::prelude::*;
use components::SocketRegistryIndex;
use systems::prune_socket_index;

pub use components::{CharacterEquipmentSockets, EquipmentSocket, EquipmentSocketType};
pub use mapping::{SlotSocketMapping, SlotSocketTable};
pub use systems::{find_all_sockets, install_socket_registry};

pub struct SocketPlugin;
impl Plugin for SocketPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SocketRegistryIndex>()
            .add_systems(PostUpdate, prune_socket_index);
    }
}
