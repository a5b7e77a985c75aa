pub mod components;
pub mod systems;

use crate::core::states::AppState;
use bevy::prelude::*;
use systems::process_pickup_requests;

pub use components::{Interactor, PickupCollider, PickupRequest, WorldItem};
pub use systems::{interact, pickup_named, spawn_world_item, try_pickup};

pub struct PickupPlugin;
impl Plugin for PickupPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<PickupRequest>().add_systems(
            Update,
            process_pickup_requests.run_if(in_state(AppState::InGame)),
        );
    }
}
