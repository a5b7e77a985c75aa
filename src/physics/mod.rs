pub mod systems;

use crate::core::states::AppState;
use bevy::prelude::*;
use bevy_rapier3d::prelude::{NoUserData, RapierPhysicsPlugin};
use systems::*;

pub use systems::{is_simulated, item_body, make_kinematic, release};

pub struct PhysicsPlugin;
impl Plugin for PhysicsPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(RapierPhysicsPlugin::<NoUserData>::default())
            .add_systems(Update, apply_gravity)
            .add_systems(OnEnter(AppState::InGame), spawn_ground);
    }
}
