use crate::core::resources::EquipmentSettings;
use bevy::prelude::*;
use bevy_rapier3d::prelude::{
    Collider, ColliderMassProperties, ExternalImpulse, RapierConfiguration, RigidBody, Velocity,
};

/// 物品碰撞体半径
pub const ITEM_COLLIDER_RADIUS: f32 = 0.15;
/// 没有模板指定时的物品质量
pub const DEFAULT_ITEM_MASS: f32 = 1.0;

const GROUND_HALF_EXTENT: f32 = 50.0;
const GROUND_HALF_THICKNESS: f32 = 0.1;

/// 可被模拟的物品刚体；质量不合法时退回默认质量
pub fn item_body(mass: f32) -> impl Bundle {
    let mass = if mass > f32::EPSILON { mass } else { DEFAULT_ITEM_MASS };
    (
        RigidBody::Dynamic,
        Collider::ball(ITEM_COLLIDER_RADIUS),
        ColliderMassProperties::Mass(mass),
        Velocity::zero(),
        ExternalImpulse::default(),
    )
}

pub fn is_simulated(world: &World, entity: Entity) -> bool {
    matches!(world.get::<RigidBody>(entity), Some(RigidBody::Dynamic))
}

/// 挂到角色身上前改为运动学，并清掉残留的速度与冲量；没有刚体时返回 `false`
pub fn make_kinematic(world: &mut World, entity: Entity) -> bool {
    let Ok(mut entity) = world.get_entity_mut(entity) else {
        return false;
    };
    let Some(mut body) = entity.get_mut::<RigidBody>() else {
        return false;
    };
    *body = RigidBody::KinematicPositionBased;

    if let Some(mut velocity) = entity.get_mut::<Velocity>() {
        *velocity = Velocity::zero();
    }
    if let Some(mut impulse) = entity.get_mut::<ExternalImpulse>() {
        *impulse = ExternalImpulse::default();
    }
    true
}

/// 交给物理模拟：缺刚体时补上，切换为动态并施加一次冲量
pub fn release(world: &mut World, entity: Entity, impulse: Vec3) -> bool {
    let Ok(mut entity) = world.get_entity_mut(entity) else {
        return false;
    };
    if !entity.contains::<RigidBody>() {
        entity.insert(item_body(DEFAULT_ITEM_MASS));
    }
    entity.insert((
        RigidBody::Dynamic,
        ExternalImpulse {
            impulse,
            torque_impulse: Vec3::ZERO,
        },
    ));
    true
}

/// 物理上下文创建后写入配置中的重力
pub fn apply_gravity(
    settings: Res<EquipmentSettings>,
    mut configs: Query<&mut RapierConfiguration, Added<RapierConfiguration>>,
) {
    for mut config in &mut configs {
        config.gravity = settings.gravity();
    }
}

/// 在 `ground_height` 处放一块静态地面，丢下的物品落在上面
pub fn spawn_ground(mut commands: Commands, settings: Res<EquipmentSettings>) {
    commands.spawn((
        Name::new("Ground"),
        RigidBody::Fixed,
        Collider::cuboid(GROUND_HALF_EXTENT, GROUND_HALF_THICKNESS, GROUND_HALF_EXTENT),
        Transform::from_xyz(0.0, settings.ground_height - GROUND_HALF_THICKNESS, 0.0),
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinematic_switch_clears_motion() {
        let mut world = World::new();
        let item = world
            .spawn((
                item_body(2.0),
                Velocity::linear(Vec3::X * 3.0),
            ))
            .id();

        assert!(make_kinematic(&mut world, item));

        assert_eq!(
            world.get::<RigidBody>(item),
            Some(&RigidBody::KinematicPositionBased)
        );
        assert_eq!(world.get::<Velocity>(item).unwrap().linvel, Vec3::ZERO);
        assert!(!is_simulated(&world, item));
    }

    #[test]
    fn make_kinematic_needs_a_body() {
        let mut world = World::new();
        let prop = world.spawn(Transform::default()).id();

        assert!(!make_kinematic(&mut world, prop));
        assert!(world.get::<RigidBody>(prop).is_none());
    }

    #[test]
    fn release_adds_body_and_impulse() {
        let mut world = World::new();
        let prop = world.spawn(Transform::default()).id();

        assert!(release(&mut world, prop, Vec3::new(0.0, 0.0, -2.0)));

        assert!(is_simulated(&world, prop));
        assert!(world.get::<Collider>(prop).is_some());
        assert_eq!(
            world.get::<ExternalImpulse>(prop).unwrap().impulse,
            Vec3::new(0.0, 0.0, -2.0)
        );
    }

    #[test]
    fn release_keeps_authored_mass() {
        let mut world = World::new();
        let item = world.spawn(item_body(3.0)).id();
        make_kinematic(&mut world, item);

        release(&mut world, item, Vec3::X);

        assert!(is_simulated(&world, item));
        assert!(matches!(
            world.get::<ColliderMassProperties>(item),
            Some(ColliderMassProperties::Mass(mass)) if *mass == 3.0
        ));
    }

    #[test]
    fn gravity_comes_from_settings() {
        let mut app = App::new();
        app.insert_resource(EquipmentSettings {
            gravity: [0.0, -3.0, 0.0],
            ..default()
        })
        .add_systems(Update, apply_gravity);
        let context = app.world_mut().spawn(RapierConfiguration::new(1.0)).id();

        app.update();

        let config = app.world().get::<RapierConfiguration>(context).unwrap();
        assert_eq!(config.gravity, Vec3::new(0.0, -3.0, 0.0));
    }
}
