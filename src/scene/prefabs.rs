use glam::Vec2;
use hecs::{Entity, World};

use crate::components::*;
use crate::physics::PhysicsWorld;

// ---------------------------------------------------------------------------
// Dynamic objects
// ---------------------------------------------------------------------------

/// Circle with a body, registered for integration and collision.
pub fn spawn_ball(
    ecs: &mut World,
    physics: &mut PhysicsWorld,
    position: Vec2,
    diameter: f32,
    body: Body,
) -> Entity {
    let entity = ecs.spawn((
        Transform::new(position).with_scale(Vec2::splat(diameter)),
        Collider::circle(),
        body,
    ));
    physics.attach(ecs, entity);
    entity
}

/// Cannon shot. Points vanish on their first hit; circle shots bounce.
pub fn spawn_projectile(
    ecs: &mut World,
    physics: &mut PhysicsWorld,
    position: Vec2,
    velocity: Vec2,
    template: &ProjectileTemplate,
) -> Entity {
    let body = Body::new(template.mass)
        .with_velocity(velocity)
        .with_gravity_delay(template.gravity_delay);

    let (scale, collider) = match template.shape {
        ProjectileShape::Point => (Vec2::ONE, Collider::point()),
        ProjectileShape::Circle => (Vec2::splat(template.size), Collider::circle()),
    };

    let entity = ecs.spawn((
        Transform::new(position).with_scale(scale),
        collider,
        body,
        Projectile,
    ));
    physics.attach(ecs, entity);
    entity
}

// ---------------------------------------------------------------------------
// Static geometry
// ---------------------------------------------------------------------------

/// Immovable rectangle: floors, walls, ledges.
pub fn spawn_block(ecs: &mut World, physics: &mut PhysicsWorld, position: Vec2, size: Vec2) -> Entity {
    let entity = ecs.spawn((Transform::new(position).with_scale(size), Collider::rectangle()));
    physics.attach(ecs, entity);
    entity
}

pub fn spawn_target(ecs: &mut World, physics: &mut PhysicsWorld, position: Vec2, size: Vec2) -> Entity {
    let entity = ecs.spawn((
        Transform::new(position).with_scale(size),
        Collider::rectangle(),
        Target,
        HitCount::default(),
    ));
    physics.attach(ecs, entity);
    entity
}

/// Target carried along `path`. The kinematic body keeps the engine from
/// integrating it while the scripted-path system owns its position.
pub fn spawn_moving_target(
    ecs: &mut World,
    physics: &mut PhysicsWorld,
    path: ScriptedPath,
    size: Vec2,
) -> Entity {
    let start = path.waypoints.first().copied().unwrap_or(Vec2::ZERO);
    let entity = ecs.spawn((
        Transform::new(start).with_scale(size),
        Collider::rectangle(),
        Body::new(1.0).with_kinematic(true),
        Target,
        HitCount::default(),
        path,
    ));
    physics.attach(ecs, entity);
    entity
}

// ---------------------------------------------------------------------------
// Host-only entities
// ---------------------------------------------------------------------------

/// Cannons never collide; they only carry a transform for the muzzle origin.
pub fn spawn_cannon(ecs: &mut World, position: Vec2, cannon: Cannon) -> Entity {
    ecs.spawn((Transform::new(position), cannon))
}

pub fn spawn_spawner(ecs: &mut World, spawner: Spawner) -> Entity {
    ecs.spawn((spawner,))
}

/// Spawns one instance of a spawner template.
pub fn spawn_from_template(
    ecs: &mut World,
    physics: &mut PhysicsWorld,
    position: Vec2,
    template: &SpawnTemplate,
) -> Entity {
    match *template {
        SpawnTemplate::Ball { diameter, mass, velocity } => {
            spawn_ball(ecs, physics, position, diameter, Body::new(mass).with_velocity(velocity))
        }
        SpawnTemplate::Target { size } => spawn_target(ecs, physics, position, size),
    }
}
