use glam::Vec2;
use hecs::{Entity, World};

use crate::components::{Body, Cannon, Transform};
use crate::physics::{integrate_velocity, PhysicsWorld};
use crate::scene::prefabs::spawn_projectile;

/// Counts every cannon's reload timer down.
pub fn cannon_cooldown_system(ecs: &mut World, dt: f32) {
    for (_entity, cannon) in ecs.query_mut::<&mut Cannon>() {
        cannon.tick(dt);
    }
}

/// Fires `cannon_entity` if it has reloaded. Returns the new projectile.
pub fn fire_cannon(ecs: &mut World, physics: &mut PhysicsWorld, cannon_entity: Entity) -> Option<Entity> {
    let (origin, cannon) = {
        let (transform, cannon) = ecs
            .query_one_mut::<(&Transform, &mut Cannon)>(cannon_entity)
            .ok()?;
        if !cannon.is_ready() {
            return None;
        }
        cannon.cooldown = cannon.reload_time;
        (transform.position2(), *cannon)
    };

    let muzzle = origin + cannon.direction() * cannon.muzzle_length;
    let projectile = spawn_projectile(ecs, physics, muzzle, cannon.launch_velocity(), &cannon.projectile);
    log::debug!(
        "cannon {cannon_entity:?} fired {projectile:?} at {:.1} deg, speed {:.1}",
        cannon.angle.to_degrees(),
        cannon.power
    );
    Some(projectile)
}

/// Positions a body would pass through over `steps` collision-free steps.
///
/// Runs the same integrator the world uses on a copy of `body`, so the
/// preview line matches the real flight until something is hit.
pub fn predict_trajectory(origin: Vec2, body: Body, dt: f32, steps: usize) -> Vec<Vec2> {
    let mut body = body;
    let mut position = origin;
    let mut points = Vec::with_capacity(steps + 1);
    points.push(position);
    for _ in 0..steps {
        if body.is_kinematic() {
            break;
        }
        integrate_velocity(&mut body, dt);
        position += body.velocity() * dt;
        points.push(position);
    }
    points
}

/// Preview line for the shot `cannon_entity` would fire right now.
pub fn cannon_preview(ecs: &World, cannon_entity: Entity, dt: f32, steps: usize) -> Vec<Vec2> {
    let Ok(mut query) = ecs.query_one::<(&Transform, &Cannon)>(cannon_entity) else {
        return Vec::new();
    };
    let Some((transform, cannon)) = query.get() else {
        return Vec::new();
    };
    let muzzle = transform.position2() + cannon.direction() * cannon.muzzle_length;
    let body = Body::new(cannon.projectile.mass)
        .with_velocity(cannon.launch_velocity())
        .with_gravity_delay(cannon.projectile.gravity_delay);
    predict_trajectory(muzzle, body, dt, steps)
}
