use glam::Vec2;
use hecs::{Entity, World};

use crate::components::{SpawnTemplate, Spawner};
use crate::physics::PhysicsWorld;
use crate::scene::prefabs::spawn_from_template;

/// Ticks every [`Spawner`] and spawns the ones that are due.
/// Returns the entities created this call.
pub fn spawner_system(ecs: &mut World, physics: &mut PhysicsWorld, dt: f32) -> Vec<Entity> {
    // Collect first: spawning needs the world mutably.
    let mut due: Vec<(Entity, Vec2, SpawnTemplate)> = Vec::new();
    let owners: Vec<Entity> = ecs.query::<&Spawner>().iter().map(|(e, _)| e).collect();
    for owner in owners {
        let alive: Vec<Entity> = match ecs.get::<&Spawner>(owner) {
            Ok(spawner) => spawner.spawned.iter().copied().filter(|&e| ecs.contains(e)).collect(),
            Err(_) => continue,
        };
        if let Ok(mut spawner) = ecs.get::<&mut Spawner>(owner) {
            spawner.spawned = alive;
            spawner.remaining -= dt;
            if spawner.remaining > 0.0 {
                continue;
            }
            spawner.remaining += spawner.interval.max(dt);
            if spawner.spawned.len() < spawner.max_alive {
                due.push((owner, spawner.position, spawner.template));
            }
        }
    }

    let mut created = Vec::with_capacity(due.len());
    for (owner, position, template) in due {
        let entity = spawn_from_template(ecs, physics, position, &template);
        if let Ok(mut spawner) = ecs.get::<&mut Spawner>(owner) {
            spawner.spawned.push(entity);
        }
        log::debug!("spawner {owner:?} produced {entity:?}");
        created.push(entity);
    }
    created
}
