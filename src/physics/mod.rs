mod integrate;
mod resolve;

pub use integrate::{integrate_position, integrate_velocity, DAMPING, DELAY_DECAY, GRAVITY_CONSTANT};
pub use resolve::{
    circle_circle, circle_rectangle, elastic_velocities, point_circle, point_rectangle,
    resolve_pair, rests_on, BOUNCE_NUDGE, GROUNDING_SPEED, GROUND_CLEARANCE, RESTITUTION_DECAY,
};

use hecs::{Entity, World};

use crate::components::{Body, Collider, ColliderType, ContactEvent, ContactKind, Transform};

/// Default fixed step used by the simulation driver.
pub const PHYSICS_DT: f32 = 1.0 / 60.0;

/// What happened during one [`PhysicsWorld::step`].
#[derive(Debug, Default)]
pub struct StepReport {
    pub contacts: Vec<ContactEvent>,
    /// Entities despawned by destructive contacts, in the order they were hit.
    pub destroyed: Vec<Entity>,
}

/// Registries of the entities taking part in simulation.
///
/// Components live in the host's `hecs::World`; this only remembers which
/// entities to integrate and which to test for collisions.
#[derive(Debug, Default)]
pub struct PhysicsWorld {
    bodies: Vec<Entity>,
    colliders: Vec<Entity>,
}

impl PhysicsWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_body(&mut self, entity: Entity) {
        if !self.bodies.contains(&entity) {
            self.bodies.push(entity);
        }
    }

    pub fn deregister_body(&mut self, entity: Entity) {
        self.bodies.retain(|&e| e != entity);
    }

    pub fn register_collider(&mut self, entity: Entity) {
        if !self.colliders.contains(&entity) {
            self.colliders.push(entity);
        }
    }

    pub fn deregister_collider(&mut self, entity: Entity) {
        self.colliders.retain(|&e| e != entity);
    }

    /// Registers whichever of [`Body`] and [`Collider`] the entity carries.
    pub fn attach(&mut self, ecs: &World, entity: Entity) {
        if ecs.get::<&Body>(entity).is_ok() {
            self.register_body(entity);
        }
        if ecs.get::<&Collider>(entity).is_ok() {
            self.register_collider(entity);
        }
    }

    pub fn detach(&mut self, entity: Entity) {
        self.deregister_body(entity);
        self.deregister_collider(entity);
    }

    /// Detaches and despawns. Missing entities are ignored.
    pub fn destroy(&mut self, ecs: &mut World, entity: Entity) {
        self.detach(entity);
        let _ = ecs.despawn(entity);
    }

    pub fn bodies(&self) -> &[Entity] {
        &self.bodies
    }

    pub fn colliders(&self) -> &[Entity] {
        &self.colliders
    }

    /// One fixed step: integrate every body, then resolve every collider pair.
    ///
    /// Points destroyed by a contact are skipped for the remainder of the scan
    /// and despawned once it completes. Grounded circles that lost their
    /// support are released so gravity resumes next step.
    pub fn step(&mut self, ecs: &mut World, dt: f32) -> StepReport {
        for &entity in &self.bodies {
            if let Ok((transform, body)) = ecs.query_one_mut::<(&mut Transform, &mut Body)>(entity) {
                integrate_velocity(body, dt);
                integrate_position(transform, body, dt);
            }
        }

        let mut report = StepReport::default();
        let colliders = &self.colliders;
        for (i, &a) in colliders.iter().enumerate() {
            for &b in &colliders[i + 1..] {
                if report.destroyed.contains(&a) {
                    break;
                }
                if report.destroyed.contains(&b) {
                    continue;
                }
                let Some(event) = resolve_pair(ecs, a, b) else {
                    continue;
                };
                log::debug!("{:?} between {:?} and {:?}", event.kind, event.entity_a, event.entity_b);
                if matches!(event.kind, ContactKind::PointRectangle | ContactKind::PointCircle) {
                    report.destroyed.push(event.entity_a);
                }
                report.contacts.push(event);
            }
        }

        self.release_unsupported(ecs, &report);

        for &entity in &report.destroyed {
            log::debug!("destroying {entity:?}");
            self.destroy(ecs, entity);
        }
        report
    }

    fn release_unsupported(&self, ecs: &mut World, report: &StepReport) {
        for &entity in &self.bodies {
            let touched = report.contacts.iter().any(|contact| {
                contact.entity_a == entity
                    && matches!(contact.kind, ContactKind::Grounded | ContactKind::CircleRectangle)
            });
            if touched {
                continue;
            }
            let grounded_circle = matches!(
                ecs.query_one_mut::<(&Body, &Collider)>(entity),
                Ok((body, collider)) if body.is_grounded() && collider.kind == ColliderType::Circle
            );
            if !grounded_circle {
                continue;
            }
            if self.colliders.iter().any(|&rect| rect != entity && rests_on(ecs, entity, rect)) {
                continue;
            }
            if let Ok(mut body) = ecs.get::<&mut Body>(entity) {
                body.set_grounded(false);
                log::trace!("{entity:?} lost its support");
            }
        }
    }
}
