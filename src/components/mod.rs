mod cannon;
mod physics;

pub use cannon::{Cannon, ProjectileShape, ProjectileTemplate, ScriptedPath, SpawnTemplate, Spawner};
pub use physics::{
    Aabb, Body, Collider, ColliderType, ContactEvent, ContactKind, JITTER_THRESHOLD,
    POINT_HALF_EXTENT,
};

use glam::{Vec2, Vec3};

/// Position and scale of the owning entity. The z axis is pinned to zero.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub scale: Vec3,
}

impl Transform {
    pub fn new(position: Vec2) -> Self {
        Self {
            position: position.extend(0.0),
            scale: Vec3::ONE,
        }
    }

    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.scale = scale.extend(1.0);
        self
    }

    pub fn position2(&self) -> Vec2 {
        self.position.truncate()
    }

    pub fn set_position2(&mut self, position: Vec2) {
        self.position = position.extend(0.0);
    }
}

/// Marker: entity was fired from a cannon.
pub struct Projectile;

/// Marker: entity is something projectiles are meant to hit.
pub struct Target;

/// Running count of hits a target has taken.
#[derive(Default)]
pub struct HitCount(pub u32);
