use glam::Vec2;
use hecs::Entity;

use super::Transform;

/// Velocity components below this magnitude are snapped to exactly zero.
pub const JITTER_THRESHOLD: f32 = 0.1;

/// Half-width of the tiny box a point collider reports as its bounds.
pub const POINT_HALF_EXTENT: f32 = 0.005;

/// Kinematic state of one dynamic object.
///
/// Fields are private so every velocity write goes through [`Body::set_velocity`],
/// which rejects NaN and snaps jitter to zero.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Body {
    velocity: Vec2,
    acceleration: Vec2,
    mass: f32,
    restitution: f32,
    gravity_scale: f32,
    gravity_delay: f32,
    grounded: bool,
    kinematic: bool,
}

impl Default for Body {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Body {
    /// A body at rest with full restitution and normal gravity.
    /// Non-positive or NaN masses fall back to 1.0.
    pub fn new(mass: f32) -> Self {
        Self {
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            mass: if mass > 0.0 { mass } else { 1.0 },
            restitution: 1.0,
            gravity_scale: 1.0,
            gravity_delay: 0.0,
            grounded: false,
            kinematic: false,
        }
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.set_velocity(velocity);
        self
    }

    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.set_restitution(restitution);
        self
    }

    pub fn with_gravity_scale(mut self, scale: f32) -> Self {
        self.gravity_scale = scale;
        self
    }

    pub fn with_gravity_delay(mut self, delay: f32) -> Self {
        self.set_gravity_delay(delay);
        self
    }

    pub fn with_kinematic(mut self, kinematic: bool) -> Self {
        self.kinematic = kinematic;
        self
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Writes a new velocity.
    ///
    /// A NaN component rejects the whole write and the previous velocity is kept.
    /// Components below [`JITTER_THRESHOLD`] become exactly zero. Any non-zero
    /// result clears the grounded flag.
    pub fn set_velocity(&mut self, velocity: Vec2) {
        if velocity.is_nan() {
            log::trace!("rejected NaN velocity write {velocity:?}");
            return;
        }
        let snapped = Vec2::new(snap(velocity.x), snap(velocity.y));
        if snapped != Vec2::ZERO {
            self.grounded = false;
        }
        self.velocity = snapped;
    }

    pub fn acceleration(&self) -> Vec2 {
        self.acceleration
    }

    pub fn set_acceleration(&mut self, acceleration: Vec2) {
        if acceleration.is_nan() {
            return;
        }
        self.acceleration = acceleration;
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// Ignores non-positive and NaN masses; resolution divides by mass sums.
    pub fn set_mass(&mut self, mass: f32) {
        if mass > 0.0 {
            self.mass = mass;
        } else {
            log::warn!("ignoring non-positive mass {mass}");
        }
    }

    pub fn restitution(&self) -> f32 {
        self.restitution
    }

    pub fn set_restitution(&mut self, restitution: f32) {
        if restitution >= 0.0 {
            self.restitution = restitution;
        }
    }

    /// Multiplies restitution by `factor` and returns the decayed value.
    pub fn decay_restitution(&mut self, factor: f32) -> f32 {
        self.restitution *= factor;
        self.restitution
    }

    pub fn gravity_scale(&self) -> f32 {
        self.gravity_scale
    }

    pub fn set_gravity_scale(&mut self, scale: f32) {
        self.gravity_scale = scale;
    }

    pub fn gravity_delay(&self) -> f32 {
        self.gravity_delay
    }

    pub fn set_gravity_delay(&mut self, delay: f32) {
        self.gravity_delay = delay.max(0.0);
    }

    /// Counts the gravity delay down by `dt`, never below zero.
    pub fn reduce_gravity_delay(&mut self, dt: f32) {
        self.gravity_delay = (self.gravity_delay - dt).max(0.0);
    }

    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    pub fn set_grounded(&mut self, grounded: bool) {
        self.grounded = grounded;
    }

    pub fn is_kinematic(&self) -> bool {
        self.kinematic
    }

    pub fn set_kinematic(&mut self, kinematic: bool) {
        self.kinematic = kinematic;
    }
}

fn snap(component: f32) -> f32 {
    if component.abs() < JITTER_THRESHOLD {
        0.0
    } else {
        component
    }
}

/// Axis-aligned bounding box described by center and half extents.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Aabb {
    pub center: Vec2,
    pub half_extents: Vec2,
}

impl Aabb {
    pub fn new(center: Vec2, half_extents: Vec2) -> Self {
        Self { center, half_extents }
    }

    pub fn min(&self) -> Vec2 {
        self.center - self.half_extents
    }

    pub fn max(&self) -> Vec2 {
        self.center + self.half_extents
    }

    /// Inclusive containment test.
    pub fn contains(&self, point: Vec2) -> bool {
        let (min, max) = (self.min(), self.max());
        point.x >= min.x && point.x <= max.x && point.y >= min.y && point.y <= max.y
    }

    /// Nearest point inside the box, by per-axis clamping.
    pub fn closest_point(&self, point: Vec2) -> Vec2 {
        point.clamp(self.min(), self.max())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColliderType {
    Point,
    Circle,
    AxisAlignedRectangle,
}

/// Shape descriptor. Bounds are always derived from the owning [`Transform`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Collider {
    pub kind: ColliderType,
    bounds: Aabb,
}

impl Collider {
    pub fn new(kind: ColliderType) -> Self {
        Self {
            kind,
            bounds: Aabb::default(),
        }
    }

    pub fn point() -> Self {
        Self::new(ColliderType::Point)
    }

    pub fn circle() -> Self {
        Self::new(ColliderType::Circle)
    }

    pub fn rectangle() -> Self {
        Self::new(ColliderType::AxisAlignedRectangle)
    }

    /// Recomputes bounds from the owner's position and scale.
    pub fn update_bounds(&mut self, transform: &Transform) -> Aabb {
        let center = transform.position.truncate();
        let size = transform.scale.truncate();
        self.bounds = match self.kind {
            ColliderType::AxisAlignedRectangle => Aabb::new(center, size * 0.5),
            ColliderType::Circle => Aabb::new(center, Vec2::splat(size.x * 0.5)),
            ColliderType::Point => Aabb::new(center, Vec2::splat(POINT_HALF_EXTENT)),
        };
        self.bounds
    }

    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// Circle radius as read back from the bounds.
    pub fn radius(&self) -> f32 {
        self.bounds.half_extents.x
    }
}

/// Which resolution routine fired for a pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContactKind {
    CircleCircle,
    CircleRectangle,
    /// Circle came to rest on a rectangle's top edge.
    Grounded,
    PointRectangle,
    PointCircle,
}

/// Contact resolved during a physics step.
/// For mixed pairs `entity_a` is the point (or the circle against a rectangle).
#[derive(Clone, Copy, Debug)]
pub struct ContactEvent {
    pub entity_a: Entity,
    pub entity_b: Entity,
    pub kind: ContactKind,
}
