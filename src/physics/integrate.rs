use glam::Vec2;

use crate::components::{Body, Transform};

/// Downward pull per unit of mass and gravity scale.
pub const GRAVITY_CONSTANT: f32 = -9.81;

/// Whole-vector velocity multiplier applied after gravity each step.
pub const DAMPING: f32 = 0.99;

/// Velocity multiplier while a gravity delay is counting down.
pub const DELAY_DECAY: f32 = 0.99;

/// Advances one body's velocity by `dt`.
///
/// Kinematic bodies are untouched. A pending gravity delay takes the pure-decay
/// branch, grounded bodies keep whatever velocity they hold, and everything else
/// gets mass-scaled gravity plus its own acceleration, then damping.
pub fn integrate_velocity(body: &mut Body, dt: f32) {
    if body.is_kinematic() {
        return;
    }

    if body.gravity_delay() > 0.0 {
        body.reduce_gravity_delay(dt);
        body.set_velocity(body.velocity() * DELAY_DECAY);
        return;
    }

    if body.is_grounded() {
        return;
    }

    // Gravity scales with mass on purpose; bounce tuning depends on it.
    let gravity_force = GRAVITY_CONSTANT * body.gravity_scale() * body.mass();
    let acceleration = body.acceleration() + Vec2::new(0.0, gravity_force);
    let velocity = (body.velocity() + acceleration * dt) * DAMPING;
    body.set_velocity(velocity);
}

/// Moves the owner by the body's velocity. Kinematic owners are left to the host.
pub fn integrate_position(transform: &mut Transform, body: &Body, dt: f32) {
    if body.is_kinematic() {
        return;
    }
    let position = transform.position2() + body.velocity() * dt;
    transform.set_position2(position);
}
