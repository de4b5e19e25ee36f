use glam::Vec2;
use hecs::{Entity, World};

use crate::components::{
    Aabb, Body, Collider, ColliderType, ContactEvent, ContactKind, Transform, JITTER_THRESHOLD,
};

/// Restitution multiplier applied to a body each time it bounces.
pub const RESTITUTION_DECAY: f32 = 0.98;

/// Vertical speed below which a circle touching a rectangle's top settles.
pub const GROUNDING_SPEED: f32 = 0.2;

/// Gap left between a settled circle and the surface beneath it.
pub const GROUND_CLEARANCE: f32 = 0.01;

/// Outward speed added to a bounce that would otherwise be snapped to rest.
pub const BOUNCE_NUDGE: f32 = 0.2;

/// Overlap between two round shapes. `normal` points from a toward b.
struct Overlap {
    normal: Vec2,
    penetration: f32,
}

fn round_overlap(a: Aabb, b: Aabb) -> Option<Overlap> {
    let delta = b.center - a.center;
    let distance = delta.length();
    let penetration = (a.half_extents.x + b.half_extents.x) - distance;
    if distance == 0.0 || penetration <= 0.0 {
        return None;
    }
    Some(Overlap {
        normal: delta / distance,
        penetration,
    })
}

/// 1D elastic collision formula applied to both axes at once.
/// Returns the new `(va, vb)` before any restitution scaling.
pub fn elastic_velocities(mass_a: f32, va: Vec2, mass_b: f32, vb: Vec2) -> (Vec2, Vec2) {
    let total = mass_a + mass_b;
    let new_a = ((mass_a - mass_b) / total) * va + (2.0 * mass_b / total) * vb;
    let new_b = ((mass_b - mass_a) / total) * vb + (2.0 * mass_a / total) * va;
    (new_a, new_b)
}

fn reflect(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

fn refresh_bounds(ecs: &mut World, entity: Entity) -> Option<Aabb> {
    let (transform, collider) = ecs
        .query_one_mut::<(&Transform, &mut Collider)>(entity)
        .ok()?;
    Some(collider.update_bounds(transform))
}

fn body_of(ecs: &World, entity: Entity) -> Option<Body> {
    ecs.get::<&Body>(entity).ok().map(|body| *body)
}

fn write_body(ecs: &mut World, entity: Entity, body: Body) {
    if let Ok(mut stored) = ecs.get::<&mut Body>(entity) {
        *stored = body;
    }
}

fn translate(ecs: &mut World, entity: Entity, offset: Vec2) {
    if let Ok(mut transform) = ecs.get::<&mut Transform>(entity) {
        let position = transform.position2() + offset;
        transform.set_position2(position);
    }
}

/// Shared mass-weighted separation and elastic exchange for round pairs.
/// Only bodies flagged in `decay` lose restitution.
fn resolve_round_pair(ecs: &mut World, a: Entity, b: Entity, decay: (bool, bool)) -> Option<()> {
    let bounds_a = refresh_bounds(ecs, a)?;
    let bounds_b = refresh_bounds(ecs, b)?;
    let overlap = round_overlap(bounds_a, bounds_b)?;

    let mut body_a = body_of(ecs, a)?;
    let mut body_b = body_of(ecs, b)?;
    let (mass_a, mass_b) = (body_a.mass(), body_b.mass());
    let total = mass_a + mass_b;
    if mass_a <= 0.0 || mass_b <= 0.0 || total <= 0.0 {
        return None;
    }

    // Each side moves by the other side's share of the total mass.
    translate(ecs, a, -overlap.normal * overlap.penetration * (mass_b / total));
    translate(ecs, b, overlap.normal * overlap.penetration * (mass_a / total));

    let (va, vb) = elastic_velocities(mass_a, body_a.velocity(), mass_b, body_b.velocity());
    let scale_a = if decay.0 { body_a.decay_restitution(RESTITUTION_DECAY) } else { 1.0 };
    let scale_b = if decay.1 { body_b.decay_restitution(RESTITUTION_DECAY) } else { 1.0 };
    body_a.set_velocity(va * scale_a);
    body_b.set_velocity(vb * scale_b);

    write_body(ecs, a, body_a);
    write_body(ecs, b, body_b);
    Some(())
}

pub fn circle_circle(ecs: &mut World, a: Entity, b: Entity) -> Option<ContactKind> {
    resolve_round_pair(ecs, a, b, (true, true))?;
    Some(ContactKind::CircleCircle)
}

/// `point` survives only until the caller removes it; its restitution is left alone.
pub fn point_circle(ecs: &mut World, point: Entity, circle: Entity) -> Option<ContactKind> {
    resolve_round_pair(ecs, point, circle, (false, true))?;
    Some(ContactKind::PointCircle)
}

pub fn point_rectangle(ecs: &mut World, point: Entity, rect: Entity) -> Option<ContactKind> {
    let point_bounds = refresh_bounds(ecs, point)?;
    let rect_bounds = refresh_bounds(ecs, rect)?;
    rect_bounds
        .contains(point_bounds.center)
        .then_some(ContactKind::PointRectangle)
}

/// Clamped-point test against the rectangle, then either settle the circle on
/// the top edge or reflect it off the contact normal.
pub fn circle_rectangle(ecs: &mut World, circle: Entity, rect: Entity) -> Option<ContactKind> {
    let circle_bounds = refresh_bounds(ecs, circle)?;
    let rect_bounds = refresh_bounds(ecs, rect)?;
    let radius = circle_bounds.half_extents.x;
    let center = circle_bounds.center;

    let closest = rect_bounds.closest_point(center);
    let offset = center - closest;
    if offset.length_squared() >= radius * radius {
        return None;
    }

    let mut body = body_of(ecs, circle)?;
    let (min, max) = (rect_bounds.min(), rect_bounds.max());
    let touching_top = (center.y - max.y).abs() < radius;
    let within_span = center.x - radius >= min.x && center.x + radius <= max.x;
    let on_top = touching_top && within_span;

    if on_top && body.velocity().y.abs() < GROUNDING_SPEED {
        body.set_velocity(Vec2::ZERO);
        body.set_grounded(true);
        write_body(ecs, circle, body);
        if let Ok(mut transform) = ecs.get::<&mut Transform>(circle) {
            transform.position.y = max.y + radius + GROUND_CLEARANCE;
        }
        return Some(ContactKind::Grounded);
    }

    let distance = offset.length();
    if distance == 0.0 {
        return None;
    }
    let normal = offset / distance;

    if !on_top {
        body.set_grounded(false);
    }
    let restitution = body.decay_restitution(RESTITUTION_DECAY);
    let mut velocity = reflect(body.velocity(), normal) * restitution;
    if velocity.length() < JITTER_THRESHOLD {
        velocity += normal * BOUNCE_NUDGE;
    }
    body.set_velocity(velocity);
    write_body(ecs, circle, body);

    translate(ecs, circle, normal * (radius - distance));
    Some(ContactKind::CircleRectangle)
}

/// Whether `circle` still sits on top of `rect`, within the clearance a
/// settled circle is given.
pub fn rests_on(ecs: &mut World, circle: Entity, rect: Entity) -> bool {
    match ecs.get::<&Collider>(rect) {
        Ok(collider) if collider.kind == ColliderType::AxisAlignedRectangle => {}
        _ => return false,
    }
    let (Some(circle_bounds), Some(rect_bounds)) = (refresh_bounds(ecs, circle), refresh_bounds(ecs, rect)) else {
        return false;
    };
    let radius = circle_bounds.half_extents.x;
    let center = circle_bounds.center;
    let gap = center.y - rect_bounds.max().y;
    let within_span = center.x - radius >= rect_bounds.min().x && center.x + radius <= rect_bounds.max().x;
    within_span && gap >= 0.0 && gap <= radius + 2.0 * GROUND_CLEARANCE
}

/// Picks the routine for an unordered pair by collider type.
/// Mixed pairs are reordered so the event's `entity_a` is the point, or the
/// circle when facing a rectangle.
pub fn resolve_pair(ecs: &mut World, a: Entity, b: Entity) -> Option<ContactEvent> {
    let kind_a = ecs.get::<&Collider>(a).ok()?.kind;
    let kind_b = ecs.get::<&Collider>(b).ok()?.kind;

    use ColliderType::*;
    let (first, second, kind) = match (kind_a, kind_b) {
        (Circle, Circle) => (a, b, circle_circle(ecs, a, b)?),
        (Circle, AxisAlignedRectangle) => (a, b, circle_rectangle(ecs, a, b)?),
        (AxisAlignedRectangle, Circle) => (b, a, circle_rectangle(ecs, b, a)?),
        (Point, AxisAlignedRectangle) => (a, b, point_rectangle(ecs, a, b)?),
        (AxisAlignedRectangle, Point) => (b, a, point_rectangle(ecs, b, a)?),
        (Point, Circle) => (a, b, point_circle(ecs, a, b)?),
        (Circle, Point) => (b, a, point_circle(ecs, b, a)?),
        (Point, Point) | (AxisAlignedRectangle, AxisAlignedRectangle) => return None,
    };

    Some(ContactEvent {
        entity_a: first,
        entity_b: second,
        kind,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn_circle(ecs: &mut World, position: Vec2, diameter: f32, body: Body) -> Entity {
        ecs.spawn((
            Transform::new(position).with_scale(Vec2::splat(diameter)),
            Collider::circle(),
            body,
        ))
    }

    fn spawn_rect(ecs: &mut World, position: Vec2, size: Vec2) -> Entity {
        ecs.spawn((Transform::new(position).with_scale(size), Collider::rectangle()))
    }

    fn spawn_point(ecs: &mut World, position: Vec2, body: Body) -> Entity {
        ecs.spawn((Transform::new(position), Collider::point(), body))
    }

    fn position(ecs: &World, entity: Entity) -> Vec2 {
        ecs.get::<&Transform>(entity).unwrap().position2()
    }

    fn body(ecs: &World, entity: Entity) -> Body {
        *ecs.get::<&Body>(entity).unwrap()
    }

    #[test]
    fn elastic_exchange_conserves_momentum() {
        let cases = [
            (1.0, Vec2::new(3.0, -1.0), 2.0, Vec2::new(-4.0, 0.5)),
            (0.5, Vec2::new(0.0, 2.0), 7.0, Vec2::new(1.0, 1.0)),
            (4.0, Vec2::ZERO, 4.0, Vec2::new(-2.0, 9.0)),
        ];
        for (ma, va, mb, vb) in cases {
            let (na, nb) = elastic_velocities(ma, va, mb, vb);
            let before = ma * va + mb * vb;
            let after = ma * na + mb * nb;
            assert!((before - after).length() < 1e-4, "{before:?} vs {after:?}");
        }
    }

    #[test]
    fn equal_circles_swap_velocities() {
        let mut ecs = World::new();
        let a = spawn_circle(&mut ecs, Vec2::new(-0.45, 0.0), 1.0, Body::new(1.0).with_velocity(Vec2::X));
        let b = spawn_circle(&mut ecs, Vec2::new(0.45, 0.0), 1.0, Body::new(1.0).with_velocity(-Vec2::X));

        assert_eq!(circle_circle(&mut ecs, a, b), Some(ContactKind::CircleCircle));
        assert!((body(&ecs, a).velocity().x + 0.98).abs() < 1e-5);
        assert!((body(&ecs, b).velocity().x - 0.98).abs() < 1e-5);
        assert!((body(&ecs, a).restitution() - 0.98).abs() < 1e-6);
    }

    #[test]
    fn heavier_circle_is_pushed_less() {
        let mut ecs = World::new();
        let light = spawn_circle(&mut ecs, Vec2::new(-0.4, 0.0), 1.0, Body::new(1.0));
        let heavy = spawn_circle(&mut ecs, Vec2::new(0.4, 0.0), 1.0, Body::new(3.0));

        circle_circle(&mut ecs, light, heavy);
        // penetration 0.2 split 3:1
        assert!((position(&ecs, light).x + 0.55).abs() < 1e-5);
        assert!((position(&ecs, heavy).x - 0.45).abs() < 1e-5);
    }

    #[test]
    fn coincident_circles_are_left_alone() {
        let mut ecs = World::new();
        let a = spawn_circle(&mut ecs, Vec2::ZERO, 1.0, Body::new(1.0).with_velocity(Vec2::X));
        let b = spawn_circle(&mut ecs, Vec2::ZERO, 1.0, Body::new(1.0));
        assert_eq!(circle_circle(&mut ecs, a, b), None);
        assert_eq!(body(&ecs, a).velocity(), Vec2::X);
        assert_eq!(body(&ecs, a).restitution(), 1.0);
    }

    #[test]
    fn circle_without_body_is_not_collidable() {
        let mut ecs = World::new();
        let a = spawn_circle(&mut ecs, Vec2::new(-0.4, 0.0), 1.0, Body::new(1.0));
        let b = ecs.spawn((
            Transform::new(Vec2::new(0.4, 0.0)),
            Collider::circle(),
        ));
        assert_eq!(circle_circle(&mut ecs, a, b), None);
        assert_eq!(position(&ecs, a), Vec2::new(-0.4, 0.0));
    }

    #[test]
    fn slow_circle_settles_on_top_edge() {
        let mut ecs = World::new();
        let ball = spawn_circle(&mut ecs, Vec2::new(0.0, 0.4), 1.0, Body::new(1.0));
        let floor = spawn_rect(&mut ecs, Vec2::new(0.0, -0.5), Vec2::new(10.0, 1.0));

        assert_eq!(circle_rectangle(&mut ecs, ball, floor), Some(ContactKind::Grounded));
        let settled = body(&ecs, ball);
        assert!(settled.is_grounded());
        assert_eq!(settled.velocity(), Vec2::ZERO);
        assert!((position(&ecs, ball).y - 0.51).abs() < 1e-6);
    }

    #[test]
    fn fast_circle_bounces_off_rectangle() {
        let mut ecs = World::new();
        let ball = spawn_circle(
            &mut ecs,
            Vec2::new(0.0, 0.4),
            1.0,
            Body::new(1.0).with_velocity(Vec2::new(1.0, -5.0)),
        );
        let floor = spawn_rect(&mut ecs, Vec2::new(0.0, -0.5), Vec2::new(10.0, 1.0));

        assert_eq!(circle_rectangle(&mut ecs, ball, floor), Some(ContactKind::CircleRectangle));
        let bounced = body(&ecs, ball);
        assert!((bounced.velocity() - Vec2::new(0.98, 4.9)).length() < 1e-4);
        assert!(!bounced.is_grounded());
        assert!((position(&ecs, ball).y - 0.5).abs() < 1e-5);
    }

    #[test]
    fn weak_bounce_gets_nudged_outward() {
        let mut ecs = World::new();
        // Hitting the side wall slowly, so no grounding.
        let ball = spawn_circle(&mut ecs, Vec2::new(-5.4, 0.0), 1.0, Body::new(1.0));
        let wall = spawn_rect(&mut ecs, Vec2::ZERO, Vec2::new(10.0, 4.0));

        circle_rectangle(&mut ecs, ball, wall);
        assert_eq!(body(&ecs, ball).velocity(), Vec2::new(-BOUNCE_NUDGE, 0.0));
    }

    #[test]
    fn circle_off_the_edge_is_not_grounded() {
        let mut ecs = World::new();
        let mut resting = Body::new(1.0);
        resting.set_grounded(true);
        let ball = spawn_circle(&mut ecs, Vec2::new(4.8, 0.4), 1.0, resting);
        let floor = spawn_rect(&mut ecs, Vec2::new(0.0, -0.5), Vec2::new(10.0, 1.0));

        assert_eq!(circle_rectangle(&mut ecs, ball, floor), Some(ContactKind::CircleRectangle));
        assert!(!body(&ecs, ball).is_grounded());
    }

    #[test]
    fn settled_circle_rests_until_it_leaves_the_span() {
        let mut ecs = World::new();
        let floor = spawn_rect(&mut ecs, Vec2::new(0.0, -0.5), Vec2::new(10.0, 1.0));
        let ball = spawn_circle(&mut ecs, Vec2::new(0.0, 0.51), 1.0, Body::new(1.0));
        assert!(rests_on(&mut ecs, ball, floor));

        ecs.get::<&mut Transform>(ball).unwrap().position.x = 4.8;
        assert!(!rests_on(&mut ecs, ball, floor));

        ecs.get::<&mut Transform>(ball).unwrap().position = glam::Vec3::new(0.0, 0.8, 0.0);
        assert!(!rests_on(&mut ecs, ball, floor));
    }

    #[test]
    fn point_inside_rectangle_hits() {
        let mut ecs = World::new();
        let rect = spawn_rect(&mut ecs, Vec2::ZERO, Vec2::splat(2.0));
        let inside = spawn_point(&mut ecs, Vec2::ZERO, Body::new(1.0));
        let outside = spawn_point(&mut ecs, Vec2::new(2.0, 2.0), Body::new(1.0));

        assert_eq!(point_rectangle(&mut ecs, inside, rect), Some(ContactKind::PointRectangle));
        assert_eq!(point_rectangle(&mut ecs, outside, rect), None);
    }

    #[test]
    fn point_circle_only_decays_circle() {
        let mut ecs = World::new();
        let point = spawn_point(&mut ecs, Vec2::new(-0.45, 0.0), Body::new(1.0).with_velocity(Vec2::new(4.0, 0.0)));
        let ball = spawn_circle(&mut ecs, Vec2::ZERO, 1.0, Body::new(1.0));

        assert_eq!(point_circle(&mut ecs, point, ball), Some(ContactKind::PointCircle));
        assert_eq!(body(&ecs, point).restitution(), 1.0);
        assert!((body(&ecs, ball).restitution() - 0.98).abs() < 1e-6);
        assert!((body(&ecs, ball).velocity().x - 3.92).abs() < 1e-5);
    }

    #[test]
    fn pair_dispatch_is_order_independent() {
        let mut ecs = World::new();
        let rect = spawn_rect(&mut ecs, Vec2::ZERO, Vec2::splat(2.0));
        let point = spawn_point(&mut ecs, Vec2::new(0.5, 0.5), Body::new(1.0));

        let event = resolve_pair(&mut ecs, rect, point).unwrap();
        assert_eq!(event.kind, ContactKind::PointRectangle);
        assert_eq!(event.entity_a, point);
        assert_eq!(event.entity_b, rect);
    }

    #[test]
    fn like_rectangles_never_interact() {
        let mut ecs = World::new();
        let a = spawn_rect(&mut ecs, Vec2::ZERO, Vec2::splat(2.0));
        let b = spawn_rect(&mut ecs, Vec2::ZERO, Vec2::splat(2.0));
        assert!(resolve_pair(&mut ecs, a, b).is_none());
    }
}
