use hecs::World;

use crate::components::{Body, ScriptedPath, Transform};

/// Carries entities along their [`ScriptedPath`].
///
/// Entities whose body is not kinematic are skipped; the engine owns those.
pub fn scripted_path_system(ecs: &mut World, dt: f32) {
    for (_entity, (transform, path, body)) in
        ecs.query_mut::<(&mut Transform, &mut ScriptedPath, Option<&Body>)>()
    {
        if body.is_some_and(|b| !b.is_kinematic()) {
            continue;
        }
        let Some(&goal) = path.waypoints.get(path.next) else {
            continue;
        };

        let position = transform.position2();
        let to_goal = goal - position;
        let step = path.speed * dt;
        if to_goal.length() <= step {
            transform.set_position2(goal);
            path.advance();
        } else {
            transform.set_position2(position + to_goal.normalize() * step);
        }
    }
}
