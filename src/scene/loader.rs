use std::path::{Path, PathBuf};

use glam::Vec2;
use hecs::{Entity, World};
use serde::Deserialize;
use thiserror::Error;

use crate::components::{Body, Cannon, ProjectileTemplate, ScriptedPath, SpawnTemplate, Spawner};
use crate::physics::{PhysicsWorld, PHYSICS_DT};
use crate::scene::prefabs::{
    spawn_ball, spawn_block, spawn_cannon, spawn_moving_target, spawn_spawner, spawn_target,
};

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("failed to read scene {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed scene: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid scene: {0}")]
    Invalid(String),
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct SceneSettings {
    /// Fixed physics step in seconds.
    pub dt: f32,
    pub max_steps_per_frame: usize,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            dt: PHYSICS_DT,
            max_steps_per_frame: 8,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct CannonSpec {
    pub position: Vec2,
    /// Degrees counter-clockwise from +x.
    pub angle: f32,
    pub power: f32,
    #[serde(default)]
    pub min_angle: Option<f32>,
    #[serde(default)]
    pub max_angle: Option<f32>,
    #[serde(default)]
    pub reload_time: Option<f32>,
    #[serde(default)]
    pub projectile: ProjectileTemplate,
}

fn one() -> f32 {
    1.0
}

#[derive(Clone, Debug, Deserialize)]
pub struct BallSpec {
    pub position: Vec2,
    pub diameter: f32,
    #[serde(default = "one")]
    pub mass: f32,
    #[serde(default)]
    pub velocity: Vec2,
    #[serde(default = "one")]
    pub restitution: f32,
    #[serde(default = "one")]
    pub gravity_scale: f32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct BlockSpec {
    pub position: Vec2,
    pub size: Vec2,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TargetSpec {
    pub position: Vec2,
    pub size: Vec2,
    /// Waypoints for a moving target, at least two. `position` is ignored
    /// when present.
    #[serde(default)]
    pub path: Vec<Vec2>,
    #[serde(default = "one")]
    pub speed: f32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SpawnerSpec {
    pub position: Vec2,
    pub interval: f32,
    #[serde(default)]
    pub max_alive: Option<usize>,
    pub template: SpawnTemplate,
}

/// Everything a level file describes.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Scene {
    pub settings: SceneSettings,
    pub cannon: Option<CannonSpec>,
    pub balls: Vec<BallSpec>,
    pub blocks: Vec<BlockSpec>,
    pub targets: Vec<TargetSpec>,
    pub spawners: Vec<SpawnerSpec>,
}

/// Reads, parses and validates a scene file.
pub fn load_scene(path: impl AsRef<Path>) -> Result<Scene, SceneError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| SceneError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let scene = Scene::from_json_str(&text)?;
    log::info!(
        "loaded scene {} ({} balls, {} blocks, {} targets, {} spawners)",
        path.display(),
        scene.balls.len(),
        scene.blocks.len(),
        scene.targets.len(),
        scene.spawners.len()
    );
    Ok(scene)
}

fn positive(value: f32, what: &str) -> Result<(), SceneError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(SceneError::Invalid(format!("{what} must be positive, got {value}")))
    }
}

impl Scene {
    pub fn from_json_str(text: &str) -> Result<Self, SceneError> {
        let scene: Scene = serde_json::from_str(text)?;
        scene.validate()?;
        Ok(scene)
    }

    pub fn validate(&self) -> Result<(), SceneError> {
        positive(self.settings.dt, "settings.dt")?;
        if self.settings.max_steps_per_frame == 0 {
            return Err(SceneError::Invalid("settings.max_steps_per_frame must be at least 1".into()));
        }
        if let Some(cannon) = &self.cannon {
            positive(cannon.power, "cannon.power")?;
            positive(cannon.projectile.mass, "cannon.projectile.mass")?;
            positive(cannon.projectile.size, "cannon.projectile.size")?;
        }
        for (i, ball) in self.balls.iter().enumerate() {
            positive(ball.diameter, &format!("balls[{i}].diameter"))?;
            positive(ball.mass, &format!("balls[{i}].mass"))?;
        }
        for (i, block) in self.blocks.iter().enumerate() {
            positive(block.size.min_element(), &format!("blocks[{i}].size"))?;
        }
        for (i, target) in self.targets.iter().enumerate() {
            positive(target.size.min_element(), &format!("targets[{i}].size"))?;
            if target.path.len() == 1 {
                return Err(SceneError::Invalid(format!("targets[{i}].path needs at least two waypoints")));
            }
            if !target.path.is_empty() {
                positive(target.speed, &format!("targets[{i}].speed"))?;
            }
        }
        for (i, spawner) in self.spawners.iter().enumerate() {
            positive(spawner.interval, &format!("spawners[{i}].interval"))?;
            match spawner.template {
                SpawnTemplate::Ball { diameter, mass, .. } => {
                    positive(diameter, &format!("spawners[{i}].template.diameter"))?;
                    positive(mass, &format!("spawners[{i}].template.mass"))?;
                }
                SpawnTemplate::Target { size } => {
                    positive(size.min_element(), &format!("spawners[{i}].template.size"))?;
                }
            }
        }
        Ok(())
    }

    /// Spawns every entity into `ecs` and registers it with `physics`.
    /// Returns the cannon entity, if the scene has one.
    pub fn populate(&self, ecs: &mut World, physics: &mut PhysicsWorld) -> Option<Entity> {
        for block in &self.blocks {
            spawn_block(ecs, physics, block.position, block.size);
        }
        for target in &self.targets {
            if target.path.len() >= 2 {
                let path = ScriptedPath::new(target.path.clone(), target.speed);
                spawn_moving_target(ecs, physics, path, target.size);
            } else {
                spawn_target(ecs, physics, target.position, target.size);
            }
        }
        for ball in &self.balls {
            let body = Body::new(ball.mass)
                .with_velocity(ball.velocity)
                .with_restitution(ball.restitution)
                .with_gravity_scale(ball.gravity_scale);
            spawn_ball(ecs, physics, ball.position, ball.diameter, body);
        }
        for spec in &self.spawners {
            let mut spawner = Spawner::new(spec.position, spec.interval, spec.template);
            if let Some(max_alive) = spec.max_alive {
                spawner.max_alive = max_alive;
            }
            spawn_spawner(ecs, spawner);
        }

        self.cannon.as_ref().map(|spec| {
            let mut cannon = Cannon::new(spec.angle.to_radians(), spec.power);
            if let Some(min) = spec.min_angle {
                cannon.min_angle = min.to_radians();
            }
            if let Some(max) = spec.max_angle {
                cannon.max_angle = max.to_radians();
            }
            if let Some(reload) = spec.reload_time {
                cannon.reload_time = reload;
            }
            cannon.angle = cannon.angle.clamp(cannon.min_angle, cannon.max_angle);
            cannon.projectile = spec.projectile;
            spawn_cannon(ecs, spec.position, cannon)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Collider, Target};

    const SCENE: &str = r#"{
        "settings": { "dt": 0.02 },
        "cannon": { "position": [0, 1], "angle": 45, "power": 12,
                    "projectile": { "shape": "circle", "size": 0.4 } },
        "balls": [ { "position": [3, 4], "diameter": 1, "mass": 2 } ],
        "blocks": [ { "position": [0, -0.5], "size": [40, 1] } ],
        "targets": [
            { "position": [10, 2], "size": [1, 2] },
            { "position": [0, 0], "size": [1, 1], "path": [[12, 1], [12, 6]], "speed": 2 }
        ],
        "spawners": [ { "position": [5, 8], "interval": 2,
                        "template": { "kind": "ball", "diameter": 0.5, "mass": 1 } } ]
    }"#;

    #[test]
    fn parses_and_populates() {
        let scene = Scene::from_json_str(SCENE).unwrap();
        assert_eq!(scene.settings.dt, 0.02);
        assert_eq!(scene.settings.max_steps_per_frame, 8);

        let mut ecs = World::new();
        let mut physics = PhysicsWorld::new();
        let cannon = scene.populate(&mut ecs, &mut physics).unwrap();

        let cannon = *ecs.get::<&Cannon>(cannon).unwrap();
        assert!((cannon.angle - std::f32::consts::FRAC_PI_4).abs() < 1e-5);
        assert_eq!(physics.colliders().len(), 4);
        // the ball and the moving target's kinematic body
        assert_eq!(physics.bodies().len(), 2);
        assert_eq!(ecs.query::<&Target>().iter().count(), 2);
        assert_eq!(ecs.query::<&Spawner>().iter().count(), 1);
        assert_eq!(ecs.query::<&Collider>().iter().count(), 4);
    }

    #[test]
    fn missing_sections_default() {
        let scene = Scene::from_json_str("{}").unwrap();
        assert!(scene.cannon.is_none());
        assert_eq!(scene.settings.dt, PHYSICS_DT);
    }

    #[test]
    fn rejects_non_positive_mass() {
        let err = Scene::from_json_str(r#"{ "balls": [ { "position": [0, 0], "diameter": 1, "mass": 0 } ] }"#)
            .unwrap_err();
        assert!(matches!(err, SceneError::Invalid(msg) if msg.contains("balls[0].mass")));
    }

    #[test]
    fn rejects_single_waypoint_path() {
        let err = Scene::from_json_str(
            r#"{ "targets": [ { "position": [0, 0], "size": [1, 1], "path": [[3, 3]] } ] }"#,
        )
        .unwrap_err();
        assert!(matches!(err, SceneError::Invalid(msg) if msg.contains("targets[0].path")));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(Scene::from_json_str("{ balls"), Err(SceneError::Parse(_))));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_scene("does/not/exist.json").unwrap_err();
        assert!(err.to_string().contains("does/not/exist.json"));
    }
}
