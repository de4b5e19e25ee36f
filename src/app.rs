use glam::Vec2;
use hecs::{Entity, World};

use crate::components::{Cannon, ContactKind, HitCount, Projectile, Target};
use crate::engine::time::FixedStep;
use crate::physics::{PhysicsWorld, StepReport};
use crate::scene::Scene;
use crate::systems::{
    cannon_cooldown_system, cannon_preview, fire_cannon, scripted_path_system, spawner_system,
};

/// Totals collected over the lifetime of a [`Simulation`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SimStats {
    pub steps: u64,
    pub shots_fired: u32,
    pub target_hits: u32,
    pub projectiles_destroyed: u32,
    pub spawned: u32,
}

/// Entity store, physics registries and fixed-step driver for one game.
pub struct Simulation {
    pub ecs: World,
    pub physics: PhysicsWorld,
    cannon: Option<Entity>,
    stepper: FixedStep,
    stats: SimStats,
}

impl Simulation {
    pub fn new(dt: f32) -> Self {
        Self {
            ecs: World::new(),
            physics: PhysicsWorld::new(),
            cannon: None,
            stepper: FixedStep::new(dt),
            stats: SimStats::default(),
        }
    }

    pub fn from_scene(scene: &Scene) -> Self {
        let mut sim = Self::new(scene.settings.dt);
        sim.stepper.max_steps = scene.settings.max_steps_per_frame;
        sim.cannon = scene.populate(&mut sim.ecs, &mut sim.physics);
        sim
    }

    pub fn cannon(&self) -> Option<Entity> {
        self.cannon
    }

    pub fn stats(&self) -> SimStats {
        self.stats
    }

    pub fn dt(&self) -> f32 {
        self.stepper.dt
    }

    /// Render interpolation factor between the last two physics steps.
    pub fn alpha(&self) -> f32 {
        self.stepper.alpha()
    }

    pub fn aim(&mut self, delta: f32) {
        if let Some(mut cannon) = self.cannon.and_then(|e| self.ecs.get::<&mut Cannon>(e).ok()) {
            cannon.aim(delta);
        }
    }

    pub fn fire(&mut self) -> Option<Entity> {
        let projectile = fire_cannon(&mut self.ecs, &mut self.physics, self.cannon?)?;
        self.stats.shots_fired += 1;
        Some(projectile)
    }

    pub fn preview(&self, steps: usize) -> Vec<Vec2> {
        match self.cannon {
            Some(cannon) => cannon_preview(&self.ecs, cannon, self.stepper.dt, steps),
            None => Vec::new(),
        }
    }

    pub fn live_projectiles(&self) -> usize {
        self.ecs.query::<&Projectile>().iter().count()
    }

    /// Hit counts per target entity.
    pub fn target_hits(&self) -> Vec<(Entity, u32)> {
        self.ecs
            .query::<(&Target, &HitCount)>()
            .iter()
            .map(|(entity, (_target, hits))| (entity, hits.0))
            .collect()
    }

    /// Advances one rendered frame: host systems at frame rate, then as many
    /// fixed physics steps as the accumulated time allows.
    pub fn update(&mut self, frame_dt: f32) -> Vec<StepReport> {
        cannon_cooldown_system(&mut self.ecs, frame_dt);
        let spawned = spawner_system(&mut self.ecs, &mut self.physics, frame_dt);
        self.stats.spawned += spawned.len() as u32;
        scripted_path_system(&mut self.ecs, frame_dt);

        let steps = self.stepper.advance(frame_dt);
        let mut reports = Vec::with_capacity(steps);
        for _ in 0..steps {
            let report = self.physics.step(&mut self.ecs, self.stepper.dt);
            self.stats.steps += 1;
            self.record(&report);
            reports.push(report);
        }
        reports
    }

    fn record(&mut self, report: &StepReport) {
        self.stats.projectiles_destroyed += report.destroyed.len() as u32;
        for contact in &report.contacts {
            if !matches!(
                contact.kind,
                ContactKind::PointRectangle | ContactKind::CircleRectangle | ContactKind::Grounded
            ) {
                continue;
            }
            if let Ok(mut hits) = self.ecs.get::<&mut HitCount>(contact.entity_b) {
                hits.0 += 1;
                self.stats.target_hits += 1;
                log::info!("target {:?} hit ({} total)", contact.entity_b, hits.0);
            }
        }
    }
}
