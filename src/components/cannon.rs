use glam::Vec2;
use hecs::Entity;
use serde::Deserialize;

/// Shape given to fired projectiles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectileShape {
    /// Destroyed on the first rectangle or circle it touches.
    #[default]
    Point,
    /// Bounces around like any other ball.
    Circle,
}

/// What a cannon spawns each time it fires.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct ProjectileTemplate {
    pub shape: ProjectileShape,
    pub mass: f32,
    /// Diameter for circle projectiles. Ignored for points.
    pub size: f32,
    /// Seconds of straight flight before gravity takes over.
    pub gravity_delay: f32,
}

impl Default for ProjectileTemplate {
    fn default() -> Self {
        Self {
            shape: ProjectileShape::Point,
            mass: 1.0,
            size: 0.3,
            gravity_delay: 0.0,
        }
    }
}

/// Aimable launcher. Angles are radians counter-clockwise from +x.
#[derive(Clone, Copy, Debug)]
pub struct Cannon {
    pub angle: f32,
    pub min_angle: f32,
    pub max_angle: f32,
    pub power: f32,
    /// Distance from the cannon origin to where projectiles appear.
    pub muzzle_length: f32,
    /// Seconds between shots.
    pub reload_time: f32,
    pub cooldown: f32,
    pub projectile: ProjectileTemplate,
}

impl Cannon {
    pub fn new(angle: f32, power: f32) -> Self {
        Self {
            angle: angle.clamp(0.0, std::f32::consts::PI),
            min_angle: 0.0,
            max_angle: std::f32::consts::PI,
            power,
            muzzle_length: 1.0,
            reload_time: 0.5,
            cooldown: 0.0,
            projectile: ProjectileTemplate::default(),
        }
    }

    /// Rotates the barrel by `delta`, clamped to the allowed arc.
    pub fn aim(&mut self, delta: f32) {
        self.angle = (self.angle + delta).clamp(self.min_angle, self.max_angle);
    }

    pub fn direction(&self) -> Vec2 {
        Vec2::from_angle(self.angle)
    }

    pub fn launch_velocity(&self) -> Vec2 {
        self.direction() * self.power
    }

    pub fn is_ready(&self) -> bool {
        self.cooldown <= 0.0
    }

    pub fn tick(&mut self, dt: f32) {
        self.cooldown = (self.cooldown - dt).max(0.0);
    }
}

/// Prefab a [`Spawner`] produces.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpawnTemplate {
    Ball {
        diameter: f32,
        mass: f32,
        #[serde(default)]
        velocity: Vec2,
    },
    Target {
        size: Vec2,
    },
}

/// Periodically spawns a prefab at a fixed position.
#[derive(Clone, Debug)]
pub struct Spawner {
    pub position: Vec2,
    pub interval: f32,
    pub remaining: f32,
    /// Upper bound on live entities this spawner keeps around.
    pub max_alive: usize,
    pub template: SpawnTemplate,
    pub spawned: Vec<Entity>,
}

impl Spawner {
    pub fn new(position: Vec2, interval: f32, template: SpawnTemplate) -> Self {
        Self {
            position,
            interval,
            remaining: 0.0,
            max_alive: usize::MAX,
            template,
            spawned: Vec::new(),
        }
    }
}

/// Moves a kinematic entity back and forth along a polyline.
#[derive(Clone, Debug)]
pub struct ScriptedPath {
    pub waypoints: Vec<Vec2>,
    pub speed: f32,
    /// Reverse at the ends instead of wrapping to the first waypoint.
    pub ping_pong: bool,
    pub next: usize,
    pub forward: bool,
}

impl ScriptedPath {
    pub fn new(waypoints: Vec<Vec2>, speed: f32) -> Self {
        Self {
            waypoints,
            speed,
            ping_pong: true,
            next: 1,
            forward: true,
        }
    }

    /// Advances the waypoint cursor after `next` was reached.
    pub fn advance(&mut self) {
        let len = self.waypoints.len();
        if len < 2 {
            return;
        }
        if !self.ping_pong {
            self.next = (self.next + 1) % len;
            return;
        }
        if self.forward && self.next + 1 >= len {
            self.forward = false;
        } else if !self.forward && self.next == 0 {
            self.forward = true;
        }
        self.next = if self.forward { self.next + 1 } else { self.next - 1 };
    }
}
