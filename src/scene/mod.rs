mod loader;
pub mod prefabs;

pub use loader::{
    load_scene, BallSpec, BlockSpec, CannonSpec, Scene, SceneError, SceneSettings, SpawnerSpec,
    TargetSpec,
};

/// Range used when no scene file is given: a cannon, a floor, a ball pit,
/// two fixed targets, a moving target and a ball dropper.
pub const DEMO_SCENE: &str = include_str!("../../scenes/demo.json");
