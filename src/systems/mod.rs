mod cannon;
mod scripted;
mod spawner;

pub use cannon::{cannon_cooldown_system, cannon_preview, fire_cannon, predict_trajectory};
pub use scripted::scripted_path_system;
pub use spawner::spawner_system;
