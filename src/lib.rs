//! Fixed-step 2D physics for a cannon range: gravity integration, point,
//! circle and axis-aligned rectangle colliders, and the host systems that
//! aim, fire, spawn and script entities around them.

pub mod app;
pub mod components;
pub mod engine;
pub mod physics;
pub mod scene;
pub mod systems;
