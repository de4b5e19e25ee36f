use std::path::PathBuf;

use anyhow::Context;
use cannonfire::app::Simulation;
use cannonfire::components::Transform;
use cannonfire::scene::{load_scene, Scene, DEMO_SCENE};
use clap::Parser;

#[derive(Parser)]
#[command(name = "cannonfire", about = "Headless cannon range simulation")]
struct Args {
    /// JSON scene to load. Uses the built-in demo range when omitted.
    #[arg(long)]
    scene: Option<PathBuf>,

    /// Simulated seconds to run.
    #[arg(long, default_value_t = 10.0)]
    seconds: f32,

    /// Render frames per second driving the fixed-step accumulator.
    #[arg(long, default_value_t = 60.0)]
    fps: f32,

    /// Fire the cannon every N seconds. Never fires when omitted.
    #[arg(long)]
    fire_every: Option<f32>,

    /// Degrees to rotate the barrel before the first shot.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    aim: f32,

    /// Log filter, e.g. `debug` or `cannonfire::physics=trace`. Overrides RUST_LOG.
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let env = env_logger::Env::default().default_filter_or("info");
    let mut logger = env_logger::Builder::from_env(env);
    if let Some(filter) = &args.log_level {
        logger.parse_filters(filter);
    }
    logger.init();

    let scene = match &args.scene {
        Some(path) => load_scene(path).with_context(|| format!("loading {}", path.display()))?,
        None => Scene::from_json_str(DEMO_SCENE).context("parsing built-in demo scene")?,
    };
    anyhow::ensure!(args.fps > 0.0, "--fps must be positive");

    let mut sim = Simulation::from_scene(&scene);
    sim.aim(args.aim.to_radians());

    let preview = sim.preview(90);
    if let (Some(first), Some(last)) = (preview.first(), preview.last()) {
        log::info!("aim preview: {first:.2} -> {last:.2} over {} steps", preview.len() - 1);
    }

    let frame_dt = 1.0 / args.fps;
    let frames = (args.seconds * args.fps).ceil() as u64;
    let mut since_shot = f32::INFINITY;
    for _ in 0..frames {
        if let Some(every) = args.fire_every {
            since_shot += frame_dt;
            if since_shot >= every && sim.fire().is_some() {
                since_shot = 0.0;
            }
        }
        sim.update(frame_dt);
    }

    let stats = sim.stats();
    log::info!(
        "{} steps, {} shots, {} target hits, {} projectiles destroyed, {} spawned",
        stats.steps,
        stats.shots_fired,
        stats.target_hits,
        stats.projectiles_destroyed,
        stats.spawned
    );
    for (target, hits) in sim.target_hits() {
        let position = sim
            .ecs
            .get::<&Transform>(target)
            .map(|t| t.position2())
            .unwrap_or_default();
        log::info!("target at {position:.2}: {hits} hits");
    }
    log::info!("{} bodies still simulated", sim.physics.bodies().len());
    Ok(())
}
