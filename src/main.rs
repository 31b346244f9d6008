//! Headless driver for the arena simulation.
//!
//! Builds the default arena, spawns the motion/sensing/steering tasks and
//! monitors progress from the main thread until every robot has reached its
//! goal. Rendering and input are external collaborators; everything they
//! need goes through [`scheduler::SimHandle`].

use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::info;

use crate::domain::{World, WorldConfig};
use crate::scheduler::{SchedulerConfig, SimHandle};

mod domain;
mod scheduler;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("arena_sim=info".parse()?),
        )
        .init();

    let config = WorldConfig::default();
    info!(
        "arena {}x{}: {} static obstacles, {} moving, {} robots",
        config.arena_width,
        config.arena_height,
        config.num_static,
        config.num_moving,
        config.num_robots
    );

    let mut rng = rand::rng();
    let world = Arc::new(Mutex::new(World::new(config, &mut rng)?));
    let running = Arc::new(AtomicBool::new(true));

    let tasks = scheduler::spawn(
        Arc::clone(&world),
        Arc::clone(&running),
        SchedulerConfig::default(),
    );
    let handle = SimHandle::new(world, running);

    // Worlds start paused; this driver has no input device, so unpause now.
    handle.toggle_movement()?;

    loop {
        std::thread::sleep(Duration::from_millis(500));

        let snapshot = handle.render_snapshot()?;
        let stopped = snapshot.robots.iter().filter(|r| r.stopped).count();
        info!(
            "state: {}, {}/{} robots at their goal",
            snapshot.status_label(),
            stopped,
            snapshot.robots.len()
        );

        if handle.all_robots_stopped()? {
            info!("all robots reached their goals");
            break;
        }
    }

    handle.shutdown();
    tasks.join();
    Ok(())
}
