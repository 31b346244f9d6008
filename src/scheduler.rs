//! Three cadenced update tasks sharing one world behind a single lock.
//!
//! Motion, sensing and steering each run on their own thread at their own
//! cadence. A task acquires the world lock for the whole duration of its
//! tick and releases it before sleeping, so other tasks only ever observe
//! whole ticks. There is no ordering guarantee between the tasks; `dt` is
//! the wall-clock time elapsed since the same task's previous tick, so runs
//! are not bit-reproducible.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{error, info};

use crate::domain::{Angle, Circle, Rect, World, WorldError};

pub type SharedWorld = Arc<Mutex<World>>;

#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("world lock poisoned by a failed task")]
    WorldLockPoisoned,
    #[error(transparent)]
    World(#[from] WorldError),
}

/// Per-task time source. Injected so tests can supply fixed `dt` sequences
/// instead of wall-clock readings.
pub trait Clock: Send {
    /// Time elapsed since the previous call; this call resets the origin.
    fn restart(&mut self) -> Duration;
}

pub struct WallClock {
    last: Instant,
}

impl WallClock {
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
        }
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for WallClock {
    fn restart(&mut self) -> Duration {
        let now = Instant::now();
        let dt = now - self.last;
        self.last = now;
        dt
    }
}

/// Sleep interval per task. These are fixed sleeps between ticks, not fixed
/// simulation timesteps.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SchedulerConfig {
    pub motion_interval: Duration,
    pub sensing_interval: Duration,
    pub steering_interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            motion_interval: Duration::from_millis(16),
            sensing_interval: Duration::from_millis(50),
            steering_interval: Duration::from_millis(50),
        }
    }
}

pub struct TaskHandles {
    motion: JoinHandle<()>,
    sensing: JoinHandle<()>,
    steering: JoinHandle<()>,
}

impl TaskHandles {
    /// Waits for all tasks; a panicked task is logged, not propagated.
    pub fn join(self) {
        for (name, handle) in [
            ("motion", self.motion),
            ("sensing", self.sensing),
            ("steering", self.steering),
        ] {
            if let Err(e) = handle.join() {
                error!("{} task panicked: {:?}", name, e);
            }
        }
    }
}

/// Spawns the three update tasks with wall-clock time.
pub fn spawn(world: SharedWorld, running: Arc<AtomicBool>, config: SchedulerConfig) -> TaskHandles {
    spawn_with_clocks(world, running, config, WallClock::new)
}

/// Spawns the three update tasks with a caller-supplied time source.
pub fn spawn_with_clocks<C, F>(
    world: SharedWorld,
    running: Arc<AtomicBool>,
    config: SchedulerConfig,
    mut make_clock: F,
) -> TaskHandles
where
    C: Clock + 'static,
    F: FnMut() -> C,
{
    info!(
        "spawning simulation tasks (motion {:?}, sensing {:?}, steering {:?})",
        config.motion_interval, config.sensing_interval, config.steering_interval
    );

    let motion = {
        let world = Arc::clone(&world);
        let running = Arc::clone(&running);
        let mut clock = make_clock();
        thread::Builder::new()
            .name("motion".into())
            .spawn(move || {
                run_task(&world, &running, config.motion_interval, |world| {
                    let dt = clock.restart();
                    world.advance_motion(dt.as_secs_f64());
                });
            })
            .expect("failed to spawn motion task")
    };

    let sensing = {
        let world = Arc::clone(&world);
        let running = Arc::clone(&running);
        thread::Builder::new()
            .name("sensing".into())
            .spawn(move || {
                run_task(&world, &running, config.sensing_interval, |world| {
                    world.refresh_sensors();
                });
            })
            .expect("failed to spawn sensing task")
    };

    let steering = {
        let world = Arc::clone(&world);
        let running = Arc::clone(&running);
        let mut clock = make_clock();
        thread::Builder::new()
            .name("steering".into())
            .spawn(move || {
                run_task(&world, &running, config.steering_interval, |world| {
                    let dt = clock.restart();
                    world.advance_steering(dt.as_secs_f64());
                });
            })
            .expect("failed to spawn steering task")
    };

    TaskHandles {
        motion,
        sensing,
        steering,
    }
}

/// Task body: acquire, tick, release, sleep, until the running flag drops.
/// The flag is polled at the top of the loop, so shutdown latency is bounded
/// by one sleep interval.
fn run_task(
    world: &SharedWorld,
    running: &AtomicBool,
    interval: Duration,
    mut tick: impl FnMut(&mut World),
) {
    while running.load(Ordering::Acquire) {
        {
            let Ok(mut world) = world.lock() else {
                error!("world lock poisoned, task exiting");
                return;
            };
            tick(&mut world);
        }
        thread::sleep(interval);
    }
}

/// Read-only copy of one robot's drawable state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RobotView {
    pub body: Circle,
    pub goal: Circle,
    pub heading: Angle,
    pub stopped: bool,
}

/// Read-only copy of everything the UI collaborator draws. Taken under the
/// world lock and consumed outside it; holds no indices into the world.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderSnapshot {
    pub robots: Vec<RobotView>,
    pub obstacles: Vec<Rect>,
    pub moving: bool,
}

impl RenderSnapshot {
    fn capture(world: &World) -> Self {
        Self {
            robots: world
                .robots()
                .iter()
                .map(|r| RobotView {
                    body: r.body(),
                    goal: r.goal(),
                    heading: r.heading(),
                    stopped: !r.is_moving(),
                })
                .collect(),
            obstacles: world.obstacles().to_vec(),
            moving: world.is_moving(),
        }
    }

    /// Status readout for the UI, derived from the global movement flag.
    pub fn status_label(&self) -> &'static str {
        if self.moving {
            "Moving"
        } else {
            "Stopped"
        }
    }
}

/// Command and query surface handed to the UI/input collaborator. Every
/// operation serializes through the same world lock as the update tasks.
pub struct SimHandle {
    world: SharedWorld,
    running: Arc<AtomicBool>,
}

impl SimHandle {
    pub fn new(world: SharedWorld, running: Arc<AtomicBool>) -> Self {
        Self { world, running }
    }

    /// Flips the global movement flag; returns the new state.
    pub fn toggle_movement(&self) -> Result<bool, SchedulerError> {
        let mut world = self.lock()?;
        world.toggle_movement();
        Ok(world.is_moving())
    }

    /// Adds `delta` to every robot's speed, floor-clamped at zero.
    pub fn adjust_speed(&self, delta: f64) -> Result<(), SchedulerError> {
        self.lock()?.adjust_speed(delta);
        Ok(())
    }

    /// Replaces the whole world with a freshly placed arena using the same
    /// counts. The new world starts paused; all previously issued obstacle
    /// handles stop resolving.
    pub fn reset(&self) -> Result<(), SchedulerError> {
        let mut rng = rand::rng();
        let mut world = self.lock()?;
        *world = world.rebuilt(&mut rng)?;
        info!("world reset");
        Ok(())
    }

    pub fn render_snapshot(&self) -> Result<RenderSnapshot, SchedulerError> {
        Ok(RenderSnapshot::capture(&*self.lock()?))
    }

    pub fn all_robots_stopped(&self) -> Result<bool, SchedulerError> {
        Ok(self.lock()?.all_robots_stopped())
    }

    /// Signals all tasks to exit after their current sleep interval.
    pub fn shutdown(&self) {
        self.running.store(false, Ordering::Release);
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, World>, SchedulerError> {
        self.world
            .lock()
            .map_err(|_| SchedulerError::WorldLockPoisoned)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use crate::domain::WorldConfig;

    use super::*;

    struct FixedClock(Duration);

    impl Clock for FixedClock {
        fn restart(&mut self) -> Duration {
            self.0
        }
    }

    fn shared_world(seed: u64, config: WorldConfig) -> SharedWorld {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        Arc::new(Mutex::new(World::new(config, &mut rng).unwrap()))
    }

    #[test]
    fn test_tasks_tick_and_shut_down_within_a_cadence() {
        let config = WorldConfig {
            num_static: 1,
            num_moving: 1,
            num_robots: 1,
            ..WorldConfig::default()
        };
        let world = shared_world(3, config);
        let running = Arc::new(AtomicBool::new(true));
        let handle = SimHandle::new(Arc::clone(&world), Arc::clone(&running));

        let initial = handle.render_snapshot().unwrap();
        assert_eq!(initial.status_label(), "Stopped");
        assert!(handle.toggle_movement().unwrap());

        let scheduler_config = SchedulerConfig {
            motion_interval: Duration::from_millis(1),
            sensing_interval: Duration::from_millis(1),
            steering_interval: Duration::from_millis(1),
        };
        let tasks = spawn_with_clocks(
            Arc::clone(&world),
            Arc::clone(&running),
            scheduler_config,
            || FixedClock(Duration::from_millis(10)),
        );

        thread::sleep(Duration::from_millis(50));
        handle.shutdown();
        tasks.join();

        let after = handle.render_snapshot().unwrap();
        assert_eq!(after.status_label(), "Moving");
        let moved_or_done = after.robots[0].stopped
            || after.robots[0].body.position() != initial.robots[0].body.position();
        assert!(moved_or_done);
        // The mover advanced too.
        assert!(after.obstacles != initial.obstacles);
    }

    #[test]
    fn test_sim_handle_commands() {
        let world = shared_world(5, WorldConfig::default());
        let running = Arc::new(AtomicBool::new(true));
        let handle = SimHandle::new(Arc::clone(&world), running);

        handle.adjust_speed(0.5).unwrap();
        {
            let world = world.lock().unwrap();
            assert!(world.robots().iter().all(|r| r.speed() == 150.5));
        }

        handle.reset().unwrap();
        {
            let world = world.lock().unwrap();
            // Reset rebuilds with the same counts and starts paused.
            assert_eq!(world.robots().len(), 3);
            assert_eq!(world.obstacles().len(), 14);
            assert!(!world.is_moving());
            assert!(world.robots().iter().all(|r| r.speed() == 150.0));
        }
    }

    #[test]
    fn test_render_snapshot_matches_world_state() {
        let world = shared_world(9, WorldConfig::default());
        let running = Arc::new(AtomicBool::new(true));
        let handle = SimHandle::new(Arc::clone(&world), running);

        let snapshot = handle.render_snapshot().unwrap();
        let world = world.lock().unwrap();
        assert_eq!(snapshot.robots.len(), world.robots().len());
        assert_eq!(snapshot.obstacles.len(), world.obstacles().len());
        for (view, robot) in snapshot.robots.iter().zip(world.robots()) {
            assert_eq!(view.body, robot.body());
            assert_eq!(view.goal, robot.goal());
            assert_eq!(view.stopped, !robot.is_moving());
        }
    }
}
