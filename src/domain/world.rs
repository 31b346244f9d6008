//! The arena: obstacle set, robot set and the per-subsystem ticks.
//!
//! The world exposes three independently invocable tick entry points so each
//! can run at its own cadence: `advance_motion` (robots plus moving
//! obstacles), `refresh_sensors` (all robots) and `advance_steering` (all
//! robots). Construction performs randomized non-overlapping placement of
//! every obstacle, robot body and goal marker.

use rand::Rng;
use thiserror::Error;

use super::{
    circle_rect_overlaps, rect_overlap, Circle, Position, Ray, Rect, RectOverlap, Robot,
    SensorConfig, SensorSnapshot, Vec2, BODY_RADIUS,
};

const STATIC_OBSTACLE_WIDTH: f64 = 250.0;
const STATIC_OBSTACLE_HEIGHT: f64 = 150.0;
const MOVING_OBSTACLE_SIDE: f64 = 50.0;

/// Placement candidates are sampled this far short of the arena extent so
/// obstacles spawn mostly inside it.
const PLACEMENT_MARGIN: f64 = 100.0;

/// Rejection-sampling bound per placed entity; past it the arena is
/// considered too dense to populate.
const MAX_PLACEMENT_ATTEMPTS: usize = 1000;

#[derive(Error, Debug)]
pub enum WorldError {
    #[error("arena too dense: no non-overlapping placement found in {attempts} attempts")]
    ArenaTooDense { attempts: usize },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldConfig {
    pub arena_width: f64,
    pub arena_height: f64,
    pub num_static: usize,
    pub num_moving: usize,
    pub num_robots: usize,
    pub sensor: SensorConfig,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            arena_width: 1600.0,
            arena_height: 1200.0,
            num_static: 7,
            num_moving: 7,
            num_robots: 3,
            sensor: SensorConfig::default(),
        }
    }
}

/// Epoch-stamped handle into the world's obstacle collection. A rebuilt
/// world carries a new epoch, so handles issued by a previous world resolve
/// to `None` instead of silently aliasing another obstacle.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ObstacleId {
    index: usize,
    epoch: u64,
}

/// Velocity annotation on one obstacle. Does not own the rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mover {
    target: ObstacleId,
    velocity: Vec2,
}

impl Mover {
    pub fn target(&self) -> ObstacleId {
        self.target
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct World {
    config: WorldConfig,
    epoch: u64,
    obstacles: Vec<Rect>,
    movers: Vec<Mover>,
    robots: Vec<Robot>,
    moving: bool,
}

impl World {
    pub fn new(config: WorldConfig, rng: &mut impl Rng) -> Result<Self, WorldError> {
        Self::with_epoch(config, rng, 0)
    }

    /// Rebuilds the arena with the same counts. The epoch is bumped, so all
    /// previously issued obstacle handles stop resolving.
    pub fn rebuilt(&self, rng: &mut impl Rng) -> Result<Self, WorldError> {
        Self::with_epoch(self.config, rng, self.epoch + 1)
    }

    fn with_epoch(config: WorldConfig, rng: &mut impl Rng, epoch: u64) -> Result<Self, WorldError> {
        let mut obstacles = Vec::with_capacity(config.num_static + config.num_moving);
        let mut movers = Vec::with_capacity(config.num_moving);
        let mut robots = Vec::with_capacity(config.num_robots);

        for _ in 0..config.num_static {
            let rect = place_rect(
                rng,
                &config,
                STATIC_OBSTACLE_WIDTH,
                STATIC_OBSTACLE_HEIGHT,
                &obstacles,
            )?;
            obstacles.push(rect);
        }

        for _ in 0..config.num_moving {
            let rect = place_rect(
                rng,
                &config,
                MOVING_OBSTACLE_SIDE,
                MOVING_OBSTACLE_SIDE,
                &obstacles,
            )?;
            obstacles.push(rect);
            movers.push(Mover {
                target: ObstacleId {
                    index: obstacles.len() - 1,
                    epoch,
                },
                velocity: Vec2::new(100.0, 100.0),
            });
        }

        for _ in 0..config.num_robots {
            let body = place_circle(rng, &config, &obstacles)?;
            let goal = place_circle(rng, &config, &obstacles)?;
            robots.push(Robot::new(body.position(), goal.position(), &config.sensor));
        }

        Ok(Self {
            config,
            epoch,
            obstacles,
            movers,
            robots,
            moving: false,
        })
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn obstacles(&self) -> &[Rect] {
        &self.obstacles
    }

    pub fn movers(&self) -> &[Mover] {
        &self.movers
    }

    pub fn robots(&self) -> &[Robot] {
        &self.robots
    }

    pub fn is_moving(&self) -> bool {
        self.moving
    }

    /// Resolves an obstacle handle; `None` for handles issued by a world
    /// with a different epoch.
    pub fn obstacle(&self, id: ObstacleId) -> Option<&Rect> {
        if id.epoch != self.epoch {
            return None;
        }
        self.obstacles.get(id.index)
    }

    pub fn toggle_movement(&mut self) {
        self.moving = !self.moving;
    }

    /// Adds `delta` to every robot's speed, floor-clamped at zero.
    pub fn adjust_speed(&mut self, delta: f64) {
        for robot in &mut self.robots {
            robot.adjust_speed(delta);
        }
    }

    pub fn all_robots_stopped(&self) -> bool {
        self.robots.iter().all(|r| !r.is_moving())
    }

    /// Motion tick: integrates every robot and advances every mover. A
    /// no-op while the global movement flag is off.
    pub fn advance_motion(&mut self, dt: f64) {
        if !self.moving {
            return;
        }

        for robot in &mut self.robots {
            robot.integrate(dt);
        }

        self.advance_movers(dt);
    }

    /// Steering tick: updates every robot's heading from its latest sensor
    /// snapshot and goal vector. A no-op while the movement flag is off.
    pub fn advance_steering(&mut self, dt: f64) {
        if !self.moving {
            return;
        }

        for robot in &mut self.robots {
            robot.steer(dt);
        }
    }

    /// Sensing tick: re-casts every robot's ray fan from its current
    /// position and heading and swaps in the finished snapshots. Runs
    /// regardless of the movement flag.
    pub fn refresh_sensors(&mut self) {
        let snapshots: Vec<_> = (0..self.robots.len()).map(|i| self.cast_rays(i)).collect();
        for (robot, snapshot) in self.robots.iter_mut().zip(snapshots) {
            robot.set_snapshot(snapshot);
        }
    }

    fn advance_movers(&mut self, dt: f64) {
        for m in 0..self.movers.len() {
            let Some(index) = self.resolve(self.movers[m].target) else {
                continue;
            };
            let rect = self.obstacles[index];
            let mut velocity = self.movers[m].velocity;

            // The displacement is captured before any reflection: a bounce
            // changes direction starting from the next tick only.
            let displacement = velocity * dt;

            // Elastic reflection against the first obstacle the predicted
            // position would hit, self excluded.
            let predicted = rect.translated(displacement);
            for (j, other) in self.obstacles.iter().enumerate() {
                if j == index {
                    continue;
                }
                match rect_overlap(&predicted, other) {
                    RectOverlap::AxisX => {
                        velocity.x = -velocity.x;
                        break;
                    }
                    RectOverlap::AxisY => {
                        velocity.y = -velocity.y;
                        break;
                    }
                    RectOverlap::None => {}
                }
            }

            // Arena bounds are checked on the current, not predicted, rect.
            if rect.left() < 0.0 || rect.right() > self.config.arena_width {
                velocity.x = -velocity.x;
            }
            if rect.top() < 0.0 || rect.bottom() > self.config.arena_height {
                velocity.y = -velocity.y;
            }

            self.movers[m].velocity = velocity;
            self.obstacles[index] = rect.translated(displacement);
        }
    }

    /// Marches the ray fan of robot `index` against arena bounds, obstacle
    /// rectangles and the other robots' bodies. The dominant hot path: no
    /// allocation beyond the snapshot itself.
    fn cast_rays(&self, index: usize) -> SensorSnapshot {
        let sensor = &self.config.sensor;
        let robot = &self.robots[index];
        let origin = robot.body().position();
        let heading = robot.heading();

        let mut rays = Vec::with_capacity(sensor.num_rays);
        for i in 0..sensor.num_rays {
            let direction = sensor.ray_direction(heading, i);

            let mut distance = sensor.max_range;
            let mut r = 0.0;
            while r < sensor.max_range {
                let point = origin + direction * r;
                if self.outside_arena(point)
                    || self.obstacles.iter().any(|o| o.contains(point))
                    || self
                        .robots
                        .iter()
                        .enumerate()
                        .any(|(j, other)| j != index && other.body().contains(point))
                {
                    distance = r;
                    break;
                }
                r += sensor.step;
            }

            rays.push(Ray {
                distance,
                direction,
            });
        }

        SensorSnapshot::new(rays, sensor.max_range)
    }

    fn outside_arena(&self, point: Position) -> bool {
        point.x() < 0.0
            || point.x() >= self.config.arena_width
            || point.y() < 0.0
            || point.y() >= self.config.arena_height
    }

    fn resolve(&self, id: ObstacleId) -> Option<usize> {
        (id.epoch == self.epoch && id.index < self.obstacles.len()).then_some(id.index)
    }
}

fn place_rect(
    rng: &mut impl Rng,
    config: &WorldConfig,
    width: f64,
    height: f64,
    existing: &[Rect],
) -> Result<Rect, WorldError> {
    for _ in 0..MAX_PLACEMENT_ATTEMPTS {
        let candidate = Rect::new(sample_position(rng, config), width, height);
        if existing
            .iter()
            .all(|o| rect_overlap(&candidate, o) == RectOverlap::None)
        {
            return Ok(candidate);
        }
    }
    Err(WorldError::ArenaTooDense {
        attempts: MAX_PLACEMENT_ATTEMPTS,
    })
}

fn place_circle(
    rng: &mut impl Rng,
    config: &WorldConfig,
    obstacles: &[Rect],
) -> Result<Circle, WorldError> {
    for _ in 0..MAX_PLACEMENT_ATTEMPTS {
        let candidate = Circle::new(sample_position(rng, config), BODY_RADIUS);
        if obstacles.iter().all(|o| !circle_rect_overlaps(&candidate, o)) {
            return Ok(candidate);
        }
    }
    Err(WorldError::ArenaTooDense {
        attempts: MAX_PLACEMENT_ATTEMPTS,
    })
}

fn sample_position(rng: &mut impl Rng, config: &WorldConfig) -> Position {
    Position::new(
        rng.random_range(0.0..config.arena_width - PLACEMENT_MARGIN),
        rng.random_range(0.0..config.arena_height - PLACEMENT_MARGIN),
    )
}
