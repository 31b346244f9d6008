//! Goal-seeking robot with a reactive obstacle-avoidance override.
//!
//! A robot is a circular body with a heading, a forward speed and a goal
//! marker. Steering blends two behaviors: a proportional turn toward the
//! goal, and a fixed-rate turn away from the nearest sensed obstacle, with
//! avoidance taking full precedence whenever any ray reports an obstacle
//! closer than [`AVOID_DISTANCE`].

use super::{Angle, Circle, Position, SensorConfig, SensorSnapshot};

/// Radius of a robot body and of its goal marker.
pub const BODY_RADIUS: f64 = 20.0;

/// Forward speed of a freshly constructed robot, units per second.
pub const DEFAULT_SPEED: f64 = 150.0;

/// Nearest-ray distance below which avoidance overrides goal-seeking.
const AVOID_DISTANCE: f64 = 70.0;

/// Fixed turn rate while avoiding, radians per second.
const AVOID_TURN_RATE: f64 = 6.0;

/// Proportional gain of the goal-seeking controller.
const GOAL_GAIN: f64 = 2.0;

/// Steering state machine. `Stopped` is terminal until an external reset.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum MotionState {
    #[default]
    Moving,
    Stopped,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Robot {
    body: Circle,
    heading: Angle,
    speed: f64,
    goal: Circle,
    state: MotionState,
    snapshot: SensorSnapshot,
}

impl Robot {
    pub fn new(position: Position, goal: Position, sensor: &SensorConfig) -> Self {
        let heading = Angle::default();
        Self {
            body: Circle::new(position, BODY_RADIUS),
            heading,
            speed: DEFAULT_SPEED,
            goal: Circle::new(goal, BODY_RADIUS),
            state: MotionState::default(),
            snapshot: SensorSnapshot::saturated(sensor, heading),
        }
    }

    pub fn body(&self) -> Circle {
        self.body
    }

    pub fn goal(&self) -> Circle {
        self.goal
    }

    pub fn heading(&self) -> Angle {
        self.heading
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn state(&self) -> MotionState {
        self.state
    }

    pub fn is_moving(&self) -> bool {
        self.state == MotionState::Moving
    }

    pub fn snapshot(&self) -> &SensorSnapshot {
        &self.snapshot
    }

    pub fn set_position(&mut self, position: Position) {
        self.body.set_position(position);
    }

    pub fn set_goal_position(&mut self, position: Position) {
        self.goal.set_position(position);
    }

    pub fn set_heading(&mut self, heading: Angle) {
        self.heading = heading;
    }

    /// Replaces the stored sweep with a freshly computed one.
    pub fn set_snapshot(&mut self, snapshot: SensorSnapshot) {
        self.snapshot = snapshot;
    }

    /// Adds `delta` to the forward speed, floor-clamped at zero.
    pub fn adjust_speed(&mut self, delta: f64) {
        self.speed = (self.speed + delta).max(0.0);
    }

    /// True once the body and goal circles intersect (strict inequality on
    /// the squared center distance).
    pub fn goal_reached(&self) -> bool {
        let radius_sum = self.body.radius() + self.goal.radius();
        self.body.position().distance_squared(self.goal.position()) < radius_sum.powi(2)
    }

    /// Motion integration: advances the body along the heading, then runs
    /// the goal test, which may transition to `Stopped`.
    pub fn integrate(&mut self, dt: f64) {
        if !self.is_moving() {
            return;
        }

        let displacement = self.heading.unit_vector() * self.speed * dt;
        self.body.set_position(self.body.position() + displacement);

        if self.goal_reached() {
            self.state = MotionState::Stopped;
        }
    }

    /// Steering update: turns away from the nearest sensed obstacle when one
    /// is within [`AVOID_DISTANCE`], otherwise turns toward the goal with a
    /// proportional controller.
    pub fn steer(&mut self, dt: f64) {
        if !self.is_moving() {
            return;
        }

        let desired = Angle::towards(self.body.position(), self.goal.position());
        let diff = desired.signed_diff(self.heading);

        let (min_index, min_distance) = self.snapshot.nearest();
        if min_distance < AVOID_DISTANCE {
            // Nearest ray in the left half of the fan: turn right, and vice
            // versa. Overrides goal-seeking entirely.
            let ray_center = (self.snapshot.rays().len() - 1) as f64 / 2.0;
            let turn = if (min_index as f64) < ray_center {
                1.0
            } else {
                -1.0
            };
            self.heading = self.heading + Angle::new(turn * AVOID_TURN_RATE * dt);
        } else {
            self.heading = self.heading + Angle::new(f64::from(diff) * GOAL_GAIN * dt);
        }
    }
}
