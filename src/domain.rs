//! The domain module encapsulates the core simulation logic: geometry and
//! collision tests, the sensor fan, the robot steering state machine and the
//! world that orchestrates them.
//!
//! Everything here is synchronous and single-threaded; the scheduler decides
//! when and under which lock the tick entry points run.

mod basis;
mod collision;
mod robot;
mod sensor;
mod world;

pub use basis::{Angle, Position, Vec2};
pub use collision::{circle_rect_overlaps, rect_overlap, Circle, Rect, RectOverlap};
pub use robot::{MotionState, Robot, BODY_RADIUS, DEFAULT_SPEED};
pub use sensor::{Ray, SensorConfig, SensorSnapshot};
pub use world::{Mover, ObstacleId, World, WorldConfig, WorldError};
