//! Collision detection based on basic shapes.
//!
//! Pure geometry, shared by placement validity checks, the ray marcher and
//! the moving-obstacle physics.

use super::{Position, Vec2};

/// Axis-aligned rectangle, addressed by its top-left corner.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Rect {
    position: Position,
    width: f64,
    height: f64,
}

impl Rect {
    pub const fn new(position: Position, width: f64, height: f64) -> Self {
        Self {
            position,
            width,
            height,
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn left(&self) -> f64 {
        self.position.x()
    }

    pub fn right(&self) -> f64 {
        self.position.x() + self.width
    }

    pub fn top(&self) -> f64 {
        self.position.y()
    }

    pub fn bottom(&self) -> f64 {
        self.position.y() + self.height
    }

    pub fn translated(&self, offset: Vec2) -> Self {
        Self {
            position: self.position + offset,
            ..*self
        }
    }

    pub fn contains(&self, point: Position) -> bool {
        point.x() >= self.left()
            && point.x() < self.right()
            && point.y() >= self.top()
            && point.y() < self.bottom()
    }
}

/// Circle, addressed by its center. Robot bodies and goal markers.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Circle {
    position: Position,
    radius: f64,
}

impl Circle {
    pub const fn new(position: Position, radius: f64) -> Self {
        Self { position, radius }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    pub fn contains(&self, point: Position) -> bool {
        self.position.distance_squared(point) < self.radius.powi(2)
    }
}

/// Outcome of a rectangle–rectangle test: no intersection, or the collision
/// axis picked by the minimum-translation heuristic.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RectOverlap {
    None,
    AxisX,
    AxisY,
}

/// Classifies the overlap of two rectangles. When they intersect, the axis
/// with the smaller penetration depth is reported; ties go to AxisY.
pub fn rect_overlap(a: &Rect, b: &Rect) -> RectOverlap {
    let overlap_x = a.left() < b.right() && a.right() > b.left();
    let overlap_y = a.top() < b.bottom() && a.bottom() > b.top();

    if !(overlap_x && overlap_y) {
        return RectOverlap::None;
    }

    let x_depth = (a.right() - b.left()).min(b.right() - a.left());
    let y_depth = (a.bottom() - b.top()).min(b.bottom() - a.top());

    if x_depth < y_depth {
        RectOverlap::AxisX
    } else {
        RectOverlap::AxisY
    }
}

/// True if the circle intersects the rectangle: clamps the circle center to
/// the rectangle to find the closest point, then compares squared distances.
pub fn circle_rect_overlaps(circle: &Circle, rect: &Rect) -> bool {
    let center = circle.position();
    let closest = Position::new(
        center.x().clamp(rect.left(), rect.right()),
        center.y().clamp(rect.top(), rect.bottom()),
    );
    center.distance_squared(closest) < circle.radius().powi(2)
}
