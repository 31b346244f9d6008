//! Basic building blocks.

use std::{
    f64::consts::{PI, TAU},
    ops::{Add, Neg, Sub},
};

use nalgebra::Vector2;

/// Free 2D vector: directions, velocities, displacements.
pub type Vec2 = Vector2<f64>;

#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct Position {
    x: f64,
    y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn distance(&self, position: Self) -> f64 {
        self.distance_squared(position).sqrt()
    }

    pub fn distance_squared(&self, position: Self) -> f64 {
        (self.x - position.x).powi(2) + (self.y - position.y).powi(2)
    }
}

impl Add<Vec2> for Position {
    type Output = Position;

    fn add(self, rhs: Vec2) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl Sub for Position {
    type Output = Vec2;

    fn sub(self, rhs: Self) -> Self::Output {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl From<Position> for (f64, f64) {
    fn from(value: Position) -> Self {
        (value.x, value.y)
    }
}

/// Angle in radians. Headings are not range-wrapped; differences between
/// angles are always normalized into (−π, π].
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct Angle(f64);

impl Angle {
    pub fn new(radians: f64) -> Self {
        Self(radians)
    }

    /// Direction from `from` toward `to`.
    pub fn towards(from: Position, to: Position) -> Self {
        let v = to - from;
        Self(v.y.atan2(v.x))
    }

    /// Signed difference `self − other`, normalized into (−π, π].
    pub fn signed_diff(self, other: Angle) -> Angle {
        let mut d = (self.0 - other.0).rem_euclid(TAU);
        if d > PI {
            d -= TAU;
        }
        Angle(d)
    }

    pub fn unit_vector(self) -> Vec2 {
        Vec2::new(self.0.cos(), self.0.sin())
    }
}

impl Neg for Angle {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Angle(-self.0)
    }
}

impl Add for Angle {
    type Output = Angle;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl From<Angle> for f64 {
    fn from(value: Angle) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use approx::{assert_abs_diff_eq, AbsDiffEq};
    use rstest::rstest;

    use super::*;

    #[test]
    fn test_position() {
        let position = Position::new(1.0, 2.0);
        assert_abs_diff_eq!(position.x(), 1.0);
        assert_abs_diff_eq!(position.y(), 2.0);
        assert_abs_diff_eq!(position.distance_squared(Position::new(4.0, 6.0)), 25.0);
        assert_abs_diff_eq!(position.distance(Position::new(4.0, 6.0)), 5.0);
    }

    #[test]
    fn test_position_translate() {
        let position = Position::new(1.0, 2.0) + Vec2::new(0.5, -0.5);
        assert_abs_diff_eq!(position, Position::new(1.5, 1.5));
    }

    #[rstest]
    #[case::east(Position::new(1.0, 0.0), 0.0)]
    #[case::north(Position::new(0.0, 1.0), 0.5 * PI)]
    #[case::west(Position::new(-1.0, 0.0), PI)]
    #[case::south(Position::new(0.0, -1.0), -0.5 * PI)]
    fn test_angle_towards(#[case] to: Position, #[case] expected: f64) {
        let angle = Angle::towards(Position::default(), to);
        assert_abs_diff_eq!(Into::<f64>::into(angle), expected);
    }

    #[rstest]
    #[case::zero(0.0, 0.0, 0.0)]
    #[case::small_positive(0.5, 0.25, 0.25)]
    #[case::small_negative(0.25, 0.5, -0.25)]
    #[case::wraps_positive(0.75 * PI, -0.75 * PI, -0.5 * PI)]
    #[case::wraps_negative(-0.75 * PI, 0.75 * PI, 0.5 * PI)]
    #[case::half_turn_maps_to_pi(PI, 0.0, PI)]
    #[case::unwrapped_operands(5.0 * PI, 0.0, PI)]
    fn test_angle_signed_diff(#[case] a: f64, #[case] b: f64, #[case] expected: f64) {
        let diff = Angle::new(a).signed_diff(Angle::new(b));
        assert_abs_diff_eq!(Into::<f64>::into(diff), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_angle_unit_vector() {
        let v = Angle::new(0.5 * PI).unit_vector();
        assert_abs_diff_eq!(v.x, 0.0, epsilon = 1e-15);
        assert_abs_diff_eq!(v.y, 1.0);
    }

    impl AbsDiffEq for Position {
        type Epsilon = f64;

        fn default_epsilon() -> f64 {
            f64::EPSILON
        }

        fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
            f64::abs_diff_eq(&self.x, &other.x, epsilon)
                && f64::abs_diff_eq(&self.y, &other.y, epsilon)
        }
    }
}
