//! Simulated range-sensor fan.
//!
//! Each robot carries a fan of rays spanning a forward-facing cone of π
//! radians centered on its heading. The marching itself lives in the world,
//! which owns the obstacle and robot context; this module defines the fan
//! geometry and the snapshot the marcher produces.

use std::f64::consts::{FRAC_PI_2, PI};

use super::{Angle, Vec2};

/// Fan parameters, fixed per snapshot and shared by all robots.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SensorConfig {
    /// Number of rays across the cone.
    pub num_rays: usize,
    /// Maximum sensing distance; rays that hit nothing saturate here.
    pub max_range: f64,
    /// Marching step along each ray.
    pub step: f64,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            num_rays: 32,
            max_range: 300.0,
            step: 5.0,
        }
    }
}

impl SensorConfig {
    /// Unit direction of ray `index`, sweeping from `heading − π/2` to
    /// `heading + π/2` in steps of `π / (num_rays − 1)`.
    pub fn ray_direction(&self, heading: Angle, index: usize) -> Vec2 {
        let angle_step = PI / (self.num_rays - 1) as f64;
        let angle = f64::from(heading) - FRAC_PI_2 + index as f64 * angle_step;
        Angle::new(angle).unit_vector()
    }
}

/// One measured ray: stopping distance and unit direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub distance: f64,
    pub direction: Vec2,
}

/// The latest full sweep. Replaced wholesale on every sensing tick; there is
/// no incremental merge.
#[derive(Clone, Debug, PartialEq)]
pub struct SensorSnapshot {
    rays: Vec<Ray>,
    max_range: f64,
}

impl SensorSnapshot {
    pub fn new(rays: Vec<Ray>, max_range: f64) -> Self {
        Self { rays, max_range }
    }

    /// A sweep in which every ray saturates at `max_range`; the state of a
    /// freshly constructed robot before its first sensing tick.
    pub fn saturated(config: &SensorConfig, heading: Angle) -> Self {
        let rays = (0..config.num_rays)
            .map(|i| Ray {
                distance: config.max_range,
                direction: config.ray_direction(heading, i),
            })
            .collect();
        Self::new(rays, config.max_range)
    }

    pub fn rays(&self) -> &[Ray] {
        &self.rays
    }

    pub fn max_range(&self) -> f64 {
        self.max_range
    }

    /// Index and distance of the minimum-distance ray. Ties keep the earlier
    /// (leftmost) index; an all-saturated sweep reports index 0 at
    /// `max_range`.
    pub fn nearest(&self) -> (usize, f64) {
        let mut min_index = 0;
        let mut min_distance = self.max_range;
        for (i, ray) in self.rays.iter().enumerate() {
            if ray.distance < min_distance {
                min_distance = ray.distance;
                min_index = i;
            }
        }
        (min_index, min_distance)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::leftmost(0, (0.0, -1.0))]
    #[case::center_left(15, ((PI / 62.0).cos(), -(PI / 62.0).sin()))]
    #[case::rightmost(31, (0.0, 1.0))]
    fn test_ray_direction_spans_forward_cone(#[case] index: usize, #[case] expected: (f64, f64)) {
        let config = SensorConfig::default();
        let dir = config.ray_direction(Angle::new(0.0), index);
        assert_abs_diff_eq!(dir.x, expected.0, epsilon = 1e-12);
        assert_abs_diff_eq!(dir.y, expected.1, epsilon = 1e-12);
    }

    #[test]
    fn test_ray_directions_are_unit_vectors() {
        let config = SensorConfig::default();
        for i in 0..config.num_rays {
            let dir = config.ray_direction(Angle::new(1.3), i);
            assert_abs_diff_eq!(dir.norm(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_saturated_snapshot() {
        let config = SensorConfig::default();
        let snapshot = SensorSnapshot::saturated(&config, Angle::new(0.0));
        assert_eq!(snapshot.rays().len(), config.num_rays);
        assert!(snapshot
            .rays()
            .iter()
            .all(|r| r.distance == config.max_range));
        assert_eq!(snapshot.nearest(), (0, config.max_range));
    }

    #[test]
    fn test_nearest_keeps_first_index_on_tie() {
        let config = SensorConfig::default();
        let saturated = SensorSnapshot::saturated(&config, Angle::new(0.0));
        let mut rays = saturated.rays().to_vec();
        rays[3].distance = 40.0;
        rays[7].distance = 40.0;
        let snapshot = SensorSnapshot::new(rays, config.max_range);
        assert_eq!(snapshot.nearest(), (3, 40.0));
    }
}
