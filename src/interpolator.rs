use crate::error::{ConfigError, Result};
use crate::math::{normalize_or_none, shortest_line_to_path, Point2d, EPSILON};
use cgmath::prelude::*;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The parameters of a [PathInterpolator].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InterpolatorParams {
    /// How far ahead along the path the aim point is placed, in px.
    pub lookahead_distance: f64,
    /// Straying further than this from the path triggers a replan, in px.
    pub max_distance_to_path: f64,
}

impl Default for InterpolatorParams {
    fn default() -> Self {
        Self {
            lookahead_distance: 100.0,
            max_distance_to_path: 150.0,
        }
    }
}

impl InterpolatorParams {
    pub fn validate(&self) -> Result<()> {
        ConfigError::non_negative("lookahead_distance", self.lookahead_distance)?;
        ConfigError::positive("max_distance_to_path", self.max_distance_to_path)
    }
}

/// Turns a waypoint polyline into a single aim point ahead of the vehicle.
#[derive(Clone, Debug)]
pub struct PathInterpolator {
    params: InterpolatorParams,
}

impl PathInterpolator {
    /// Creates a new interpolator.
    pub fn new(params: InterpolatorParams) -> Self {
        Self { params }
    }

    pub fn lookahead_distance(&self) -> f64 {
        self.params.lookahead_distance
    }

    /// Changes the lookahead distance; negative or non-finite distances are
    /// rejected.
    pub fn set_lookahead_distance(&mut self, distance: f64) -> Result<()> {
        ConfigError::non_negative("lookahead_distance", distance)?;
        self.params.lookahead_distance = distance;
        Ok(())
    }

    /// Chooses the point the vehicle should steer towards.
    ///
    /// Close to the path, the aim point lies the lookahead distance ahead of the
    /// vehicle along the path. Far from the path, it lies the lookahead distance
    /// along the straight line back onto it. The lookahead never reaches past the
    /// last waypoint. Without a usable path, `final_target` is returned.
    pub fn interpolated_target(
        &self,
        position: Point2d,
        waypoints: &[Point2d],
        final_target: Point2d,
    ) -> Point2d {
        let (Some(proj), Some(last)) = (shortest_line_to_path(position, waypoints), waypoints.last())
        else {
            return final_target;
        };

        let lookahead = f64::min(self.params.lookahead_distance, position.distance(*last));

        if proj.distance >= lookahead {
            // Head straight back towards the path
            return match normalize_or_none(proj.cross_section - position) {
                Some(dir) => position + dir * lookahead,
                None => proj.cross_section,
            };
        }

        let mut remaining = lookahead - proj.distance;
        let mut from = proj.cross_section;
        for to in &waypoints[proj.segment + 1..] {
            let length = from.distance(*to);
            if remaining <= length {
                return if length < EPSILON {
                    from
                } else {
                    from + (*to - from) * (remaining / length)
                };
            }
            remaining -= length;
            from = *to;
        }

        final_target
    }

    /// Whether the vehicle has strayed far enough from the path to need a new one.
    pub fn needs_replanning(&self, position: Point2d, waypoints: &[Point2d]) -> bool {
        shortest_line_to_path(position, waypoints)
            .map_or(false, |proj| proj.distance > self.params.max_distance_to_path)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn interpolator() -> PathInterpolator {
        PathInterpolator::new(InterpolatorParams {
            lookahead_distance: 100.0,
            max_distance_to_path: 50.0,
        })
    }

    fn waypoints() -> Vec<Point2d> {
        vec![
            Point2d::new(0.0, 0.0),
            Point2d::new(50.0, 0.0),
            Point2d::new(150.0, 0.0),
        ]
    }

    #[test]
    fn stops_at_final_waypoint() {
        let target = interpolator().interpolated_target(
            Point2d::new(50.0, 0.0),
            &waypoints(),
            Point2d::new(999.0, 999.0),
        );
        assert_eq!(target, Point2d::new(150.0, 0.0));
    }

    #[test]
    fn steers_back_onto_path() {
        let target = interpolator().interpolated_target(
            Point2d::new(-1000.0, 0.0),
            &waypoints(),
            Point2d::new(999.0, 999.0),
        );
        assert_approx_eq!(target.x, -900.0);
        assert_approx_eq!(target.y, 0.0);
    }

    #[test]
    fn walks_across_segments() {
        let waypoints = vec![
            Point2d::new(0.0, 0.0),
            Point2d::new(30.0, 0.0),
            Point2d::new(30.0, 200.0),
        ];
        let target = interpolator().interpolated_target(
            Point2d::new(10.0, 5.0),
            &waypoints,
            Point2d::new(30.0, 200.0),
        );
        // 5 px off the path leaves 95 px: 20 px to the corner, then 75 px down
        assert_approx_eq!(target.x, 30.0);
        assert_approx_eq!(target.y, 75.0);
    }

    #[test]
    fn passthrough_without_path() {
        let final_target = Point2d::new(12.0, 34.0);
        for p in [Point2d::new(0.0, 0.0), Point2d::new(-50.0, 800.0)] {
            assert_eq!(interpolator().interpolated_target(p, &[], final_target), final_target);
            assert_eq!(
                interpolator().interpolated_target(p, &[Point2d::new(1.0, 1.0)], final_target),
                final_target
            );
        }
    }

    #[test]
    fn lookahead_limited_by_last_waypoint() {
        // The last waypoint is only 10 px away in a straight line, though 210 px along the path
        let waypoints = vec![
            Point2d::new(0.0, 0.0),
            Point2d::new(0.0, 100.0),
            Point2d::new(10.0, 100.0),
            Point2d::new(10.0, 0.0),
        ];
        let final_target = Point2d::new(10.0, -10.0);
        let target = interpolator().interpolated_target(
            Point2d::new(0.0, 0.0),
            &waypoints,
            final_target,
        );
        assert_approx_eq!(target.x, 0.0);
        assert_approx_eq!(target.y, 10.0);

        let near_end = interpolator().interpolated_target(
            Point2d::new(10.0, 95.0),
            &waypoints,
            final_target,
        );
        assert_eq!(near_end, Point2d::new(10.0, 0.0));
    }

    #[test]
    fn replanning_threshold() {
        let interpolator = interpolator();
        assert!(!interpolator.needs_replanning(Point2d::new(75.0, 49.0), &waypoints()));
        assert!(interpolator.needs_replanning(Point2d::new(75.0, 51.0), &waypoints()));
        assert!(!interpolator.needs_replanning(Point2d::new(75.0, 500.0), &[]));
    }
}
