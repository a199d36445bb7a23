use crate::math::{normalize_or_none, shortest_line_to_path, Point2d, Vector2d, EPSILON};
use cgmath::prelude::*;

/// Unweighted path-following cost.
///
/// The squared distance to the path, plus a velocity term that rewards moving
/// along the path when on it and back towards it when off it. The two directions
/// are blended by `d / (d + blend)`, so the surface stays continuous as the
/// vehicle crosses the path. The velocity term is negative for well-aligned
/// motion.
pub fn waypoint_cost(
    position: Point2d,
    velocity: Vector2d,
    waypoints: &[Point2d],
    gain: f64,
    blend: f64,
) -> f64 {
    let Some(proj) = shortest_line_to_path(position, waypoints) else {
        return 0.0;
    };
    let distance_cost = proj.distance.powi(2);

    let speed = velocity.magnitude();
    let tangent = match normalize_or_none(waypoints[proj.segment + 1] - waypoints[proj.segment]) {
        Some(tangent) if speed >= EPSILON => tangent,
        _ => return distance_cost,
    };

    // Only velocity across the normal counts as along-path, so heading towards
    // and away from the path share the same along-path part.
    let normal = normalize_or_none(proj.cross_section - position);
    let toward = normal.map_or(0.0, |normal| velocity.dot(normal));
    let across = normal.map_or(velocity, |normal| velocity - normal * toward);
    let along = across.dot(tangent);
    let off_path = proj.distance / (proj.distance + blend);
    let alignment = ((1.0 - off_path) * along + off_path * toward) / speed;

    distance_cost + gain * speed * misalignment(alignment)
}

/// Strictly decreasing on [-1, 1]: -1 when perfectly aligned, 3 when opposed.
#[inline(always)]
fn misalignment(alignment: f64) -> f64 {
    0.5 * (1.0 - alignment).powi(2) - alignment
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    const GAIN: f64 = 5.0;
    const BLEND: f64 = 30.0;

    fn route() -> Vec<Point2d> {
        vec![Point2d::new(0.0, 0.0), Point2d::new(200.0, 0.0)]
    }

    fn cost(x: f64, y: f64, vx: f64, vy: f64) -> f64 {
        waypoint_cost(Point2d::new(x, y), Vector2d::new(vx, vy), &route(), GAIN, BLEND)
    }

    #[test]
    fn too_few_waypoints() {
        let one = [Point2d::new(5.0, 5.0)];
        assert_eq!(
            waypoint_cost(Point2d::new(0.0, 0.0), Vector2d::new(1.0, 0.0), &one, GAIN, BLEND),
            0.0
        );
    }

    #[test]
    fn stationary_is_distance_only() {
        assert_approx_eq!(cost(50.0, 20.0, 0.0, 0.0), 400.0);
    }

    #[test]
    fn on_path_rewards_forward_motion() {
        let forward = cost(50.0, 0.0, 10.0, 0.0);
        let sideways = cost(50.0, 0.0, 0.0, 10.0);
        let backward = cost(50.0, 0.0, -10.0, 0.0);
        assert_approx_eq!(forward, -GAIN * 10.0);
        assert!(forward < sideways);
        assert!(sideways < backward);
    }

    #[test]
    fn off_path_toward_beats_away() {
        for speed in [1.0, 10.0, 80.0] {
            let toward = cost(50.0, 40.0, 0.0, -speed);
            let away = cost(50.0, 40.0, 0.0, speed);
            assert!(toward < away, "speed {}", speed);
        }
    }

    #[test]
    fn past_the_end_toward_beats_away() {
        for speed in [1.0, 20.0, 80.0] {
            let toward = cost(210.0, 0.0, -speed, 0.0);
            let away = cost(210.0, 0.0, speed, 0.0);
            assert!(toward < away, "speed {}", speed);
        }
    }

    #[test]
    fn outside_a_corner_toward_beats_away() {
        let route = [
            Point2d::new(0.0, 0.0),
            Point2d::new(100.0, 0.0),
            Point2d::new(100.0, 100.0),
        ];
        let position = Point2d::new(110.0, -10.0);
        let normal = (Point2d::new(100.0, 0.0) - position).normalize();
        for speed in [1.0, 20.0, 80.0] {
            let toward = waypoint_cost(position, normal * speed, &route, GAIN, BLEND);
            let away = waypoint_cost(position, normal * -speed, &route, GAIN, BLEND);
            assert!(toward < away, "speed {}", speed);
        }
    }

    #[test]
    fn faster_opposed_motion_costs_more() {
        let mut last = cost(50.0, 0.0, -1.0, 0.0);
        for speed in [2.0, 5.0, 20.0, 100.0] {
            let next = cost(50.0, 0.0, -speed, 0.0);
            assert!(next > last);
            last = next;
        }
    }

    #[test]
    fn continuous_across_the_path() {
        let above = cost(50.0, -1e-6, 10.0, 3.0);
        let on = cost(50.0, 0.0, 10.0, 3.0);
        let below = cost(50.0, 1e-6, 10.0, 3.0);
        assert_approx_eq!(above, on, 1e-3);
        assert_approx_eq!(below, on, 1e-3);
    }

    #[test]
    fn degenerate_segment() {
        let route = [Point2d::new(10.0, 10.0), Point2d::new(10.0, 10.0)];
        let c = waypoint_cost(Point2d::new(13.0, 14.0), Vector2d::new(5.0, 0.0), &route, GAIN, BLEND);
        assert_approx_eq!(c, 25.0);
    }
}
