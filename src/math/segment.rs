//! Line segment queries.

use super::{Point2d, Vector2d, EPSILON};
use cgmath::prelude::*;

/// Finds the point on segment `ab` closest to `p`.
///
/// The projection parameter is clamped to the segment, so the result is
/// always one of the end points or lies between them.
pub fn closest_point_on_segment(p: Point2d, a: Point2d, b: Point2d) -> Point2d {
    let ab = b - a;
    let len2 = ab.magnitude2();
    if len2 < EPSILON * EPSILON {
        return a;
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    a + ab * t
}

/// The Euclidean distance from `p` to segment `ab`.
pub fn distance_to_segment(p: Point2d, a: Point2d, b: Point2d) -> f64 {
    p.distance(closest_point_on_segment(p, a, b))
}

/// Determines whether segments `p1p2` and `q1q2` share at least one point.
pub fn segments_intersect(p1: Point2d, p2: Point2d, q1: Point2d, q2: Point2d) -> bool {
    let r = p2 - p1;
    let s = q2 - q1;
    let qp = q1 - p1;
    let denom = r.perp_dot(s);

    if denom.abs() < EPSILON {
        // Parallel; only collinear segments can touch
        if qp.perp_dot(r).abs() >= EPSILON {
            return false;
        }
        let rr = r.magnitude2();
        if rr < EPSILON * EPSILON {
            return distance_to_segment(p1, q1, q2) < EPSILON;
        }
        let t0 = qp.dot(r) / rr;
        let t1 = t0 + s.dot(r) / rr;
        let (lo, hi) = (t0.min(t1), t0.max(t1));
        return hi >= 0.0 && lo <= 1.0;
    }

    let t = qp.perp_dot(s) / denom;
    let u = qp.perp_dot(r) / denom;
    (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u)
}

/// Casts a ray from `origin` along `dir` against segment `ab`.
///
/// Returns the ray parameter of the hit (a distance when `dir` is a unit vector),
/// or `None` if the ray is parallel to the segment or the hit lies behind the origin.
pub fn ray_segment_intersection(
    origin: Point2d,
    dir: Vector2d,
    a: Point2d,
    b: Point2d,
) -> Option<f64> {
    let s = b - a;
    let denom = dir.perp_dot(s);
    if denom.abs() < EPSILON {
        return None;
    }
    let qp = a - origin;
    let t = qp.perp_dot(s) / denom;
    let u = qp.perp_dot(dir) / denom;
    (t >= 0.0 && (0.0..=1.0).contains(&u)).then_some(t)
}
