use super::{closest_point_on_segment, Point2d};
use cgmath::prelude::*;
use itertools::Itertools;

/// The shortest line from a point onto a polyline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathProjection {
    /// Length of the line.
    pub distance: f64,
    /// The point on the polyline closest to the query point.
    pub cross_section: Point2d,
    /// Index of the segment owning `cross_section`; the segment runs from
    /// `path[segment]` to `path[segment + 1]`.
    pub segment: usize,
}

/// Finds the closest point on `path` to `point`.
///
/// Each segment is queried with its projection clamped to the segment. Ties keep
/// the earliest segment. Returns `None` if the path has fewer than two points.
pub fn shortest_line_to_path(point: Point2d, path: &[Point2d]) -> Option<PathProjection> {
    let mut best: Option<PathProjection> = None;
    for (segment, (a, b)) in path.iter().tuple_windows().enumerate() {
        let cross_section = closest_point_on_segment(point, *a, *b);
        let distance = point.distance(cross_section);
        if best.map_or(true, |best| distance < best.distance) {
            best = Some(PathProjection {
                distance,
                cross_section,
                segment,
            });
        }
    }
    best
}
