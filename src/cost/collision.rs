use crate::math::{Point2d, Vector2d};
use crate::obstacle::Obstacle;
use cgmath::prelude::*;

/// Below this speed nothing is on a collision course.
const MIN_SPEED: f64 = 0.1; // px/s

/// Unweighted cost of the nearest collision predicted by flying straight on.
///
/// A ray is cast along the velocity against `obstacles`, which must already be
/// inflated by the vehicle `radius`. Hits further than `horizon` seconds away
/// are ignored. The
/// cost grows quadratically as the predicted impact gets closer than an
/// effective margin, which widens with speed.
pub fn collision_course_cost(
    position: Point2d,
    velocity: Vector2d,
    obstacles: &[Obstacle],
    radius: f64,
    horizon: f64,
) -> f64 {
    let speed = velocity.magnitude();
    if speed < MIN_SPEED {
        return 0.0;
    }
    let dir: Vector2d = velocity / speed;

    let nearest = obstacles
        .iter()
        .filter_map(|obstacle| obstacle.ray_cast(position, dir))
        .min_by(|a, b| a.total_cmp(b));

    let Some(hit_dist) = nearest else {
        return 0.0;
    };
    let time = hit_dist / speed;
    if time > horizon {
        return 0.0;
    }

    let distance = time * speed;
    let effective_margin = f64::max(10.0 * radius, 0.5 * horizon * speed);
    (effective_margin - distance)
        .clamp(0.0, effective_margin)
        .powi(2)
}
