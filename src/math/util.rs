use super::{Vector2d, EPSILON};
use cgmath::prelude::*;
use std::f64::consts::{PI, TAU};

/// Wraps an angle into the range (-π, π].
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

/// Normalises a vector, or returns `None` if it is too short to have a direction.
#[inline(always)]
pub fn normalize_or_none(v: Vector2d) -> Option<Vector2d> {
    let mag = v.magnitude();
    if mag < EPSILON {
        None
    } else {
        Some(v / mag)
    }
}

/// Clamps each component of a vector to `[-limit, limit]`.
pub fn clamp_components(v: Vector2d, limit: f64) -> Vector2d {
    Vector2d::new(v.x.clamp(-limit, limit), v.y.clamp(-limit, limit))
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn angles_wrap_into_half_open_range() {
        assert_approx_eq!(normalize_angle(0.0), 0.0);
        assert_approx_eq!(normalize_angle(PI), PI);
        assert_approx_eq!(normalize_angle(-PI), PI);
        assert_approx_eq!(normalize_angle(3.0 * PI), PI);
        assert_approx_eq!(normalize_angle(1.5 * PI), -0.5 * PI);
        assert_approx_eq!(normalize_angle(-7.0), -7.0 + TAU);
    }

    #[test]
    fn degenerate_vectors() {
        assert!(normalize_or_none(Vector2d::new(0.0, 0.0)).is_none());
        let n = normalize_or_none(Vector2d::new(3.0, 4.0)).unwrap();
        assert_approx_eq!(n.x, 0.6);
        assert_approx_eq!(n.y, 0.8);
    }
}
