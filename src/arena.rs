use crate::error::{ConfigError, Result};
use crate::math::Point2d;
use crate::util::Interval;
use rand::Rng;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The bounded rectangle `[0, width] x [0, height]` the vehicle flies in.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Arena {
    /// Width in px.
    pub width: f64,
    /// Height in px; +y points down.
    pub height: f64,
}

impl Default for Arena {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

impl Arena {
    /// Creates a new arena.
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn validate(&self) -> Result<()> {
        let ok = |v: f64| v.is_finite() && v > 0.0;
        if ok(self.width) && ok(self.height) {
            Ok(())
        } else {
            Err(ConfigError::Arena {
                width: self.width,
                height: self.height,
            })
        }
    }

    /// Checks that a named point lies inside the arena.
    pub(crate) fn validate_point(&self, what: &'static str, point: Point2d) -> Result<()> {
        if self.contains(point, 0.0) {
            Ok(())
        } else {
            Err(ConfigError::OutOfBounds {
                what,
                x: point.x,
                y: point.y,
            })
        }
    }

    pub fn x_extent(&self) -> Interval<f64> {
        Interval::new(0.0, self.width)
    }

    pub fn y_extent(&self) -> Interval<f64> {
        Interval::new(0.0, self.height)
    }

    /// Whether `point` is at least `margin` away from every side.
    pub fn contains(&self, point: Point2d, margin: f64) -> bool {
        self.x_extent().expand(-margin).contains(point.x)
            && self.y_extent().expand(-margin).contains(point.y)
    }

    /// Signed distances from `point` to the left, right, top and bottom sides.
    /// Negative values mean the point is outside that side.
    pub fn side_distances(&self, point: Point2d) -> [f64; 4] {
        [
            point.x,
            self.width - point.x,
            point.y,
            self.height - point.y,
        ]
    }

    /// Samples a point uniformly from the arena.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Point2d {
        Point2d::new(
            self.x_extent().lerp(rng.gen()),
            self.y_extent().lerp(rng.gen()),
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn margins() {
        let arena = Arena::new(100.0, 50.0);
        assert!(arena.contains(Point2d::new(10.0, 10.0), 10.0));
        assert!(!arena.contains(Point2d::new(9.0, 10.0), 10.0));
        assert!(!arena.contains(Point2d::new(50.0, 45.0), 10.0));
        assert_eq!(
            arena.side_distances(Point2d::new(20.0, 5.0)),
            [20.0, 80.0, 5.0, 45.0]
        );
    }

    #[test]
    fn samples_stay_inside() {
        let arena = Arena::new(100.0, 50.0);
        let mut rng = StdRng::from_seed(*b"Lunar descent on a windless day.");
        for _ in 0..200 {
            assert!(arena.contains(arena.sample(&mut rng), 0.0));
        }
    }

    #[test]
    fn validation() {
        assert!(Arena::default().validate().is_ok());
        assert!(Arena::new(0.0, 10.0).validate().is_err());
        assert!(Arena::default()
            .validate_point("start", Point2d::new(-1.0, 3.0))
            .is_err());
    }
}
