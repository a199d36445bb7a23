use crate::arena::Arena;
use crate::error::{ConfigError, Result};
use crate::math::{ray_segment_intersection, segments_intersect, Point2d, Vector2d};
use crate::util::Interval;
use cgmath::prelude::*;
use rand::{Rng, RngCore};
use rand_distr::Distribution;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle the vehicle must not touch.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Obstacle {
    /// The left edge in px.
    pub x: f64,
    /// The top edge in px.
    pub y: f64,
    /// The width in px.
    pub width: f64,
    /// The height in px.
    pub height: f64,
}

impl Obstacle {
    /// Creates a new obstacle from its top-left corner and size.
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn x_extent(&self) -> Interval<f64> {
        Interval::new(self.x, self.x + self.width)
    }

    pub fn y_extent(&self) -> Interval<f64> {
        Interval::new(self.y, self.y + self.height)
    }

    /// The obstacle grown by `radius` on every side.
    ///
    /// A point-sized vehicle clear of the inflated rectangle corresponds to a
    /// vehicle of the given radius clear of the real one.
    pub fn inflate(&self, radius: f64) -> Self {
        Self {
            x: self.x - radius,
            y: self.y - radius,
            width: self.width + 2.0 * radius,
            height: self.height + 2.0 * radius,
        }
    }

    /// Whether `point` lies inside or on the boundary of the rectangle.
    pub fn contains(&self, point: Point2d) -> bool {
        self.x_extent().contains(point.x) && self.y_extent().contains(point.y)
    }

    /// The point on or inside the rectangle closest to `point`.
    pub fn closest_point(&self, point: Point2d) -> Point2d {
        Point2d::new(
            self.x_extent().clamp(point.x),
            self.y_extent().clamp(point.y),
        )
    }

    /// The distance from `point` to the rectangle; zero when inside.
    pub fn distance(&self, point: Point2d) -> f64 {
        point.distance(self.closest_point(point))
    }

    /// The four edges in clockwise order, starting with the top edge.
    pub fn edges(&self) -> [[Point2d; 2]; 4] {
        let (xs, ys) = (self.x_extent(), self.y_extent());
        let tl = Point2d::new(xs.min, ys.min);
        let tr = Point2d::new(xs.max, ys.min);
        let br = Point2d::new(xs.max, ys.max);
        let bl = Point2d::new(xs.min, ys.max);
        [[tl, tr], [tr, br], [br, bl], [bl, tl]]
    }

    /// Whether the segment `ab` crosses or lies within the rectangle.
    pub fn intersects_segment(&self, a: Point2d, b: Point2d) -> bool {
        self.contains(a)
            || self.contains(b)
            || self
                .edges()
                .iter()
                .any(|[p, q]| segments_intersect(a, b, *p, *q))
    }

    /// Casts a ray against the rectangle's edges and returns the nearest strictly
    /// positive hit parameter.
    pub fn ray_cast(&self, origin: Point2d, dir: Vector2d) -> Option<f64> {
        self.edges()
            .iter()
            .filter_map(|[p, q]| ray_segment_intersection(origin, dir, *p, *q))
            .filter(|t| *t > 0.0)
            .min_by(|a, b| a.total_cmp(b))
    }
}

/// Produces obstacle layouts for an arena.
pub trait ObstacleSource {
    /// Generates up to `count` obstacles which leave `start` and `target` free.
    fn generate_obstacles(
        &mut self,
        start: Point2d,
        target: Point2d,
        count: usize,
        rng: &mut dyn RngCore,
    ) -> Vec<Obstacle>;
}

/// Parameters of a [RandomObstacleField].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ObstacleFieldParams {
    /// The mean side length of an obstacle in px.
    pub mean_size: f64,
    /// The standard deviation of the side length in px.
    pub size_stddev: f64,
    /// Side lengths are clamped to this range.
    pub size_range: Interval<f64>,
    /// The minimum distance kept between an obstacle and the start or target.
    pub clearance: f64,
    /// Placement attempts per obstacle before giving up on it.
    pub max_attempts: usize,
}

impl Default for ObstacleFieldParams {
    fn default() -> Self {
        Self {
            mean_size: 60.0,
            size_stddev: 25.0,
            size_range: Interval::new(20.0, 120.0),
            clearance: 50.0,
            max_attempts: 50,
        }
    }
}

impl ObstacleFieldParams {
    pub fn validate(&self) -> Result<()> {
        ConfigError::positive("mean_size", self.mean_size)?;
        ConfigError::non_negative("size_stddev", self.size_stddev)?;
        ConfigError::positive("size_range.min", self.size_range.min)?;
        if self.size_range.max < self.size_range.min {
            return Err(ConfigError::Parameter {
                name: "size_range.max",
                requirement: "at least `size_range.min`",
                value: self.size_range.max,
            });
        }
        ConfigError::non_negative("clearance", self.clearance)?;
        ConfigError::nonzero("max_attempts", self.max_attempts)
    }
}

/// Scatters rectangles uniformly across an arena.
#[derive(Clone, Debug)]
pub struct RandomObstacleField {
    arena: Arena,
    params: ObstacleFieldParams,
}

impl RandomObstacleField {
    /// Creates a new obstacle field.
    pub fn new(arena: Arena, params: ObstacleFieldParams) -> Self {
        Self { arena, params }
    }

    /// Draws a single candidate rectangle.
    fn sample(&self, rng: &mut dyn RngCore, sizes: &rand_distr::Normal<f64>) -> Obstacle {
        let range = self.params.size_range;
        let width = range.clamp(sizes.sample(rng)).min(self.arena.width);
        let height = range.clamp(sizes.sample(rng)).min(self.arena.height);
        let x = Interval::new(0.0, self.arena.width - width).lerp(rng.gen());
        let y = Interval::new(0.0, self.arena.height - height).lerp(rng.gen());
        Obstacle::new(x, y, width, height)
    }
}

impl ObstacleSource for RandomObstacleField {
    fn generate_obstacles(
        &mut self,
        start: Point2d,
        target: Point2d,
        count: usize,
        rng: &mut dyn RngCore,
    ) -> Vec<Obstacle> {
        let sizes = rand_distr::Normal::new(self.params.mean_size, self.params.size_stddev)
            .expect("Invalid obstacle size distribution");

        let obstacles = (0..count)
            .filter_map(|_| {
                (0..self.params.max_attempts)
                    .map(|_| self.sample(rng, &sizes))
                    .find(|obstacle| {
                        let keep_out = obstacle.inflate(self.params.clearance);
                        !keep_out.contains(start) && !keep_out.contains(target)
                    })
            })
            .collect::<Vec<_>>();

        if obstacles.len() < count {
            log::warn!(
                "Placed {} of {} requested obstacles",
                obstacles.len(),
                count
            );
        }
        obstacles
    }
}
