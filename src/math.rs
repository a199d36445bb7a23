//! Mathematical structs and functions.

use cgmath::{Point2, Vector2};
pub use polyline::{shortest_line_to_path, PathProjection};
pub use segment::*;
pub use util::*;

mod polyline;
mod segment;
mod util;

/// A 2D point
pub type Point2d = Point2<f64>;

/// A 2D vector
pub type Vector2d = Vector2<f64>;

/// Lengths below this are treated as zero.
pub const EPSILON: f64 = 1e-9;
