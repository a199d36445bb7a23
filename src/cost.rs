//! The scalar cost the controller minimises.

use self::collision::collision_course_cost;
use self::waypoints::waypoint_cost;
use crate::arena::Arena;
use crate::error::{ConfigError, Result};
use crate::math::Point2d;
use crate::obstacle::Obstacle;
use crate::vehicle::VehicleState;
use cgmath::prelude::*;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::rc::Rc;

mod collision;
mod waypoints;

/// The weights and shaping constants of a [CostModel].
///
/// A weight of zero disables its term entirely.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CostWeights {
    /// Squared distance to the aim point.
    pub position: f64,
    /// Squared velocity.
    pub velocity: f64,
    /// Squared angular velocity.
    pub angular_velocity: f64,
    /// Squared intrusion into the boundary margin.
    pub boundary: f64,
    /// Squared intrusion into the margin around each obstacle.
    pub obstacle: f64,
    /// Squared closeness of a predicted collision.
    pub collision_course: f64,
    /// Path following: squared distance to the path plus velocity shaping.
    pub waypoints: f64,
    /// Distance from the walls at which the boundary term starts, in px.
    pub boundary_margin: f64,
    /// Distance from an obstacle at which the obstacle term starts, in px.
    pub obstacle_margin: f64,
    /// Predicted collisions further away than this are ignored, in s.
    pub collision_time_horizon: f64,
    /// Scales the velocity shaping relative to the squared path distance.
    pub waypoint_velocity_gain: f64,
    /// Off-path distance at which heading back to the path matters as much as
    /// moving along it, in px.
    pub waypoint_blend_distance: f64,
}

impl Default for CostWeights {
    fn default() -> Self {
        Self {
            position: 0.05,
            velocity: 0.2,
            angular_velocity: 2.0,
            boundary: 5.0,
            obstacle: 5.0,
            collision_course: 2.0,
            waypoints: 0.02,
            boundary_margin: 40.0,
            obstacle_margin: 30.0,
            collision_time_horizon: 1.5,
            waypoint_velocity_gain: 5.0,
            waypoint_blend_distance: 30.0,
        }
    }
}

impl CostWeights {
    pub fn validate(&self) -> Result<()> {
        ConfigError::non_negative("position", self.position)?;
        ConfigError::non_negative("velocity", self.velocity)?;
        ConfigError::non_negative("angular_velocity", self.angular_velocity)?;
        ConfigError::non_negative("boundary", self.boundary)?;
        ConfigError::non_negative("obstacle", self.obstacle)?;
        ConfigError::non_negative("collision_course", self.collision_course)?;
        ConfigError::non_negative("waypoints", self.waypoints)?;
        ConfigError::non_negative("boundary_margin", self.boundary_margin)?;
        ConfigError::non_negative("obstacle_margin", self.obstacle_margin)?;
        ConfigError::non_negative("collision_time_horizon", self.collision_time_horizon)?;
        ConfigError::non_negative("waypoint_velocity_gain", self.waypoint_velocity_gain)?;
        ConfigError::positive("waypoint_blend_distance", self.waypoint_blend_distance)
    }
}

/// The breakdown of one cost evaluation.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CostComponents {
    pub position: f64,
    pub velocity: f64,
    pub angular_velocity: f64,
    pub obstacle: f64,
    pub boundary: f64,
    pub collision_course: f64,
    /// May be negative: well-aligned motion along the path is rewarded.
    pub waypoints: f64,
    /// The sum of all other fields.
    pub total: f64,
}

impl CostComponents {
    fn summed(mut self) -> Self {
        self.total = self.position
            + self.velocity
            + self.angular_velocity
            + self.obstacle
            + self.boundary
            + self.collision_course
            + self.waypoints;
        self
    }
}

/// What the vehicle is currently trying to reach.
#[derive(Clone, Copy, Debug)]
pub struct CostContext<'a> {
    /// The aim point.
    pub target: Point2d,
    /// The planned route; fewer than two points disables path following.
    pub waypoints: &'a [Point2d],
}

/// Scores vehicle states against a target, a route and the surroundings.
#[derive(Clone, Debug)]
pub struct CostModel {
    weights: CostWeights,
    arena: Arena,
    /// The obstacles inflated by the vehicle radius.
    obstacles: Vec<Obstacle>,
    vehicle_radius: f64,
}

impl CostModel {
    /// Creates a new cost model. Obstacle distances are measured from the
    /// vehicle's edge rather than its centre.
    pub fn new(
        weights: CostWeights,
        arena: Arena,
        obstacles: Rc<[Obstacle]>,
        vehicle_radius: f64,
    ) -> Self {
        Self {
            weights,
            arena,
            obstacles: obstacles
                .iter()
                .map(|obstacle| obstacle.inflate(vehicle_radius))
                .collect(),
            vehicle_radius,
        }
    }

    pub fn weights(&self) -> &CostWeights {
        &self.weights
    }

    /// Evaluates every term for the given state.
    pub fn evaluate(&self, state: &VehicleState, ctx: &CostContext) -> CostComponents {
        let w = &self.weights;
        CostComponents {
            position: weighted(w.position, || state.position.distance2(ctx.target)),
            velocity: self.velocity_cost(state),
            angular_velocity: self.angular_velocity_cost(state),
            obstacle: weighted(w.obstacle, || self.obstacle_cost(state.position)),
            boundary: weighted(w.boundary, || self.boundary_cost(state.position)),
            collision_course: weighted(w.collision_course, || {
                collision_course_cost(
                    state.position,
                    state.velocity,
                    &self.obstacles,
                    self.vehicle_radius,
                    w.collision_time_horizon,
                )
            }),
            waypoints: weighted(w.waypoints, || {
                waypoint_cost(
                    state.position,
                    state.velocity,
                    ctx.waypoints,
                    w.waypoint_velocity_gain,
                    w.waypoint_blend_distance,
                )
            }),
            total: 0.0,
        }
        .summed()
    }

    fn velocity_cost(&self, state: &VehicleState) -> f64 {
        let w = self.weights.velocity;
        if w == 0.0 {
            return 0.0;
        }
        (w * state.velocity.x).powi(2) + (w * state.velocity.y).powi(2)
    }

    fn angular_velocity_cost(&self, state: &VehicleState) -> f64 {
        let w = self.weights.angular_velocity;
        if w == 0.0 {
            return 0.0;
        }
        (w * state.angular_velocity).powi(2)
    }

    /// Unweighted penalty for entering the margin along each wall.
    fn boundary_cost(&self, position: Point2d) -> f64 {
        let margin = self.weights.boundary_margin;
        self.arena
            .side_distances(position)
            .iter()
            .filter(|dist| **dist < margin)
            .map(|dist| (margin - dist).powi(2))
            .sum()
    }

    /// Unweighted penalty for the vehicle's edge entering the margin around
    /// each obstacle.
    fn obstacle_cost(&self, position: Point2d) -> f64 {
        let margin = self.weights.obstacle_margin;
        self.obstacles
            .iter()
            .map(|obstacle| obstacle.distance(position))
            .filter(|dist| *dist < margin)
            .map(|dist| (margin - dist).powi(2))
            .sum()
    }
}

/// Scales a term, skipping its evaluation when the weight is zero.
#[inline(always)]
fn weighted(weight: f64, term: impl FnOnce() -> f64) -> f64 {
    if weight == 0.0 {
        0.0
    } else {
        weight * term()
    }
}
