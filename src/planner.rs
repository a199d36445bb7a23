//! Rapidly-exploring random tree search over the arena.

use crate::arena::Arena;
use crate::error::{ConfigError, Result};
use crate::math::Point2d;
use crate::obstacle::Obstacle;
use cgmath::prelude::*;
use itertools::unfold;
use rand::Rng;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Unique ID of a [PlanningNode] within one search tree.
    pub struct NodeId;
}

/// A node of the search tree.
#[derive(Clone, Copy, Debug)]
pub struct PlanningNode {
    /// The node's position in the arena.
    pub position: Point2d,
    /// The node this one was grown from; `None` only for the root.
    pub parent: Option<NodeId>,
}

/// The parameters of a [RrtPlanner].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlannerParams {
    /// The number of samples drawn before giving up.
    pub max_iterations: usize,
    /// The furthest a single extension may reach, in px.
    pub step_size: f64,
    /// The probability of sampling the goal instead of a random point.
    pub goal_bias: f64,
    /// A node this close to the goal completes the search.
    pub goal_threshold: f64,
    /// Obstacles are inflated by this radius before collision checks.
    pub vehicle_radius: f64,
    /// Nodes must stay at least this far from the arena walls.
    pub boundary_margin: f64,
}

impl Default for PlannerParams {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            step_size: 20.0,
            goal_bias: 0.1,
            goal_threshold: 20.0,
            vehicle_radius: 10.0,
            boundary_margin: 15.0,
        }
    }
}

impl PlannerParams {
    pub fn validate(&self) -> Result<()> {
        ConfigError::nonzero("max_iterations", self.max_iterations)?;
        ConfigError::positive("step_size", self.step_size)?;
        ConfigError::probability("goal_bias", self.goal_bias)?;
        ConfigError::non_negative("goal_threshold", self.goal_threshold)?;
        ConfigError::non_negative("vehicle_radius", self.vehicle_radius)?;
        ConfigError::non_negative("boundary_margin", self.boundary_margin)
    }
}

/// Finds collision-free polylines between two points.
///
/// The planner holds no state between searches beyond its obstacles, arena and
/// parameters; a new layout means a new planner.
#[derive(Clone, Debug)]
pub struct RrtPlanner {
    /// The obstacles, already inflated by the vehicle radius.
    obstacles: Vec<Obstacle>,
    arena: Arena,
    params: PlannerParams,
}

impl RrtPlanner {
    /// Creates a new planner for the given obstacle layout.
    pub fn new(obstacles: &[Obstacle], arena: Arena, params: PlannerParams) -> Self {
        Self {
            obstacles: obstacles
                .iter()
                .map(|obstacle| obstacle.inflate(params.vehicle_radius))
                .collect(),
            arena,
            params,
        }
    }

    /// The planner's parameters.
    pub fn params(&self) -> &PlannerParams {
        &self.params
    }

    /// Searches for a path from `start` to within `goal_threshold` of `goal`.
    ///
    /// The result starts at `start` and has already been simplified. An empty
    /// result means the sample budget ran out; the goal may still be reachable.
    pub fn find_path<R: Rng + ?Sized>(
        &self,
        start: Point2d,
        goal: Point2d,
        rng: &mut R,
    ) -> Vec<Point2d> {
        if start.distance(goal) <= self.params.goal_threshold {
            return vec![start, goal];
        }

        let mut tree = SlotMap::with_key();
        tree.insert(PlanningNode {
            position: start,
            parent: None,
        });

        for iteration in 0..self.params.max_iterations {
            let sample = if rng.gen_bool(self.params.goal_bias) {
                goal
            } else {
                self.arena.sample(rng)
            };

            let (nearest_id, nearest) = Self::nearest(&tree, sample);
            let position = self.steer(nearest.position, sample);
            if !self.is_segment_clear(nearest.position, position) {
                continue;
            }

            let id = tree.insert(PlanningNode {
                position,
                parent: Some(nearest_id),
            });

            if position.distance(goal) <= self.params.goal_threshold {
                let path = Self::trace_back(&tree, id);
                let path = self.simplify_path(&path);
                log::debug!(
                    "Found a path after {} iterations ({} nodes, {} waypoints)",
                    iteration + 1,
                    tree.len(),
                    path.len()
                );
                return path;
            }
        }

        log::debug!(
            "No path found within {} iterations ({} nodes)",
            self.params.max_iterations,
            tree.len()
        );
        vec![]
    }

    /// Whether the vehicle can travel in a straight line from `a` to `b`.
    ///
    /// `b` must keep the boundary margin; the segment must not touch any
    /// inflated obstacle.
    pub fn is_segment_clear(&self, a: Point2d, b: Point2d) -> bool {
        self.arena.contains(b, self.params.boundary_margin)
            && !self
                .obstacles
                .iter()
                .any(|obstacle| obstacle.intersects_segment(a, b))
    }

    /// Shortcuts a path by repeatedly jumping to the furthest waypoint reachable
    /// in a straight line.
    pub fn simplify_path(&self, path: &[Point2d]) -> Vec<Point2d> {
        let Some(first) = path.first() else {
            return vec![];
        };

        let mut simplified = vec![*first];
        let mut idx = 0;
        while idx + 1 < path.len() {
            let from = path[idx];
            idx = (idx + 1..path.len())
                .rev()
                .find(|&next| self.is_segment_clear(from, path[next]))
                .unwrap_or(idx + 1);
            simplified.push(path[idx]);
        }
        simplified
    }

    /// Finds the tree node nearest to `point` by linear scan.
    fn nearest(tree: &SlotMap<NodeId, PlanningNode>, point: Point2d) -> (NodeId, PlanningNode) {
        tree.iter()
            .map(|(id, node)| (id, *node))
            .min_by(|a, b| {
                let da = a.1.position.distance2(point);
                let db = b.1.position.distance2(point);
                da.total_cmp(&db)
            })
            .expect("Search tree always contains its root")
    }

    /// Moves from `from` towards `to` by at most one step.
    fn steer(&self, from: Point2d, to: Point2d) -> Point2d {
        let delta = to - from;
        let dist = delta.magnitude();
        if dist <= self.params.step_size {
            to
        } else {
            from + delta * (self.params.step_size / dist)
        }
    }

    /// Walks parent links from `leaf` to the root and returns the root-first path.
    fn trace_back(tree: &SlotMap<NodeId, PlanningNode>, leaf: NodeId) -> Vec<Point2d> {
        let mut path = unfold(Some(leaf), |next| {
            let node = tree[(*next)?];
            *next = node.parent;
            Some(node.position)
        })
        .collect::<Vec<_>>();
        path.reverse();
        path
    }
}
