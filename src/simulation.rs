use crate::arena::Arena;
use crate::controller::{ControllerParams, TrajectoryController};
use crate::cost::{CostComponents, CostContext, CostModel, CostWeights};
#[cfg(feature = "debug")]
use crate::debug::take_debug_frame;
use crate::debug::{debug_circle, debug_line};
use crate::error::Result;
use crate::interpolator::InterpolatorParams;
use crate::math::Point2d;
use crate::obstacle::{Obstacle, ObstacleFieldParams, ObstacleSource, RandomObstacleField};
use crate::path_manager::PathManager;
use crate::planner::PlannerParams;
use crate::vehicle::{VehicleParams, VehicleState};
use cgmath::prelude::*;
use rand::{rngs::StdRng, SeedableRng};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// While no route is known, retry planning at least once per this interval.
const PLAN_RETRY_SEC: f64 = 1.0; // s

/// The attributes of a [Simulation].
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SimulationAttributes {
    /// The bounds of the world.
    pub arena: Arena,
    /// Where the vehicle starts, and returns to on reset.
    pub start: Point2d,
    /// Where the vehicle is trying to go.
    pub target: Point2d,
    /// The number of obstacles to request from the obstacle source.
    pub obstacle_count: usize,
    /// Seeds the random number generator; `None` seeds it from entropy.
    pub seed: Option<u64>,
    pub vehicle: VehicleParams,
    pub planner: PlannerParams,
    pub interpolator: InterpolatorParams,
    pub weights: CostWeights,
    pub controller: ControllerParams,
    pub obstacle_field: ObstacleFieldParams,
}

impl Default for SimulationAttributes {
    fn default() -> Self {
        Self {
            arena: Arena::default(),
            start: Point2d::new(100.0, 500.0),
            target: Point2d::new(700.0, 100.0),
            obstacle_count: 8,
            seed: None,
            vehicle: Default::default(),
            planner: Default::default(),
            interpolator: Default::default(),
            weights: Default::default(),
            controller: Default::default(),
            obstacle_field: Default::default(),
        }
    }
}

impl SimulationAttributes {
    pub fn validate(&self) -> Result<()> {
        self.arena.validate()?;
        self.arena.validate_point("start", self.start)?;
        self.arena.validate_point("target", self.target)?;
        self.vehicle.validate()?;
        self.planner.validate()?;
        self.interpolator.validate()?;
        self.weights.validate()?;
        self.controller.validate()?;
        self.obstacle_field.validate()
    }
}

/// A single vehicle flying through an arena of obstacles towards a target.
pub struct Simulation {
    /// The attributes the simulation was created with, as since reconfigured.
    attributes: SimulationAttributes,
    /// The source of all randomness in the simulation.
    rng: StdRng,
    /// Produces new obstacle layouts.
    source: Box<dyn ObstacleSource>,
    /// The current obstacle layout.
    obstacles: Rc<[Obstacle]>,
    /// The vehicle.
    state: VehicleState,
    path_manager: PathManager,
    controller: TrajectoryController,
    /// The point the controller aimed at in the previous frame.
    aim_point: Point2d,
    /// The current frame of simulation.
    frame: usize,
    /// The time since planning last failed in s.
    plan_retry: f64,
    /// Called whenever the vehicle's collision flag changes.
    on_collision: Option<Box<dyn FnMut(bool)>>,
    /// Debugging information from the previously simulated frame.
    #[cfg(feature = "debug")]
    debug: serde_json::Value,
}

impl Simulation {
    /// Creates a new simulation, generates its obstacles and plans an initial route.
    pub fn new(attributes: &SimulationAttributes) -> Result<Self> {
        attributes.validate()?;

        let mut rng = match attributes.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut source = Box::new(RandomObstacleField::new(
            attributes.arena,
            attributes.obstacle_field,
        ));
        let obstacles: Rc<[Obstacle]> = source
            .generate_obstacles(
                attributes.start,
                attributes.target,
                attributes.obstacle_count,
                &mut rng,
            )
            .into();

        let mut sim = Self {
            attributes: *attributes,
            rng,
            source,
            obstacles: obstacles.clone(),
            state: VehicleState::new(attributes.start, &attributes.vehicle),
            path_manager: PathManager::new(
                obstacles.clone(),
                attributes.arena,
                attributes.planner,
                attributes.interpolator,
            ),
            controller: build_controller(attributes, obstacles),
            aim_point: attributes.target,
            frame: 0,
            plan_retry: 0.0,
            on_collision: None,
            #[cfg(feature = "debug")]
            debug: serde_json::Value::Null,
        };
        sim.plan_path();
        Ok(sim)
    }

    /// Advances the simulation by one controller step.
    ///
    /// Does nothing once the vehicle has collided, until [reset](Self::reset).
    pub fn step(&mut self) {
        if self.state.collided {
            return;
        }

        let target = self.attributes.target;
        let waypoints = self.path_manager.waypoints();
        self.aim_point = self
            .path_manager
            .interpolated_target(self.state.position, target);

        let ctx = CostContext {
            target: self.aim_point,
            waypoints: self.path_manager.remaining_waypoints(),
        };
        let control = self
            .controller
            .compute_control(&self.state, &ctx, &mut self.rng);
        self.controller.step(&mut self.state, control);

        self.detect_collision();
        self.update_route();
        self.frame += 1;

        for pair in waypoints.windows(2) {
            debug_line("waypoints", pair[0], pair[1]);
        }
        debug_circle("aim", self.aim_point, 4.0);
        debug_circle("vehicle", self.state.position, self.attributes.vehicle.radius);

        #[cfg(feature = "debug")]
        {
            self.debug = take_debug_frame();
        }
    }

    /// Discards the current route and plans a fresh one from the vehicle's
    /// position to the target.
    pub fn plan_path(&mut self) {
        self.plan_retry = 0.0;
        self.path_manager
            .plan_path(self.state.position, self.attributes.target, &mut self.rng);
    }

    /// Changes the number of obstacles and generates a new layout.
    pub fn set_obstacles_amount(&mut self, count: usize) {
        self.attributes.obstacle_count = count;
        self.regenerate_obstacles();
    }

    /// Replaces the obstacles with a fresh layout from the obstacle source,
    /// keeping the vehicle and the target clear.
    pub fn regenerate_obstacles(&mut self) {
        let obstacles = self.source.generate_obstacles(
            self.state.position,
            self.attributes.target,
            self.attributes.obstacle_count,
            &mut self.rng,
        );
        log::info!("Regenerated {} obstacles", obstacles.len());
        self.set_obstacles(obstacles);
    }

    /// Replaces the obstacles with the given layout and replans.
    pub fn set_obstacles(&mut self, obstacles: Vec<Obstacle>) {
        self.obstacles = obstacles.into();
        self.path_manager.update_obstacles(self.obstacles.clone());
        self.controller = build_controller(&self.attributes, self.obstacles.clone());
        self.plan_path();
    }

    /// Sets the source used by [regenerate_obstacles](Self::regenerate_obstacles).
    pub fn set_obstacle_source(&mut self, source: Box<dyn ObstacleSource>) {
        self.source = source;
    }

    /// Reconfigures the cost shaping. Invalid weights are rejected and the
    /// current ones kept.
    pub fn set_weights(&mut self, weights: CostWeights) -> Result<()> {
        weights.validate()?;
        self.attributes.weights = weights;
        self.controller = build_controller(&self.attributes, self.obstacles.clone());
        Ok(())
    }

    /// Changes how far ahead along the route the vehicle aims. Invalid
    /// distances are rejected and the current one kept.
    pub fn set_waypoint_lookahead_distance(&mut self, distance: f64) -> Result<()> {
        self.path_manager.set_lookahead_distance(distance)
    }

    /// Registers a function to be called with the new value of the collision
    /// flag whenever it changes.
    pub fn set_collision_callback(&mut self, callback: impl FnMut(bool) + 'static) {
        self.on_collision = Some(Box::new(callback));
    }

    /// Puts the vehicle back at the start with a full tank and replans.
    /// The obstacles are kept.
    pub fn reset(&mut self) {
        let was_collided = self.state.collided;
        self.state = VehicleState::new(self.attributes.start, &self.attributes.vehicle);
        self.aim_point = self.attributes.target;
        self.frame = 0;
        self.path_manager.clear_waypoints();
        self.plan_path();
        if was_collided {
            self.notify_collision(false);
        }
    }

    /// Gets the current simulation frame index.
    pub fn frame(&self) -> usize {
        self.frame
    }

    pub fn attributes(&self) -> &SimulationAttributes {
        &self.attributes
    }

    pub fn state(&self) -> &VehicleState {
        &self.state
    }

    pub fn obstacles(&self) -> Rc<[Obstacle]> {
        self.obstacles.clone()
    }

    /// The current route; empty while none is known.
    pub fn waypoints(&self) -> Rc<[Point2d]> {
        self.path_manager.waypoints()
    }

    pub fn waypoint_index(&self) -> usize {
        self.path_manager.waypoint_index()
    }

    /// The point the controller aimed at in the previous frame.
    pub fn aim_point(&self) -> Point2d {
        self.aim_point
    }

    /// The predicted cost breakdown behind the previous frame's control.
    pub fn last_costs(&self) -> CostComponents {
        self.controller.last_costs()
    }

    pub fn weights(&self) -> &CostWeights {
        self.controller.cost_model().weights()
    }

    pub fn lookahead_distance(&self) -> f64 {
        self.path_manager.lookahead_distance()
    }

    /// Whether the vehicle is within the planner's goal threshold of the target.
    pub fn reached_target(&self) -> bool {
        let distance = self.state.position.distance(self.attributes.target);
        distance <= self.attributes.planner.goal_threshold
    }

    /// Gets the debugging information for the previously simulated frame as JSON array.
    #[cfg(feature = "debug")]
    pub fn debug(&mut self) -> serde_json::Value {
        self.debug.clone()
    }

    /// Checks the vehicle against the obstacles and walls.
    fn detect_collision(&mut self) {
        let colliding = self.state.is_colliding(
            self.attributes.vehicle.radius,
            &self.obstacles,
            &self.attributes.arena,
        );
        if colliding != self.state.collided {
            self.state.collided = colliding;
            if colliding {
                log::info!(
                    "Collision at {:?} on frame {}",
                    self.state.position,
                    self.frame
                );
            }
            self.notify_collision(colliding);
        }
    }

    fn notify_collision(&mut self, collided: bool) {
        if let Some(callback) = self.on_collision.as_mut() {
            callback(collided);
        }
    }

    /// Follows the current route, or retries planning if there is none.
    fn update_route(&mut self) {
        if self.path_manager.waypoints().is_empty() {
            self.plan_retry += self.controller.params().dt;
            if self.plan_retry < PLAN_RETRY_SEC {
                return;
            }
            self.plan_path();
        } else {
            self.path_manager.update_waypoints(
                self.state.position,
                self.attributes.target,
                &mut self.rng,
            );
        }
    }
}

fn build_controller(
    attributes: &SimulationAttributes,
    obstacles: Rc<[Obstacle]>,
) -> TrajectoryController {
    let cost = CostModel::new(
        attributes.weights,
        attributes.arena,
        obstacles,
        attributes.vehicle.radius,
    );
    TrajectoryController::new(attributes.controller, attributes.vehicle, cost)
}
