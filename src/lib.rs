pub use arena::Arena;
pub use cgmath;
pub use controller::{ControllerParams, TrajectoryController};
pub use cost::{CostComponents, CostContext, CostModel, CostWeights};
pub use error::ConfigError;
pub use interpolator::{InterpolatorParams, PathInterpolator};
pub use obstacle::{Obstacle, ObstacleFieldParams, ObstacleSource, RandomObstacleField};
pub use path_manager::PathManager;
pub use planner::{NodeId, PlannerParams, PlanningNode, RrtPlanner};
pub use simulation::{Simulation, SimulationAttributes};
pub use util::Interval;
pub use vehicle::{Control, VehicleParams, VehicleState};

mod arena;
mod controller;
mod cost;
mod debug;
pub mod error;
mod interpolator;
pub mod math;
mod obstacle;
mod path_manager;
mod planner;
mod simulation;
mod util;
mod vehicle;
