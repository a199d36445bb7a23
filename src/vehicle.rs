pub(crate) use self::dynamics::integrate;
use crate::arena::Arena;
use crate::error::{ConfigError, Result};
use crate::math::{Point2d, Vector2d};
use crate::obstacle::Obstacle;
use cgmath::InnerSpace;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

mod dynamics;

/// The simulated state of the vehicle.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VehicleState {
    /// The centre of the vehicle in px.
    pub position: Point2d,
    /// The velocity in px/s.
    pub velocity: Vector2d,
    /// The heading in radians, kept within (-π, π].
    /// At zero the thruster pushes towards -y.
    pub angle: f64,
    /// The angular velocity in rad/s.
    pub angular_velocity: f64,
    /// The thrust applied during the last step.
    pub thrust: f64,
    /// The remaining fuel; never negative.
    pub fuel: f64,
    /// Whether the vehicle has touched an obstacle or wall.
    pub collided: bool,
}

impl VehicleState {
    /// Creates a stationary, upright vehicle with a full tank.
    pub fn new(position: Point2d, params: &VehicleParams) -> Self {
        Self {
            position,
            velocity: Vector2d::new(0.0, 0.0),
            angle: 0.0,
            angular_velocity: 0.0,
            thrust: 0.0,
            fuel: params.initial_fuel,
            collided: false,
        }
    }

    /// The vehicle's speed in px/s.
    pub fn speed(&self) -> f64 {
        self.velocity.magnitude()
    }

    /// Whether a circle of `radius` around the vehicle touches an obstacle
    /// or leaves the arena.
    pub fn is_colliding(&self, radius: f64, obstacles: &[Obstacle], arena: &Arena) -> bool {
        !arena.contains(self.position, radius)
            || obstacles
                .iter()
                .any(|obstacle| obstacle.distance(self.position) < radius)
    }
}

/// A command applied for one step.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Control {
    /// Thrust along the vehicle's axis, within `[0, thrust_max]`.
    pub thrust: f64,
    /// Torque about the centre, within `[-torque_max, torque_max]`.
    pub torque: f64,
}

impl Control {
    /// Creates a new control.
    pub const fn new(thrust: f64, torque: f64) -> Self {
        Self { thrust, torque }
    }
}

/// The physical attributes of the vehicle.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VehicleParams {
    /// The maximum thrust acceleration in px/s^2.
    pub thrust_max: f64,
    /// The maximum angular acceleration in rad/s^2.
    pub torque_max: f64,
    /// The downward acceleration in px/s^2.
    pub gravity: f64,
    /// The collision radius in px.
    pub radius: f64,
    /// The fuel on board at the start of a run.
    pub initial_fuel: f64,
    /// Whether thrust burns fuel.
    pub track_fuel: bool,
    /// Velocity components and angular velocity are clamped to this magnitude
    /// before each step.
    pub max_speed: f64,
}

impl Default for VehicleParams {
    fn default() -> Self {
        Self {
            thrust_max: 80.0,
            torque_max: 4.0,
            gravity: 30.0,
            radius: 10.0,
            initial_fuel: 5000.0,
            track_fuel: true,
            max_speed: 1000.0,
        }
    }
}

impl VehicleParams {
    pub fn validate(&self) -> Result<()> {
        ConfigError::non_negative("thrust_max", self.thrust_max)?;
        ConfigError::non_negative("torque_max", self.torque_max)?;
        ConfigError::non_negative("gravity", self.gravity)?;
        ConfigError::positive("radius", self.radius)?;
        ConfigError::non_negative("initial_fuel", self.initial_fuel)?;
        ConfigError::positive("max_speed", self.max_speed)
    }
}
