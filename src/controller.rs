//! Receding-horizon random shooting.
//!
//! Every tick, a batch of constant controls is drawn uniformly from the
//! actuator limits. Each is held for the whole horizon while the vehicle is
//! simulated forward, and the one with the lowest accumulated cost wins. No
//! gradients are used and nothing is carried over between ticks.

use crate::cost::{CostComponents, CostContext, CostModel};
use crate::error::{ConfigError, Result};
use crate::util::Interval;
use crate::vehicle::{integrate, Control, VehicleParams, VehicleState};
use rand::Rng;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The parameters of a [TrajectoryController].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ControllerParams {
    /// The number of candidate controls evaluated per tick.
    pub iterations: usize,
    /// The number of steps each candidate is simulated for.
    pub horizon: usize,
    /// The step length in seconds.
    pub dt: f64,
}

impl Default for ControllerParams {
    fn default() -> Self {
        Self {
            iterations: 30,
            horizon: 60,
            dt: 1.0 / 60.0,
        }
    }
}

impl ControllerParams {
    pub fn validate(&self) -> Result<()> {
        ConfigError::nonzero("iterations", self.iterations)?;
        ConfigError::nonzero("horizon", self.horizon)?;
        ConfigError::positive("dt", self.dt)
    }
}

/// Chooses a thrust and torque for each tick.
#[derive(Clone, Debug)]
pub struct TrajectoryController {
    params: ControllerParams,
    vehicle: VehicleParams,
    cost: CostModel,
    /// Cost breakdown at the end of the last winning rollout.
    last_costs: CostComponents,
}

impl TrajectoryController {
    /// Creates a new controller.
    pub fn new(params: ControllerParams, vehicle: VehicleParams, cost: CostModel) -> Self {
        Self {
            params,
            vehicle,
            cost,
            last_costs: Default::default(),
        }
    }

    pub fn params(&self) -> &ControllerParams {
        &self.params
    }

    pub fn vehicle_params(&self) -> &VehicleParams {
        &self.vehicle
    }

    pub fn cost_model(&self) -> &CostModel {
        &self.cost
    }

    /// The cost breakdown from the final step of the most recently chosen rollout.
    pub fn last_costs(&self) -> CostComponents {
        self.last_costs
    }

    /// Searches for the control with the lowest cost over the horizon.
    ///
    /// Always returns a control; with zero iterations it is the zero control.
    pub fn compute_control<R: Rng + ?Sized>(
        &mut self,
        state: &VehicleState,
        ctx: &CostContext,
        rng: &mut R,
    ) -> Control {
        let thrust = Interval::new(0.0, self.vehicle.thrust_max);
        let torque = Interval::new(-self.vehicle.torque_max, self.vehicle.torque_max);

        let mut best: Option<(f64, Control, CostComponents)> = None;
        for _ in 0..self.params.iterations {
            let control = Control::new(thrust.lerp(rng.gen()), torque.lerp(rng.gen()));
            let (cost, costs) = self.rollout(state, control, ctx);
            if best.map_or(true, |(best_cost, ..)| cost < best_cost) {
                best = Some((cost, control, costs));
            }
        }

        match best {
            Some((cost, control, costs)) => {
                log::trace!("Chose {:?} with cost {:.3}", control, cost);
                self.last_costs = costs;
                control
            }
            None => Control::default(),
        }
    }

    /// Advances a vehicle state by one step under `control`.
    pub fn step(&self, state: &mut VehicleState, control: Control) {
        integrate(state, control, &self.vehicle, self.params.dt);
    }

    /// Simulates `control` held over the horizon from a copy of `state`.
    /// Returns the accumulated cost and the breakdown at the final step.
    fn rollout(
        &self,
        state: &VehicleState,
        control: Control,
        ctx: &CostContext,
    ) -> (f64, CostComponents) {
        let mut sim = *state;
        let mut total = 0.0;
        let mut last = CostComponents::default();
        for _ in 0..self.params.horizon {
            self.step(&mut sim, control);
            last = self.cost.evaluate(&sim, ctx);
            total += last.total;
        }
        (total, last)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::arena::Arena;
    use crate::cost::CostWeights;
    use crate::math::Point2d;
    use crate::obstacle::Obstacle;
    use rand::{rngs::StdRng, SeedableRng};
    use std::rc::Rc;

    fn rng() -> StdRng {
        StdRng::from_seed(*b"Lunar descent on a windless day.")
    }

    fn controller(params: ControllerParams, weights: CostWeights) -> TrajectoryController {
        let vehicle = VehicleParams::default();
        let obstacles: Rc<[Obstacle]> = vec![Obstacle::new(350.0, 250.0, 100.0, 40.0)].into();
        let cost = CostModel::new(weights, Arena::default(), obstacles, vehicle.radius);
        TrajectoryController::new(params, vehicle, cost)
    }

    fn start() -> VehicleState {
        VehicleState::new(Point2d::new(400.0, 450.0), &VehicleParams::default())
    }

    #[test]
    fn same_randomness_same_control() {
        let route = [Point2d::new(400.0, 450.0), Point2d::new(600.0, 150.0)];
        let ctx = CostContext {
            target: Point2d::new(480.0, 330.0),
            waypoints: &route,
        };
        let mut a = controller(Default::default(), Default::default());
        let mut b = controller(Default::default(), Default::default());
        let first = a.compute_control(&start(), &ctx, &mut rng());
        let second = b.compute_control(&start(), &ctx, &mut rng());
        assert_eq!(first, second);
        assert_eq!(a.last_costs(), b.last_costs());

        // The same controller gives the same answer again
        assert_eq!(a.compute_control(&start(), &ctx, &mut rng()), first);
    }

    #[test]
    fn controls_respect_limits() {
        let ctx = CostContext {
            target: Point2d::new(100.0, 100.0),
            waypoints: &[],
        };
        let mut controller = controller(Default::default(), Default::default());
        let limits = *controller.vehicle_params();
        let mut rng = rng();
        for _ in 0..20 {
            let control = controller.compute_control(&start(), &ctx, &mut rng);
            assert!((0.0..=limits.thrust_max).contains(&control.thrust));
            assert!((-limits.torque_max..=limits.torque_max).contains(&control.torque));
        }
    }

    #[test]
    fn climbs_towards_a_target_above() {
        let weights = CostWeights {
            velocity: 0.0,
            angular_velocity: 0.0,
            boundary: 0.0,
            obstacle: 0.0,
            collision_course: 0.0,
            waypoints: 0.0,
            ..Default::default()
        };
        let params = ControllerParams {
            iterations: 500,
            ..Default::default()
        };
        let mut controller = controller(params, weights);
        let state = VehicleState::new(Point2d::new(200.0, 500.0), &VehicleParams::default());
        let ctx = CostContext {
            target: Point2d::new(200.0, 100.0),
            waypoints: &[],
        };
        let control = controller.compute_control(&state, &ctx, &mut rng());
        assert!(control.thrust > controller.vehicle_params().gravity);
    }

    #[test]
    fn last_costs_come_from_the_winning_rollout() {
        let ctx = CostContext {
            target: Point2d::new(300.0, 200.0),
            waypoints: &[],
        };
        let mut controller = controller(Default::default(), Default::default());
        let control = controller.compute_control(&start(), &ctx, &mut rng());

        let mut sim = start();
        for _ in 0..controller.params().horizon {
            controller.step(&mut sim, control);
        }
        let expected = controller.cost_model().evaluate(&sim, &ctx);
        assert_eq!(controller.last_costs(), expected);
    }

    #[test]
    fn no_iterations_gives_zero_control() {
        let params = ControllerParams {
            iterations: 0,
            ..Default::default()
        };
        let ctx = CostContext {
            target: Point2d::new(300.0, 200.0),
            waypoints: &[],
        };
        let mut controller = controller(params, Default::default());
        assert_eq!(controller.compute_control(&start(), &ctx, &mut rng()), Control::default());
        assert!(params.validate().is_err());
    }
}
