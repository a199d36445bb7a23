use super::{Control, VehicleParams, VehicleState};
use crate::math::{clamp_components, normalize_angle};

/// Advances the vehicle by one semi-implicit Euler step of `dt` seconds.
///
/// Position is advanced with the velocity from the start of the step, then the
/// velocity picks up thrust and gravity. Thrust is unavailable once a tracked
/// fuel tank runs dry.
pub fn integrate(state: &mut VehicleState, control: Control, params: &VehicleParams, dt: f64) {
    let thrust = if params.track_fuel && state.fuel <= 0.0 {
        0.0
    } else {
        control.thrust
    };

    // Keep runaway candidates finite
    state.velocity = clamp_components(state.velocity, params.max_speed);
    state.angular_velocity = state
        .angular_velocity
        .clamp(-params.max_speed, params.max_speed);

    let (sin, cos) = state.angle.sin_cos();
    state.position += state.velocity * dt;
    state.velocity.x += thrust * sin * dt;
    state.velocity.y += (-thrust * cos + params.gravity) * dt;
    state.angle = normalize_angle(state.angle + state.angular_velocity * dt);
    state.angular_velocity += control.torque * dt;
    state.thrust = thrust;

    if params.track_fuel {
        state.fuel = f64::max(state.fuel - thrust * dt, 0.0);
    }
}
