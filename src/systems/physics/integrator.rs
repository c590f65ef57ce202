use crate::components::{
    ControlBar, Kite, KiteBody, KiteState, LineReading, LineSystemState, SafetyFlags,
};
use crate::resources::{KiteGeometry, LineConfig, LineStrategy, PhysicsConfig, Side, StepInput};
use crate::systems::lines::{
    clamp_line_stretch, enforce_line_constraints, LineConstraint, LineCorrection,
};
use crate::systems::physics::apply_ground_contact;
use crate::utils::{
    clamp_magnitude, is_finite_vector, renormalize, world_inverse_inertia, ANGULAR_EPSILON,
};
use bevy::prelude::*;
use nalgebra::{Unit, UnitQuaternion, Vector3};

/// Everything the integrator reads but does not own for one step.
pub struct IntegratorContext<'a> {
    pub physics: &'a PhysicsConfig,
    pub geometry: &'a KiteGeometry,
    pub lines: LineConstraint<'a>,
    pub strategy: LineStrategy,
    /// Hard limit on line length after the step [m]
    pub max_line_length: f64,
}

/// System to advance the kite by one step.
///
/// Reads the net force and moment accumulated by the force calculator and
/// the handle positions of the control bar. Position-based lines are
/// enforced inside the step; their estimated tension is written back to the
/// line state.
pub fn physics_integrator_system(
    mut query: Query<
        (
            &mut KiteState,
            &mut KiteBody,
            &mut LineSystemState,
            &mut SafetyFlags,
            &ControlBar,
        ),
        With<Kite>,
    >,
    input: Res<StepInput>,
    physics: Res<PhysicsConfig>,
    line_config: Res<LineConfig>,
    geometry: Res<KiteGeometry>,
) {
    let dt = input.dt;

    for (mut state, mut body, mut lines, mut flags, bar) in query.iter_mut() {
        let attachments = lines.attachments;
        let max_line_length = match line_config.strategy {
            LineStrategy::PositionBased => lines.line_length,
            LineStrategy::Spring => lines.line_length * (1.0 + line_config.tolerance),
        };
        let ctx = IntegratorContext {
            physics: &physics,
            geometry: &geometry,
            lines: LineConstraint {
                attachments: &attachments,
                handles: &bar.handles,
                line_length: lines.line_length,
                iterations: line_config.iterations,
            },
            strategy: line_config.strategy,
            max_line_length,
        };

        let corrections = integrate_step(&mut state, &mut body, &ctx, dt, &mut flags);

        if line_config.strategy == LineStrategy::PositionBased {
            for side in Side::BOTH {
                let correction = corrections[side.index()];
                let reading = LineReading {
                    taut: correction.taut,
                    tension: correction.tension(dt),
                    ..lines.reading(side).clone()
                };
                lines.update_reading(side, reading);
            }
        }

        if flags.any_warning() {
            debug!("Safety clamps active: {:?}", *flags);
        }
    }
}

/// Advances `state` by `dt` under the body's net force and moment.
///
/// Order: validate loads, optional low-pass, linear update with clamps,
/// predicted position, line constraints, ground contact, finite check,
/// commit, angular update. Returns the line corrections of the step (all
/// zero for the spring strategy, whose forces are already in the net force).
pub fn integrate_step(
    state: &mut KiteState,
    body: &mut KiteBody,
    ctx: &IntegratorContext,
    dt: f64,
    flags: &mut SafetyFlags,
) -> [LineCorrection; 2] {
    let physics = ctx.physics;
    *flags = SafetyFlags::default();

    let force = validated(body.net_force, physics.max_force, "force", &mut flags.force_rejected);
    let torque = validated(
        body.net_moment,
        physics.max_torque,
        "torque",
        &mut flags.torque_rejected,
    );

    let (force, torque) = match physics.force_smoothing {
        Some(alpha) => body.filter.apply(force, torque, alpha),
        None => (force, torque),
    };

    // Linear
    let (acceleration, accel_clamped) =
        clamp_magnitude(force / body.mass, physics.max_acceleration);
    flags.acceleration_exceeded = accel_clamped;
    flags.last_acceleration = acceleration;

    state.velocity += acceleration * dt;
    state.velocity *= physics.linear_damping;
    let (velocity, velocity_clamped) = clamp_magnitude(state.velocity, physics.max_velocity);
    state.velocity = velocity;
    flags.velocity_exceeded = velocity_clamped;

    let orientation_before = state.orientation;
    state.position += state.velocity * dt;

    let corrections = match ctx.strategy {
        LineStrategy::PositionBased => enforce_line_constraints(state, body, &ctx.lines),
        LineStrategy::Spring => [LineCorrection::default(); 2],
    };

    flags.ground_contact = apply_ground_contact(state, ctx.geometry, physics);

    let orientation_finite = state.orientation.coords.iter().all(|c| c.is_finite());
    if !is_finite_vector(&state.position) || !is_finite_vector(&state.velocity) || !orientation_finite
    {
        warn!(
            "Non-finite kite state, reverting to last valid position {:?}",
            state.previous_position
        );
        state.position = state.previous_position;
        state.velocity = Vector3::zeros();
        state.angular_velocity = Vector3::zeros();
        state.orientation = orientation_before;
        flags.position_reverted = true;
    }

    state.previous_position = state.position;

    integrate_rotation(state, body, torque, physics, dt, flags);

    if clamp_line_stretch(state, &ctx.lines, ctx.max_line_length) {
        state.previous_position = state.position;
    }

    corrections
}

/// Replaces a non-finite or over-limit load by zero.
fn validated(load: Vector3<f64>, ceiling: f64, name: &str, rejected: &mut bool) -> Vector3<f64> {
    if is_finite_vector(&load) && load.norm() <= ceiling {
        return load;
    }
    warn!("Rejected {} {:?} (ceiling {})", name, load.as_slice(), ceiling);
    *rejected = true;
    Vector3::zeros()
}

fn integrate_rotation(
    state: &mut KiteState,
    body: &KiteBody,
    torque: Vector3<f64>,
    physics: &PhysicsConfig,
    dt: f64,
    flags: &mut SafetyFlags,
) {
    let inv_inertia = world_inverse_inertia(&body.inertia_inv, &state.orientation);
    let damping_torque = -state.angular_velocity * physics.angular_drag;
    let (angular_acceleration, alpha_clamped) = clamp_magnitude(
        inv_inertia * (torque + damping_torque),
        physics.max_angular_acceleration,
    );

    state.angular_velocity += angular_acceleration * dt;
    state.angular_velocity *= physics.angular_damping;
    let (omega, omega_clamped) =
        clamp_magnitude(state.angular_velocity, physics.max_angular_velocity);
    flags.angular_exceeded = alpha_clamped || omega_clamped;
    flags.last_angular_acceleration = angular_acceleration;

    if !is_finite_vector(&omega) {
        state.angular_velocity = Vector3::zeros();
        return;
    }
    state.angular_velocity = omega;

    let rate = omega.norm();
    if rate > ANGULAR_EPSILON {
        let axis = Unit::new_normalize(omega);
        let delta = UnitQuaternion::from_axis_angle(&axis, rate * dt);
        state.orientation = renormalize(delta * state.orientation);
    }
}
