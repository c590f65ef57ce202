use approx::assert_relative_eq;
use kiteflyer::components::{KiteState, SafetyFlags};
use kiteflyer::resources::PhysicsConfig;
use nalgebra::{UnitQuaternion, Vector3};

/// Assert that a kite state is finite and unit-oriented
#[track_caller]
pub fn assert_state_valid(state: &KiteState) {
    assert!(
        state.position.iter().all(|x| x.is_finite()),
        "Position is not finite: {:?}",
        state.position
    );
    assert!(
        state.velocity.iter().all(|x| x.is_finite()),
        "Velocity is not finite: {:?}",
        state.velocity
    );
    assert!(
        state.angular_velocity.iter().all(|x| x.is_finite()),
        "Angular velocity is not finite: {:?}",
        state.angular_velocity
    );
    assert_relative_eq!(state.orientation.quaternion().norm(), 1.0, epsilon = 1e-9);
}

/// Assert that the motion limits of `config` hold
#[track_caller]
pub fn assert_within_limits(state: &KiteState, flags: &SafetyFlags, config: &PhysicsConfig) {
    assert!(
        state.velocity.norm() <= config.max_velocity + 1e-9,
        "Speed {} exceeds {}",
        state.velocity.norm(),
        config.max_velocity
    );
    assert!(
        state.angular_velocity.norm() <= config.max_angular_velocity + 1e-9,
        "Angular speed {} exceeds {}",
        state.angular_velocity.norm(),
        config.max_angular_velocity
    );
    assert!(
        flags.last_acceleration.norm() <= config.max_acceleration + 1e-9,
        "Acceleration {} exceeds {}",
        flags.last_acceleration.norm(),
        config.max_acceleration
    );
}

/// Assert that two positions are approximately equal
#[track_caller]
pub fn assert_position_eq(actual: &Vector3<f64>, expected: &Vector3<f64>, epsilon: f64) {
    assert_relative_eq!(actual.x, expected.x, epsilon = epsilon);
    assert_relative_eq!(actual.y, expected.y, epsilon = epsilon);
    assert_relative_eq!(actual.z, expected.z, epsilon = epsilon);
}

/// Assert that two attitudes are approximately equal
#[track_caller]
pub fn assert_attitude_eq(
    actual: &UnitQuaternion<f64>,
    expected: &UnitQuaternion<f64>,
    epsilon: f64,
) {
    let angle = (actual.inverse() * expected).angle();
    assert!(
        angle < epsilon,
        "Attitude difference {} exceeds epsilon {}",
        angle,
        epsilon
    );
}
