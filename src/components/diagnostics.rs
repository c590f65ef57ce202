use bevy::prelude::*;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Clamp activity of the last step. Purely informational: none of these
/// conditions stops the simulation.
#[derive(Component, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SafetyFlags {
    pub acceleration_exceeded: bool,
    pub velocity_exceeded: bool,
    pub angular_exceeded: bool,
    pub force_rejected: bool,
    pub torque_rejected: bool,
    pub position_reverted: bool,
    pub ground_contact: bool,
    /// Linear acceleration actually applied last step [m/s^2]
    pub last_acceleration: Vector3<f64>,
    /// Angular acceleration actually applied last step [rad/s^2]
    pub last_angular_acceleration: Vector3<f64>,
}

impl SafetyFlags {
    pub fn any_warning(&self) -> bool {
        self.acceleration_exceeded
            || self.velocity_exceeded
            || self.angular_exceeded
            || self.force_rejected
            || self.torque_rejected
            || self.position_reverted
    }
}
