use bevy::prelude::*;
use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

use crate::utils::{ConfigError, GRAVITY};

/// Rigid-body integration limits and damping.
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    // Mass properties
    pub mass: f64,
    pub inertia_diagonal: Vector3<f64>,
    pub gravity: Vector3<f64>,

    // Input validation ceilings, only absurd loads are rejected
    pub max_force: f64,
    pub max_torque: f64,

    // Integration limits
    pub max_acceleration: f64,
    pub max_velocity: f64,
    pub max_angular_acceleration: f64,
    pub max_angular_velocity: f64,

    // Damping, applied multiplicatively every step
    pub linear_damping: f64,
    pub angular_damping: f64,
    pub angular_drag: f64,

    /// Optional low-pass on force/torque before integration (new-sample weight)
    pub force_smoothing: Option<f64>,

    // Ground contact
    pub min_height: f64,
    pub ground_friction: f64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            mass: 0.2,                                          // kg
            inertia_diagonal: Vector3::new(0.055, 0.02, 0.07), // kg*m^2
            gravity: Vector3::new(0.0, -GRAVITY, 0.0),
            max_force: 1.0e6,  // N
            max_torque: 1.0e5, // N*m
            max_acceleration: 50.0,         // m/s^2
            max_velocity: 25.0,             // m/s
            max_angular_acceleration: 60.0, // rad/s^2
            max_angular_velocity: 8.0,      // rad/s
            linear_damping: 0.995,
            angular_damping: 0.97,
            angular_drag: 0.08,
            force_smoothing: None,
            min_height: 0.05,
            ground_friction: 0.85,
        }
    }
}

impl PhysicsConfig {
    pub fn inertia(&self) -> Matrix3<f64> {
        Matrix3::from_diagonal(&self.inertia_diagonal)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.mass > 0.0) {
            return Err(ConfigError::invalid("physics.mass", self.mass));
        }
        if self.inertia_diagonal.iter().any(|i| !(*i > 0.0)) {
            return Err(ConfigError::invalid(
                "physics.inertia_diagonal",
                format!("{:?}", self.inertia_diagonal.as_slice()),
            ));
        }
        for (name, value) in [
            ("physics.linear_damping", self.linear_damping),
            ("physics.angular_damping", self.angular_damping),
            ("physics.ground_friction", self.ground_friction),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(ConfigError::invalid(name, value));
            }
        }
        for (name, value) in [
            ("physics.max_force", self.max_force),
            ("physics.max_torque", self.max_torque),
            ("physics.max_acceleration", self.max_acceleration),
            ("physics.max_velocity", self.max_velocity),
            ("physics.max_angular_acceleration", self.max_angular_acceleration),
            ("physics.max_angular_velocity", self.max_angular_velocity),
        ] {
            if !(value > 0.0) {
                return Err(ConfigError::invalid(name, value));
            }
        }
        if let Some(alpha) = self.force_smoothing {
            if !(alpha > 0.0 && alpha <= 1.0) {
                return Err(ConfigError::invalid("physics.force_smoothing", alpha));
            }
        }
        Ok(())
    }
}
