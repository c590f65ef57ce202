use bevy::prelude::*;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::utils::ConfigError;

#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlBarConfig {
    /// Bar centre in world space [m]
    pub position: Vector3<f64>,
    pub half_width: f64,
    /// Rotation limit either side of neutral [rad]
    pub max_rotation: f64,
    /// Rate while a direction is held [rad/s]
    pub ramp_rate: f64,
    /// Rate back to neutral once released [rad/s]
    pub return_rate: f64,
}

impl Default for ControlBarConfig {
    fn default() -> Self {
        Self {
            position: Vector3::new(0.0, 1.0, 0.0),
            half_width: 0.3,
            max_rotation: PI / 6.0,
            ramp_rate: 2.5,
            return_rate: 3.5,
        }
    }
}

impl ControlBarConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.half_width > 0.0) {
            return Err(ConfigError::invalid("control_bar.half_width", self.half_width));
        }
        if !(self.max_rotation > 0.0 && self.max_rotation < PI / 2.0) {
            return Err(ConfigError::invalid("control_bar.max_rotation", self.max_rotation));
        }
        if !(self.ramp_rate > 0.0) {
            return Err(ConfigError::invalid("control_bar.ramp_rate", self.ramp_rate));
        }
        if !(self.return_rate > 0.0) {
            return Err(ConfigError::invalid("control_bar.return_rate", self.return_rate));
        }
        Ok(())
    }
}
