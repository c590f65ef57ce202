use bevy::prelude::*;
use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{AerodynamicsConfig, ControlBarConfig, LineConfig, PhysicsConfig};
use crate::resources::WindParams;
use crate::utils::{ConfigError, MAX_TIMESTEP, MIN_TIMESTEP};

/// Initial kite placement, relative to the control bar.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StartConfig {
    /// Distance from the bar as a fraction of the line length
    pub distance_fraction: f64,
    /// Starting altitude [m]
    pub altitude: f64,
    /// Initial pitch about the body X axis [deg]; positive tips the nose
    /// toward the bar
    pub pitch_deg: f64,
}

impl Default for StartConfig {
    fn default() -> Self {
        Self {
            distance_fraction: 0.95,
            altitude: 7.0,
            pitch_deg: 30.0,
        }
    }
}

impl StartConfig {
    /// Initial pose: directly downwind of the bar at the configured altitude.
    pub fn initial_pose(
        &self,
        bar_position: &Vector3<f64>,
        line_length: f64,
        wind_direction_deg: f64,
    ) -> (Vector3<f64>, UnitQuaternion<f64>) {
        let distance = line_length * self.distance_fraction;
        let rise = self.altitude - bar_position.y;
        let horizontal = (distance * distance - rise * rise).max(0.0).sqrt();

        let direction = wind_direction_deg.to_radians();
        let downwind = Vector3::new(direction.sin(), 0.0, -direction.cos());
        let mut position = bar_position + downwind * horizontal;
        position.y = self.altitude;

        // Face the sail back toward the bar
        let heading = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), -direction);
        let pitch = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), self.pitch_deg.to_radians());
        (position, heading * pitch)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimestepConfig {
    /// Upper bound applied to every externally supplied dt [s]
    pub max_dt: f64,
    /// When set, frames are split into fixed steps of this size [s]
    pub fixed_step: Option<f64>,
    pub max_substeps: u32,
}

impl Default for TimestepConfig {
    fn default() -> Self {
        Self {
            max_dt: MAX_TIMESTEP,
            fixed_step: None,
            max_substeps: 8,
        }
    }
}

impl TimestepConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.max_dt >= MIN_TIMESTEP && self.max_dt <= 0.1) {
            return Err(ConfigError::invalid("timestep.max_dt", self.max_dt));
        }
        if let Some(step) = self.fixed_step {
            if !(step >= MIN_TIMESTEP && step <= self.max_dt) {
                return Err(ConfigError::invalid("timestep.fixed_step", step));
            }
        }
        if self.max_substeps == 0 {
            return Err(ConfigError::invalid("timestep.max_substeps", self.max_substeps));
        }
        Ok(())
    }
}

/// Complete configuration of one flight engine.
#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub physics: PhysicsConfig,
    pub aerodynamics: AerodynamicsConfig,
    pub lines: LineConfig,
    pub wind: WindParams,
    pub control_bar: ControlBarConfig,
    pub start: StartConfig,
    pub timestep: TimestepConfig,
}

impl SimulationConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&contents),
            _ => Self::from_yaml_str(&contents),
        }
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.physics.validate()?;
        self.aerodynamics.validate()?;
        self.lines.validate()?;
        self.control_bar.validate()?;
        self.timestep.validate()?;
        if !(self.wind.speed >= 0.0) {
            return Err(ConfigError::invalid("wind.speed", self.wind.speed));
        }
        if !(0.0..=100.0).contains(&self.wind.turbulence) {
            return Err(ConfigError::invalid("wind.turbulence", self.wind.turbulence));
        }
        if !(self.start.distance_fraction > 0.0 && self.start.distance_fraction <= 1.0) {
            return Err(ConfigError::invalid(
                "start.distance_fraction",
                self.start.distance_fraction,
            ));
        }
        if !(self.start.altitude > self.physics.min_height) {
            return Err(ConfigError::invalid("start.altitude", self.start.altitude));
        }
        Ok(())
    }
}
