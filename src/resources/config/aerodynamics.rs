use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::utils::{ConfigError, SEA_LEVEL_AIR_DENSITY};

/// Piecewise-linear lift reduction with angle of attack.
///
/// Full lift below `onset_deg`, linear decay to `floor` at `full_deg`,
/// flat beyond.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StallCurve {
    pub enabled: bool,
    pub onset_deg: f64,
    pub full_deg: f64,
    pub floor: f64,
}

impl Default for StallCurve {
    fn default() -> Self {
        Self {
            enabled: true,
            onset_deg: 10.0,
            full_deg: 18.0,
            floor: 0.4,
        }
    }
}

impl StallCurve {
    pub fn factor(&self, aoa_deg: f64) -> f64 {
        if !self.enabled || aoa_deg <= self.onset_deg {
            return 1.0;
        }
        if aoa_deg >= self.full_deg {
            return self.floor;
        }
        let t = (aoa_deg - self.onset_deg) / (self.full_deg - self.onset_deg);
        1.0 - t * (1.0 - self.floor)
    }
}

#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AerodynamicsConfig {
    pub air_density: f64,
    pub lift_scale: f64,
    /// Below this apparent wind speed all aero outputs are zero [m/s]
    pub min_apparent_wind: f64,
    /// Apparent wind speed cap applied by the wind field [m/s]
    pub max_apparent_wind: f64,
    /// Panels whose |cos(incidence)| is below this are skipped
    pub incidence_epsilon: f64,
    /// Exponential smoothing weight of the newest sample, `None` disables
    pub smoothing: Option<f64>,
    pub stall: StallCurve,
}

impl Default for AerodynamicsConfig {
    fn default() -> Self {
        Self {
            air_density: SEA_LEVEL_AIR_DENSITY,
            lift_scale: 3.0,
            min_apparent_wind: 0.1,
            max_apparent_wind: 30.0,
            incidence_epsilon: 1e-3,
            smoothing: Some(0.15),
            stall: StallCurve::default(),
        }
    }
}

impl AerodynamicsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.air_density > 0.0) {
            return Err(ConfigError::invalid("aerodynamics.air_density", self.air_density));
        }
        if !(self.lift_scale >= 0.0) {
            return Err(ConfigError::invalid("aerodynamics.lift_scale", self.lift_scale));
        }
        if !(self.max_apparent_wind > self.min_apparent_wind) {
            return Err(ConfigError::invalid(
                "aerodynamics.max_apparent_wind",
                self.max_apparent_wind,
            ));
        }
        if let Some(alpha) = self.smoothing {
            if !(alpha > 0.0 && alpha <= 1.0) {
                return Err(ConfigError::invalid("aerodynamics.smoothing", alpha));
            }
        }
        if self.stall.enabled && !(self.stall.full_deg > self.stall.onset_deg) {
            return Err(ConfigError::invalid(
                "aerodynamics.stall.full_deg",
                self.stall.full_deg,
            ));
        }
        if !(0.0..=1.0).contains(&self.stall.floor) {
            return Err(ConfigError::invalid("aerodynamics.stall.floor", self.stall.floor));
        }
        Ok(())
    }
}
