use bevy::prelude::*;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Output of one panel-pressure integration, all vectors in world space.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AeroSample {
    /// Total (scaled) aerodynamic force [N]
    pub lift: Vector3<f64>,
    /// Always zero: drag is embedded in the pressure-normal force
    pub drag: Vector3<f64>,
    /// Torque about the body origin [N*m]
    pub torque: Vector3<f64>,
    /// Sub-total of panels left of the spine
    pub left_force: Vector3<f64>,
    /// Sub-total of panels right of the spine
    pub right_force: Vector3<f64>,
    /// Unscaled panel sum, before lift scale and stall factor
    pub raw_force: Vector3<f64>,
    /// Area-weighted mean angle of attack [deg]
    pub angle_of_attack: f64,
    pub stall_factor: f64,
    pub panels_used: usize,
}

/// Aerodynamic state of the kite: the latest raw sample and its low-passed
/// counterpart, which is what the integrator receives when smoothing is on.
#[derive(Component, Debug, Clone, Default, Serialize, Deserialize)]
pub struct AeroForces {
    pub raw: AeroSample,
    pub smoothed_force: Vector3<f64>,
    pub smoothed_torque: Vector3<f64>,
    pub apparent_wind: Vector3<f64>,
    initialised: bool,
}

impl AeroForces {
    /// Stores a new sample and updates the filter. `alpha` is the weight of
    /// the newest sample; `None` passes the sample through.
    pub fn record(&mut self, sample: AeroSample, apparent_wind: Vector3<f64>, alpha: Option<f64>) {
        match alpha {
            Some(alpha) if self.initialised => {
                self.smoothed_force = self.smoothed_force * (1.0 - alpha) + sample.lift * alpha;
                self.smoothed_torque = self.smoothed_torque * (1.0 - alpha) + sample.torque * alpha;
            }
            _ => {
                self.smoothed_force = sample.lift;
                self.smoothed_torque = sample.torque;
            }
        }
        self.initialised = true;
        self.raw = sample;
        self.apparent_wind = apparent_wind;
    }

    pub fn force(&self) -> Vector3<f64> {
        self.smoothed_force
    }

    pub fn torque(&self) -> Vector3<f64> {
        self.smoothed_torque
    }
}
