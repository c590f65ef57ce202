use bevy::prelude::*;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::utils::{clamp_magnitude, wrap_degrees, KMH_TO_MS};

/// User-facing wind settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindParams {
    /// Wind speed [km/h], >= 0
    pub speed: f64,
    /// Direction the wind blows toward, degrees in [0, 360). 0 blows toward -Z.
    pub direction: f64,
    /// Turbulence intensity [%], 0..=100
    pub turbulence: f64,
}

impl Default for WindParams {
    fn default() -> Self {
        Self {
            speed: 18.0,
            direction: 0.0,
            turbulence: 0.0,
        }
    }
}

impl WindParams {
    pub fn sanitized(self) -> Self {
        Self {
            speed: if self.speed.is_finite() { self.speed.max(0.0) } else { 0.0 },
            direction: if self.direction.is_finite() { wrap_degrees(self.direction) } else { 0.0 },
            turbulence: if self.turbulence.is_finite() {
                self.turbulence.clamp(0.0, 100.0)
            } else {
                0.0
            },
        }
    }

    /// Overwrites only the fields present in `update`.
    pub fn apply(&mut self, update: &WindUpdate) {
        if let Some(speed) = update.speed {
            self.speed = speed;
        }
        if let Some(direction) = update.direction {
            self.direction = direction;
        }
        if let Some(turbulence) = update.turbulence {
            self.turbulence = turbulence;
        }
        *self = self.clone().sanitized();
    }
}

/// Partial wind update, unset fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WindUpdate {
    pub speed: Option<f64>,
    pub direction: Option<f64>,
    pub turbulence: Option<f64>,
}

/// Rotation of the body used to evaluate apparent wind at a specific point.
#[derive(Debug, Clone, Copy)]
pub struct RotationSample {
    pub angular_velocity: Vector3<f64>,
    pub point: Vector3<f64>,
    pub center: Vector3<f64>,
}

// (frequency [rad/s], weight) pairs summed per axis
const TURBULENCE_X: [(f64, f64); 2] = [(0.5, 1.0), (1.7, 0.35)];
const TURBULENCE_Y: [(f64, f64); 2] = [(0.3, 0.3), (1.1, 0.1)];
const TURBULENCE_Z: [(f64, f64); 2] = [(0.7, 1.0), (1.3, 0.35)];

/// Ambient wind plus coherent pseudo-turbulence.
///
/// Turbulence is a deterministic function of the internal clock, so two
/// runs fed the same dt sequence see identical gusts.
#[derive(Resource, Debug, Clone)]
pub struct WindField {
    params: WindParams,
    /// Apparent wind magnitude cap [m/s]
    pub max_apparent_speed: f64,
    elapsed: f64,
}

impl Default for WindField {
    fn default() -> Self {
        Self::new(WindParams::default())
    }
}

impl WindField {
    pub fn new(params: WindParams) -> Self {
        Self {
            params: params.sanitized(),
            max_apparent_speed: 30.0,
            elapsed: 0.0,
        }
    }

    pub fn params(&self) -> &WindParams {
        &self.params
    }

    pub fn set_params(&mut self, update: &WindUpdate) {
        self.params.apply(update);
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn advance(&mut self, dt: f64) {
        if dt.is_finite() && dt > 0.0 {
            self.elapsed += dt;
        }
    }

    pub fn reset_clock(&mut self) {
        self.elapsed = 0.0;
    }

    pub fn speed_ms(&self) -> f64 {
        self.params.speed * KMH_TO_MS
    }

    /// Ambient wind without turbulence.
    pub fn base_wind(&self) -> Vector3<f64> {
        let speed = self.speed_ms();
        let direction = self.params.direction.to_radians();
        Vector3::new(direction.sin() * speed, 0.0, -direction.cos() * speed)
    }

    pub fn turbulence_at(&self, time: f64) -> Vector3<f64> {
        let intensity = self.params.turbulence / 100.0 * self.speed_ms();
        if intensity <= 0.0 {
            return Vector3::zeros();
        }
        let sum_sin = |terms: &[(f64, f64)]| -> f64 {
            terms.iter().map(|(f, w)| w * (f * time).sin()).sum()
        };
        let sum_cos = |terms: &[(f64, f64)]| -> f64 {
            terms.iter().map(|(f, w)| w * (f * time).cos()).sum()
        };
        Vector3::new(
            sum_sin(&TURBULENCE_X),
            sum_sin(&TURBULENCE_Y),
            sum_cos(&TURBULENCE_Z),
        ) * intensity
    }

    /// Ambient wind at the current clock value.
    pub fn wind_vector(&self) -> Vector3<f64> {
        self.base_wind() + self.turbulence_at(self.elapsed)
    }

    /// Advances the clock by `dt` and returns the apparent wind.
    pub fn apparent_wind(
        &mut self,
        body_velocity: &Vector3<f64>,
        dt: f64,
        rotation: Option<RotationSample>,
    ) -> Vector3<f64> {
        self.advance(dt);
        self.apparent_wind_at(body_velocity, rotation)
    }

    /// Apparent wind at the current clock value, without advancing it.
    pub fn apparent_wind_at(
        &self,
        body_velocity: &Vector3<f64>,
        rotation: Option<RotationSample>,
    ) -> Vector3<f64> {
        let mut point_velocity = *body_velocity;
        if let Some(sample) = rotation {
            point_velocity += sample
                .angular_velocity
                .cross(&(sample.point - sample.center));
        }
        let (apparent, _) =
            clamp_magnitude(self.wind_vector() - point_velocity, self.max_apparent_speed);
        apparent
    }
}
