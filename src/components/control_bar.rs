use bevy::prelude::*;
use nalgebra::{Unit, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::resources::{ControlBarConfig, Side};

const DEGENERATE_AXIS: f64 = 1e-6;

/// World-space handle positions for the current step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HandlePositions {
    pub left: Vector3<f64>,
    pub right: Vector3<f64>,
}

impl HandlePositions {
    pub fn get(&self, side: Side) -> Vector3<f64> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }
}

/// The pilot's control bar: a fixed pivot whose rotation shortens one
/// line and lengthens the other.
#[derive(Component, Debug, Clone, Serialize, Deserialize)]
pub struct ControlBar {
    pub config: ControlBarConfig,
    /// Current rotation [rad]
    pub rotation: f64,
    /// Rotation being ramped toward [rad]
    pub target: f64,
    pub handles: HandlePositions,
}

impl ControlBar {
    pub fn new(config: ControlBarConfig) -> Self {
        let handles = HandlePositions {
            left: config.position - Vector3::x() * config.half_width,
            right: config.position + Vector3::x() * config.half_width,
        };
        Self {
            config,
            rotation: 0.0,
            target: 0.0,
            handles,
        }
    }

    /// Sets the rotation target, clamped to the bar's travel.
    pub fn set_rotation(&mut self, target: f64) {
        let max = self.config.max_rotation;
        self.target = if target.is_finite() { target.clamp(-max, max) } else { 0.0 };
    }

    /// Maps held direction keys to a rotation target.
    pub fn target_from_keys(&self, left: bool, right: bool) -> f64 {
        match (left, right) {
            (true, false) => self.config.max_rotation,
            (false, true) => -self.config.max_rotation,
            _ => 0.0,
        }
    }

    /// Moves the rotation toward the target. Moving away from neutral uses
    /// the ramp rate, moving back uses the return rate; it snaps exactly
    /// onto the target instead of overshooting.
    pub fn update_rotation(&mut self, dt: f64) {
        let delta = self.target - self.rotation;
        if delta == 0.0 {
            return;
        }
        let returning = self.target.abs() < self.rotation.abs()
            || (self.rotation != 0.0 && self.target.signum() != self.rotation.signum());
        let rate = if returning {
            self.config.return_rate
        } else {
            self.config.ramp_rate
        };

        let step = rate * dt;
        if delta.abs() <= step {
            self.rotation = self.target;
        } else {
            let next = self.rotation + step * delta.signum();
            // Never cross neutral in one step while returning
            if returning && next.signum() != self.rotation.signum() && self.rotation != 0.0 {
                self.rotation = 0.0;
            } else {
                self.rotation = next;
            }
        }
    }

    /// Handle positions for the current rotation, pivoting about the axis
    /// perpendicular to the bar and the direction to the kite.
    pub fn handle_positions(&self, kite_position: &Vector3<f64>) -> HandlePositions {
        let bar_x = Vector3::x();
        let to_kite = kite_position - self.config.position;
        let axis = match to_kite.try_normalize(DEGENERATE_AXIS) {
            Some(dir) => Unit::try_new(bar_x.cross(&dir), DEGENERATE_AXIS)
                .unwrap_or_else(|| Vector3::y_axis()),
            None => Vector3::y_axis(),
        };
        let rotation = UnitQuaternion::from_axis_angle(&axis, self.rotation);
        let offset = bar_x * self.config.half_width;

        HandlePositions {
            left: self.config.position + rotation * (-offset),
            right: self.config.position + rotation * offset,
        }
    }

    pub fn reset(&mut self) {
        self.rotation = 0.0;
        self.target = 0.0;
    }
}
