use bevy::prelude::*;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::resources::Side;

/// Diagnostic reading of one control line after the step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineReading {
    /// Distance from attachment point to handle [m]
    pub distance: f64,
    /// Tension [N]; estimated from the correction for position-based lines
    pub tension: f64,
    pub taut: bool,
    /// World-space attachment point (control or convergence point)
    pub attachment: Vector3<f64>,
}

/// Body-local points where the main lines act on the kite: the control
/// points, or the bridle convergence points when bridles are modelled.
/// `None` when the anchor is missing from the geometry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LineAttachments {
    pub left: Option<Vector3<f64>>,
    pub right: Option<Vector3<f64>>,
}

impl LineAttachments {
    pub fn get(&self, side: Side) -> Option<Vector3<f64>> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }
}

/// Tension carried by each of the three bridles on one side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BridleReading {
    /// Body-local convergence point
    pub convergence_point: Vector3<f64>,
    /// Per-anchor tension [N], same order as `Side::bridle_anchors`
    pub tensions: [f64; 3],
    /// Rest length of each bridle [m]
    pub rest_lengths: [f64; 3],
}

/// Mutable state of the line system owned by the kite entity.
#[derive(Component, Debug, Clone, Serialize, Deserialize)]
pub struct LineSystemState {
    pub line_length: f64,
    pub bridle_factor: f64,
    pub attachments: LineAttachments,
    pub left: LineReading,
    pub right: LineReading,
    pub left_bridle: Option<BridleReading>,
    pub right_bridle: Option<BridleReading>,
    /// Net force applied by the lines this step (spring) or equivalent (PBD)
    pub total_force: Vector3<f64>,
    pub total_torque: Vector3<f64>,
}

impl LineSystemState {
    pub fn new(line_length: f64, bridle_factor: f64, attachments: LineAttachments) -> Self {
        Self {
            line_length,
            bridle_factor,
            attachments,
            left: LineReading::default(),
            right: LineReading::default(),
            left_bridle: None,
            right_bridle: None,
            total_force: Vector3::zeros(),
            total_torque: Vector3::zeros(),
        }
    }

    pub fn reading(&self, side: Side) -> &LineReading {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    pub fn reading_mut(&mut self, side: Side) -> &mut LineReading {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    /// Stores a fresh reading for `side`. Returns whether the line went from
    /// slack to taut or back, which is logged.
    pub fn update_reading(&mut self, side: Side, reading: LineReading) -> bool {
        let slot = self.reading_mut(side);
        let changed = slot.taut != reading.taut;
        if changed {
            let status = if reading.taut { "taut" } else { "slack" };
            debug!("{:?} line {} (tension {:.2} N)", side, status, reading.tension);
        }
        *slot = reading;
        changed
    }

    pub fn bridle_mut(&mut self, side: Side) -> &mut Option<BridleReading> {
        match side {
            Side::Left => &mut self.left_bridle,
            Side::Right => &mut self.right_bridle,
        }
    }

    pub fn bridle(&self, side: Side) -> Option<&BridleReading> {
        match side {
            Side::Left => self.left_bridle.as_ref(),
            Side::Right => self.right_bridle.as_ref(),
        }
    }
}
