use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::utils::ConfigError;

/// How the control lines act on the kite. Exactly one is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineStrategy {
    /// Post-integration position/velocity projection
    PositionBased,
    /// Pre-integration spring force, clamped to max tension
    Spring,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BridleMode {
    /// Lines attach straight to the control points
    Direct,
    /// Lines attach to convergence points held by three bridles per side
    Bridled,
}

#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LineConfig {
    pub strategy: LineStrategy,
    pub bridles: BridleMode,
    /// Maximum line length [m]
    pub line_length: f64,
    pub min_line_length: f64,
    pub max_line_length: f64,
    /// Allowed relative stretch before the line is considered violated
    pub tolerance: f64,
    /// Projection iterations per step (position-based only)
    pub iterations: usize,
    /// Spring constant [N/m] (spring only)
    pub stiffness: f64,
    pub max_tension: f64,
    pub bridle_factor: f64,
    pub min_bridle_factor: f64,
    pub max_bridle_factor: f64,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            strategy: LineStrategy::PositionBased,
            bridles: BridleMode::Direct,
            line_length: 15.0,
            min_line_length: 3.0,
            max_line_length: 50.0,
            tolerance: 0.01,
            iterations: 3,
            stiffness: 400.0,
            max_tension: 400.0,
            bridle_factor: 1.0,
            min_bridle_factor: 0.8,
            max_bridle_factor: 1.4,
        }
    }
}

impl LineConfig {
    pub fn clamp_line_length(&self, length: f64) -> f64 {
        length.clamp(self.min_line_length, self.max_line_length)
    }

    pub fn clamp_bridle_factor(&self, factor: f64) -> f64 {
        factor.clamp(self.min_bridle_factor, self.max_bridle_factor)
    }

    /// Longest distance a line may reach.
    pub fn max_stretched_length(&self) -> f64 {
        self.line_length * (1.0 + self.tolerance)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_line_length > 0.0 && self.min_line_length <= self.max_line_length) {
            return Err(ConfigError::invalid("lines.min_line_length", self.min_line_length));
        }
        if !(self.line_length >= self.min_line_length && self.line_length <= self.max_line_length)
        {
            return Err(ConfigError::invalid("lines.line_length", self.line_length));
        }
        if !(self.tolerance > 0.0 && self.tolerance <= 0.05) {
            return Err(ConfigError::invalid("lines.tolerance", self.tolerance));
        }
        if self.iterations == 0 {
            return Err(ConfigError::invalid("lines.iterations", self.iterations));
        }
        if !(self.stiffness > 0.0) {
            return Err(ConfigError::invalid("lines.stiffness", self.stiffness));
        }
        if !(self.max_tension > 0.0) {
            return Err(ConfigError::invalid("lines.max_tension", self.max_tension));
        }
        if !(self.min_bridle_factor > 0.0 && self.min_bridle_factor <= self.max_bridle_factor) {
            return Err(ConfigError::invalid(
                "lines.min_bridle_factor",
                self.min_bridle_factor,
            ));
        }
        if !(self.bridle_factor >= self.min_bridle_factor
            && self.bridle_factor <= self.max_bridle_factor)
        {
            return Err(ConfigError::invalid("lines.bridle_factor", self.bridle_factor));
        }
        Ok(())
    }
}
