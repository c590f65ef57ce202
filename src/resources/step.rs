use bevy::prelude::*;

/// Input for the step about to run. Written by the engine before every
/// `App::update`, read by every flight system.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct StepInput {
    /// Clamped step duration [s]
    pub dt: f64,
    /// Requested bar rotation [rad], clamped by the bar itself
    pub target_bar_rotation: f64,
    pub paused: bool,
}

impl StepInput {
    pub fn is_running(&self) -> bool {
        !self.paused && self.dt > 0.0
    }
}

/// Run condition: only step the flight model while playing.
pub fn flight_running(input: Res<StepInput>) -> bool {
    input.is_running()
}

/// Counts completed flight steps, mostly for diagnostics.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct StepCounter {
    pub steps: u64,
    pub simulated_time: f64,
}
