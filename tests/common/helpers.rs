use kiteflyer::resources::Side;
use kiteflyer::{FlightEngine, SimulationConfig};

use crate::common::FRAME_DT;

/// Wind 18 km/h from 0 deg, no turbulence, 15 m lines.
pub fn create_scenario_config() -> SimulationConfig {
    let mut config = SimulationConfig::default();
    config.wind.speed = 18.0;
    config.wind.direction = 0.0;
    config.wind.turbulence = 0.0;
    config.lines.line_length = 15.0;
    config
}

/// Longest of the two handle-to-attachment distances.
pub fn max_line_distance(engine: &FlightEngine) -> f64 {
    Side::BOTH
        .iter()
        .filter_map(|side| engine.line_reading(*side))
        .map(|reading| reading.distance)
        .fold(0.0, f64::max)
}

/// Runs `engine` for `seconds` of simulated time and returns the sampled
/// positions.
pub fn simulate_duration(engine: &mut FlightEngine, seconds: f64, bar: f64) -> Vec<[f64; 3]> {
    let steps = (seconds / FRAME_DT).round() as usize;
    (0..steps)
        .map(|_| {
            engine.update(FRAME_DT, bar, false);
            let p = engine.position();
            [p.x, p.y, p.z]
        })
        .collect()
}
