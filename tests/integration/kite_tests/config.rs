use std::io::Write;

use kiteflyer::resources::LineStrategy;
use kiteflyer::{ConfigError, FlightEngine, SimulationConfig};
use pretty_assertions::assert_eq;

#[test]
fn test_partial_yaml_file_builds_engine() {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    writeln!(
        file,
        "wind:\n  speed: 24.0\n  turbulence: 5.0\nlines:\n  line_length: 18.0\n  strategy: Spring\n"
    )
    .unwrap();

    let config = SimulationConfig::from_file(file.path()).unwrap();
    assert_eq!(config.wind.speed, 24.0);
    assert_eq!(config.lines.strategy, LineStrategy::Spring);

    let engine = FlightEngine::new(config).unwrap();
    assert_eq!(engine.line_length(), 18.0);
    assert_eq!(engine.wind_params().turbulence, 5.0);
}

#[test]
fn test_yaml_round_trip() {
    let mut config = SimulationConfig::default();
    config.wind.direction = 45.0;
    config.lines.bridle_factor = 1.1;
    config.timestep.fixed_step = Some(0.005);

    let parsed = SimulationConfig::from_yaml_str(&config.to_yaml().unwrap()).unwrap();
    assert_eq!(parsed.wind, config.wind);
    assert_eq!(parsed.lines.bridle_factor, 1.1);
    assert_eq!(parsed.timestep.fixed_step, Some(0.005));
}

#[test]
fn test_json_config_file() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(file, r#"{{"physics": {{"mass": 0.4}}}}"#).unwrap();

    let config = SimulationConfig::from_file(file.path()).unwrap();
    assert_eq!(config.physics.mass, 0.4);
}

#[test]
fn test_missing_file_is_io_error() {
    let result = SimulationConfig::from_file("/nonexistent/kite.yaml");
    assert!(matches!(result, Err(ConfigError::Io(_))));
}
