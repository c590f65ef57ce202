//! Kite flight dynamics: panel aerodynamics, two-line constraints with
//! optional bridles, and a clamped rigid-body integrator, run as a Bevy
//! schedule behind [`FlightEngine`].

pub mod components;
pub mod engine;
pub mod plugins;
pub mod resources;
pub mod systems;
pub mod utils;

pub use engine::{FlightEngine, FlightEngineBuilder, FlightTelemetry};
pub use plugins::{FlightModel, FlightModelRegistry, KiteFlightPlugin, KiteFlightSet};
pub use resources::{
    BridleMode, KiteGeometry, LineStrategy, Side, SimulationConfig, WindParams, WindUpdate,
};
pub use utils::{ConfigError, GeometryError};
