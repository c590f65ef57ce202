pub mod config;
mod geometry;
mod step;
mod wind;

pub use config::{
    AerodynamicsConfig, BridleMode, ControlBarConfig, LineConfig, LineStrategy, PhysicsConfig,
    SimulationConfig, StallCurve, StartConfig, TimestepConfig,
};
pub use geometry::{points, KiteGeometry, Panel, Side};
pub use step::{flight_running, StepCounter, StepInput};
pub use wind::{RotationSample, WindField, WindParams, WindUpdate};
