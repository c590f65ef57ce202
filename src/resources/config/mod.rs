pub mod aerodynamics;
pub mod control;
pub mod lines;
pub mod physics;
pub mod simulation;

pub use aerodynamics::{AerodynamicsConfig, StallCurve};
pub use control::ControlBarConfig;
pub use lines::{BridleMode, LineConfig, LineStrategy};
pub use physics::PhysicsConfig;
pub use simulation::{SimulationConfig, StartConfig, TimestepConfig};
