pub mod aerodynamics;
mod control;
mod diagnostics;
pub mod lines;
mod params;
pub mod physics;

pub use aerodynamics::{aero_force_system, air_data_system};
pub use control::control_bar_system;
pub use diagnostics::step_counter_system;
pub use lines::{line_diagnostics_system, spring_line_force_system, spring_lines_active};
pub use params::{apply_parameter_changes_system, ParameterChange};
pub use physics::{force_calculator_system, physics_integrator_system};
