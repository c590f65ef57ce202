mod force_calculator;
mod ground;
mod integrator;

pub use force_calculator::{calculate_net_forces_moments, force_calculator_system};
pub use ground::apply_ground_contact;
pub use integrator::{integrate_step, physics_integrator_system, IntegratorContext};
