mod air_data;
mod force_calculator;

pub use air_data::air_data_system;
pub use force_calculator::{aero_force_system, calculate_forces, calculate_forces_sampled};
