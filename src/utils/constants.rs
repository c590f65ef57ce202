pub const GRAVITY: f64 = 9.81; // m/s^2
pub const SEA_LEVEL_AIR_DENSITY: f64 = 1.225; // kg/m^3
pub const KMH_TO_MS: f64 = 1.0 / 3.6;

pub const MAX_TIMESTEP: f64 = 1.0 / 60.0; // Maximum physics timestep
pub const MIN_TIMESTEP: f64 = 1.0 / 1000.0; // Minimum physics timestep

// Numerical thresholds
pub const VECTOR_EPSILON: f64 = 1e-9;
pub const QUATERNION_EPSILON: f64 = 1e-10;
pub const ANGULAR_EPSILON: f64 = 1e-6; // rad/s
