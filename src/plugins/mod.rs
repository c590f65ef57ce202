mod flight;
mod registry;

pub use flight::{sync_transform_system, KiteFlightPlugin, KiteFlightSet};
pub use registry::{FlightModel, FlightModelRegistry};
