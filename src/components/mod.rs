pub mod aerodynamics;
pub mod control_bar;
pub mod diagnostics;
pub mod kite;
pub mod lines;
pub mod physics;

pub use aerodynamics::{AeroForces, AeroSample};
pub use control_bar::{ControlBar, HandlePositions};
pub use diagnostics::SafetyFlags;
pub use kite::{Kite, KiteState};
pub use lines::{BridleReading, LineAttachments, LineReading, LineSystemState};
pub use physics::{Force, ForceCategory, ForceFilter, KiteBody, Moment, ReferenceFrame};
