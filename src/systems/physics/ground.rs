use nalgebra::Vector3;

use crate::components::KiteState;
use crate::resources::{KiteGeometry, PhysicsConfig};

/// Keeps every named point of the kite above the minimum height.
///
/// When the lowest point dips below it, the whole body is lifted by the
/// penetration depth, downward velocity is dropped and horizontal velocity
/// is scaled by the friction factor. Returns whether contact occurred.
pub fn apply_ground_contact(
    state: &mut KiteState,
    geometry: &KiteGeometry,
    config: &PhysicsConfig,
) -> bool {
    let lowest = geometry
        .points()
        .map(|(_, local)| state.to_world(local).y)
        .fold(state.position.y, f64::min);

    let penetration = config.min_height - lowest;
    if !(penetration > 0.0) {
        return false;
    }

    state.position += Vector3::y() * penetration;
    if state.velocity.y < 0.0 {
        state.velocity.y = 0.0;
    }
    state.velocity.x *= config.ground_friction;
    state.velocity.z *= config.ground_friction;
    true
}
