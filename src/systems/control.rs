use bevy::prelude::*;

use crate::components::{ControlBar, Kite, KiteState};
use crate::resources::StepInput;

/// Feeds the step's bar target to the control bar, ramps its rotation and
/// recomputes the handle positions for the kite's current position.
pub fn control_bar_system(
    input: Res<StepInput>,
    mut query: Query<(&KiteState, &mut ControlBar), With<Kite>>,
) {
    for (state, mut bar) in query.iter_mut() {
        bar.set_rotation(input.target_bar_rotation);
        bar.update_rotation(input.dt);
        bar.handles = bar.handle_positions(&state.position);
    }
}
