use bevy::prelude::*;

use crate::components::{AeroForces, Kite, KiteState, LineSystemState};
use crate::resources::{StepCounter, StepInput};

/// Steps between periodic state logs.
const LOG_INTERVAL: u64 = 120;

pub fn step_counter_system(
    input: Res<StepInput>,
    mut counter: ResMut<StepCounter>,
    query: Query<(&KiteState, &AeroForces, &LineSystemState), With<Kite>>,
) {
    counter.steps += 1;
    counter.simulated_time += input.dt;

    if counter.steps % LOG_INTERVAL != 0 {
        return;
    }
    for (state, aero, lines) in query.iter() {
        debug!(
            "t={:.2}s pos=({:.2}, {:.2}, {:.2}) |v|={:.2} aero={:.2}N tension L/R={:.1}/{:.1}N",
            counter.simulated_time,
            state.position.x,
            state.position.y,
            state.position.z,
            state.velocity.norm(),
            aero.force().norm(),
            lines.left.tension,
            lines.right.tension,
        );
    }
}
