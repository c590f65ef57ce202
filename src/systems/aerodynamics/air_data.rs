use bevy::prelude::*;

use crate::components::{AeroForces, Kite, KiteState};
use crate::resources::{StepInput, WindField};

/// Advances the wind clock by the step duration and records the apparent
/// wind seen at the body origin.
///
/// Runs once per step before any force is computed, so every later system
/// samples turbulence at the same instant.
pub fn air_data_system(
    input: Res<StepInput>,
    mut wind: ResMut<WindField>,
    mut query: Query<(&KiteState, &mut AeroForces), With<Kite>>,
) {
    wind.advance(input.dt);

    for (state, mut aero) in query.iter_mut() {
        aero.apparent_wind = wind.apparent_wind_at(&state.velocity, None);
    }
}
