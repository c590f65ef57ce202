use bevy::prelude::*;

use crate::components::{Kite, LineSystemState};
use crate::resources::{KiteGeometry, LineConfig, WindField, WindUpdate};
use crate::systems::lines::resolve_attachments;

/// A parameter mutation requested between steps. Queued changes are applied
/// together at the start of the next step, never in the middle of one.
#[derive(Event, Debug, Clone, PartialEq)]
pub enum ParameterChange {
    Wind(WindUpdate),
    LineLength(f64),
    BridleFactor(f64),
}

pub fn apply_parameter_changes_system(
    mut events: EventReader<ParameterChange>,
    mut wind: ResMut<WindField>,
    mut line_config: ResMut<LineConfig>,
    geometry: Res<KiteGeometry>,
    mut query: Query<&mut LineSystemState, With<Kite>>,
) {
    for change in events.read() {
        match change {
            ParameterChange::Wind(update) => {
                wind.set_params(update);
                info!("Wind set to {:?}", wind.params());
            }
            ParameterChange::LineLength(length) => {
                if !length.is_finite() {
                    warn!("Ignoring non-finite line length {}", length);
                    continue;
                }
                let length = line_config.clamp_line_length(*length);
                line_config.line_length = length;
                for mut lines in query.iter_mut() {
                    lines.line_length = length;
                }
                info!("Line length set to {:.2} m", length);
            }
            ParameterChange::BridleFactor(factor) => {
                if !factor.is_finite() {
                    warn!("Ignoring non-finite bridle factor {}", factor);
                    continue;
                }
                let factor = line_config.clamp_bridle_factor(*factor);
                line_config.bridle_factor = factor;
                let attachments = resolve_attachments(&geometry, line_config.bridles, factor);
                for mut lines in query.iter_mut() {
                    lines.bridle_factor = factor;
                    lines.attachments = attachments;
                }
                info!("Bridle factor set to {:.3}", factor);
            }
        }
    }
}
