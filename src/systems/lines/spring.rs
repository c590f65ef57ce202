use bevy::prelude::*;
use nalgebra::Vector3;

use crate::components::{
    ControlBar, Force, ForceCategory, HandlePositions, Kite, KiteBody, KiteState,
    LineAttachments, LineReading, LineSystemState, ReferenceFrame,
};
use crate::resources::{LineConfig, LineStrategy, Side};
use crate::utils::VECTOR_EPSILON;

/// Spring forces of both lines for the current state, world frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineTensions {
    pub left_force: Vector3<f64>,
    pub right_force: Vector3<f64>,
    /// Torque about the body origin [N*m]
    pub torque: Vector3<f64>,
    pub left: LineReading,
    pub right: LineReading,
}

impl LineTensions {
    pub fn force(&self, side: Side) -> Vector3<f64> {
        match side {
            Side::Left => self.left_force,
            Side::Right => self.right_force,
        }
    }
}

/// Force-based line model: a taut line pulls the attachment toward its
/// handle with `stiffness * extension`, capped at the maximum tension. A
/// line shorter than its length carries nothing.
pub fn calculate_line_tensions(
    state: &KiteState,
    attachments: &LineAttachments,
    handles: &HandlePositions,
    line_length: f64,
    config: &LineConfig,
) -> LineTensions {
    let mut tensions = LineTensions::default();

    for side in Side::BOTH {
        let Some(attachment) = attachments.get(side) else {
            continue;
        };
        let lever = state.orientation * attachment;
        let point = state.position + lever;
        let to_handle = handles.get(side) - point;
        let distance = to_handle.norm();

        let mut reading = LineReading {
            distance,
            attachment: point,
            ..Default::default()
        };
        let extension = distance - line_length;
        if extension > 0.0 && distance > VECTOR_EPSILON {
            let tension = (config.stiffness * extension).min(config.max_tension);
            let force = to_handle / distance * tension;
            tensions.torque += lever.cross(&force);
            match side {
                Side::Left => tensions.left_force = force,
                Side::Right => tensions.right_force = force,
            }
            reading.tension = tension;
            reading.taut = true;
        }

        match side {
            Side::Left => tensions.left = reading,
            Side::Right => tensions.right = reading,
        }
    }
    tensions
}

/// Run condition for the spring line system.
pub fn spring_lines_active(config: Res<LineConfig>) -> bool {
    config.strategy == LineStrategy::Spring
}

/// Adds the spring line forces to the kite before force summation.
pub fn spring_line_force_system(
    mut query: Query<(&KiteState, &ControlBar, &mut KiteBody, &mut LineSystemState), With<Kite>>,
    config: Res<LineConfig>,
) {
    for (state, bar, mut body, mut lines) in query.iter_mut() {
        let tensions = calculate_line_tensions(
            state,
            &lines.attachments,
            &bar.handles,
            lines.line_length,
            &config,
        );

        body.clear_category(&ForceCategory::Line);
        for side in Side::BOTH {
            let force = tensions.force(side);
            if let (Some(attachment), true) = (lines.attachments.get(side), force.norm() > 0.0) {
                body.add_force(Force {
                    vector: force,
                    point: Some(attachment),
                    frame: ReferenceFrame::World,
                    category: ForceCategory::Line,
                });
            }
        }

        lines.total_force = tensions.left_force + tensions.right_force;
        lines.total_torque = tensions.torque;
        lines.update_reading(Side::Left, tensions.left);
        lines.update_reading(Side::Right, tensions.right);
    }
}
