mod bridle;
mod pbd;
mod spring;

pub use bridle::{bridle_rest_lengths, convergence_point, decompose_tension};
pub use pbd::{clamp_line_stretch, enforce_line_constraints, LineConstraint, LineCorrection};
pub use spring::{
    calculate_line_tensions, spring_line_force_system, spring_lines_active, LineTensions,
};

use bevy::prelude::*;
use nalgebra::Vector3;

use crate::components::{
    BridleReading, ControlBar, Kite, KiteState, LineAttachments, LineSystemState,
};
use crate::resources::{BridleMode, KiteGeometry, LineConfig, LineStrategy, Side};
use crate::utils::VECTOR_EPSILON;

/// Where the main lines act on the body for the given bridle setup.
///
/// Bridles that cannot converge at `bridle_factor` fall back to the control
/// point; a missing control point leaves that line unattached.
pub fn resolve_attachments(
    geometry: &KiteGeometry,
    bridles: BridleMode,
    bridle_factor: f64,
) -> LineAttachments {
    let resolve = |side: Side| {
        let control = geometry.point(side.control_point());
        match bridles {
            BridleMode::Direct => control,
            BridleMode::Bridled => {
                convergence_point(geometry, side, bridle_factor).or_else(|| {
                    warn!(
                        "{:?} bridles cannot converge at factor {:.3}, using control point",
                        side, bridle_factor
                    );
                    control
                })
            }
        }
    };
    LineAttachments {
        left: resolve(Side::Left),
        right: resolve(Side::Right),
    }
}

/// Refreshes the per-line readings after integration: distances, the
/// equivalent force of position-based lines and, with bridles, how the
/// main-line force splits over the three bridles of each side.
pub fn line_diagnostics_system(
    mut query: Query<(&KiteState, &ControlBar, &mut LineSystemState), With<Kite>>,
    geometry: Res<KiteGeometry>,
    config: Res<LineConfig>,
) {
    for (state, bar, mut lines) in query.iter_mut() {
        let mut total_force = Vector3::zeros();
        let mut total_torque = Vector3::zeros();
        let bridle_factor = lines.bridle_factor;

        for side in Side::BOTH {
            let Some(attachment) = lines.attachments.get(side) else {
                *lines.reading_mut(side) = Default::default();
                *lines.bridle_mut(side) = None;
                continue;
            };
            let lever = state.orientation * attachment;
            let point = state.position + lever;
            let to_handle = bar.handles.get(side) - point;
            let distance = to_handle.norm();

            let reading = lines.reading_mut(side);
            reading.distance = distance;
            reading.attachment = point;
            let force = if reading.taut && distance > VECTOR_EPSILON {
                to_handle / distance * reading.tension
            } else {
                Vector3::zeros()
            };
            total_force += force;
            total_torque += lever.cross(&force);

            let bridle = (config.bridles == BridleMode::Bridled).then(|| {
                let local_force = state.orientation.inverse() * force;
                BridleReading {
                    convergence_point: attachment,
                    tensions: decompose_tension(&geometry, side, &attachment, &local_force),
                    rest_lengths: bridle_rest_lengths(&geometry, side, bridle_factor)
                        .unwrap_or([0.0; 3]),
                }
            });
            *lines.bridle_mut(side) = bridle;
        }

        if config.strategy == LineStrategy::PositionBased {
            lines.total_force = total_force;
            lines.total_torque = total_torque;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_direct_lines_attach_at_control_points() {
        let geometry = KiteGeometry::delta();
        let attachments = resolve_attachments(&geometry, BridleMode::Direct, 1.3);
        assert_eq!(attachments.left, geometry.point(Side::Left.control_point()));
        assert_eq!(attachments.right, geometry.point(Side::Right.control_point()));
    }

    #[test]
    fn test_bridled_attachments_follow_factor() {
        let geometry = KiteGeometry::delta();
        let neutral = resolve_attachments(&geometry, BridleMode::Bridled, 1.0);
        assert_relative_eq!(
            neutral.left.unwrap(),
            geometry.point(Side::Left.control_point()).unwrap(),
            epsilon = 1e-9
        );

        let long = resolve_attachments(&geometry, BridleMode::Bridled, 1.4);
        assert!(long.left.unwrap().z > neutral.left.unwrap().z);
        // Mirror symmetry survives trilateration
        assert_relative_eq!(long.left.unwrap().x, -long.right.unwrap().x, epsilon = 1e-9);
    }

    #[test]
    fn test_unreachable_bridles_fall_back() {
        let geometry = KiteGeometry::delta();
        let attachments = resolve_attachments(&geometry, BridleMode::Bridled, 0.1);
        assert_eq!(attachments.left, geometry.point(Side::Left.control_point()));
    }
}
