use nalgebra::{Matrix3, UnitQuaternion, Vector3};

use crate::components::{HandlePositions, KiteBody, KiteState, LineAttachments};
use crate::resources::Side;
use crate::utils::{renormalize, world_inverse_inertia, VECTOR_EPSILON};

/// Violation below which a line counts as satisfied [m].
const CONSTRAINT_SLOP: f64 = 1e-6;
const FALLBACK_PASSES: usize = 4;

/// Lines as seen by the solver for one step.
#[derive(Debug, Clone, Copy)]
pub struct LineConstraint<'a> {
    pub attachments: &'a LineAttachments,
    pub handles: &'a HandlePositions,
    pub line_length: f64,
    pub iterations: usize,
}

/// What the solver did to one line during a step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LineCorrection {
    /// Sum of positional multipliers [m*kg]
    pub lambda: f64,
    pub taut: bool,
}

impl LineCorrection {
    /// Tension implied by the positional correction over `dt`.
    pub fn tension(&self, dt: f64) -> f64 {
        if self.taut && dt > 0.0 {
            self.lambda / (dt * dt)
        } else {
            0.0
        }
    }
}

/// Lever arm, outward unit normal (handle to attachment) and distance for
/// one line at the current state.
pub(crate) fn line_geometry(
    state: &KiteState,
    attachment: &Vector3<f64>,
    handle: &Vector3<f64>,
) -> Option<(Vector3<f64>, Vector3<f64>, f64)> {
    let lever = state.orientation * attachment;
    let offset = state.position + lever - handle;
    let distance = offset.norm();
    if distance < VECTOR_EPSILON {
        return None;
    }
    Some((lever, offset / distance, distance))
}

/// One line taking part in a coupled correction.
#[derive(Debug, Clone, Copy)]
struct LineRow {
    side: Side,
    /// Unit direction from handle to attachment
    normal: Vector3<f64>,
    /// Lever arm crossed with the normal
    arm: Vector3<f64>,
    /// Stretch for the position pass, separating speed for the velocity pass
    error: f64,
}

/// Off-diagonal coupling below this fraction of the diagonal product counts
/// as two copies of the same line.
const COUPLING_EPSILON: f64 = 1e-12;

/// Entry of `J M^-1 J^T` for two rows, symmetrised.
fn coupling(inv_mass: f64, inv_inertia: &Matrix3<f64>, a: &LineRow, b: &LineRow) -> f64 {
    let ab = a.normal.dot(&b.normal) * inv_mass + a.arm.dot(&(inv_inertia * b.arm));
    let ba = b.normal.dot(&a.normal) * inv_mass + b.arm.dot(&(inv_inertia * a.arm));
    0.5 * (ab + ba)
}

/// Non-negative multipliers that zero every row's error at once.
///
/// Both lines are solved from the same state, so the result does not depend
/// on which side comes first. A line whose multiplier would have to push is
/// dropped; the other line alone then already satisfies it.
fn coupled_multipliers(rows: &[LineRow], inv_mass: f64, inv_inertia: &Matrix3<f64>) -> [f64; 2] {
    match rows {
        [row] => [row.error / coupling(inv_mass, inv_inertia, row, row), 0.0],
        [a, b] => {
            let kaa = coupling(inv_mass, inv_inertia, a, a);
            let kbb = coupling(inv_mass, inv_inertia, b, b);
            let kab = coupling(inv_mass, inv_inertia, a, b);
            let det = kaa * kbb - kab * kab;
            if det <= COUPLING_EPSILON * kaa * kbb {
                // Indistinguishable lines share the correction
                return [a.error / (kaa + kab.abs()), b.error / (kbb + kab.abs())];
            }
            let la = (a.error * kbb - kab * b.error) / det;
            let lb = (kaa * b.error - kab * a.error) / det;
            if la < 0.0 {
                [0.0, b.error / kbb]
            } else if lb < 0.0 {
                [a.error / kaa, 0.0]
            } else {
                [la, lb]
            }
        }
        _ => [0.0; 2],
    }
}

fn line_row(
    state: &KiteState,
    lines: &LineConstraint,
    side: Side,
    rotation: bool,
) -> Option<(LineRow, Vector3<f64>, f64)> {
    let attachment = lines.attachments.get(side)?;
    let handle = lines.handles.get(side);
    let (lever, normal, distance) = line_geometry(state, &attachment, &handle)?;
    let arm = if rotation {
        lever.cross(&normal)
    } else {
        Vector3::zeros()
    };
    let row = LineRow {
        side,
        normal,
        arm,
        error: 0.0,
    };
    Some((row, lever, distance))
}

/// Projects the predicted state back onto the line constraints.
///
/// Each pass gathers the stretched lines and solves them together, sharing
/// the correction between translation and rotation according to inverse
/// mass and inverse inertia at the attachment lever arms. Afterwards the
/// separating part of the attachment velocities is removed the same way.
/// Any residual stretch the iterations leave behind is removed by a
/// translation-only pass.
pub fn enforce_line_constraints(
    state: &mut KiteState,
    body: &KiteBody,
    lines: &LineConstraint,
) -> [LineCorrection; 2] {
    let mut corrections = [LineCorrection::default(); 2];
    let inv_mass = 1.0 / body.mass;

    for _ in 0..lines.iterations.max(1) {
        let rows: Vec<LineRow> = Side::BOTH
            .iter()
            .filter_map(|side| {
                let (row, _, distance) = line_row(state, lines, *side, true)?;
                let violation = distance - lines.line_length;
                (violation > CONSTRAINT_SLOP).then_some(LineRow {
                    error: violation,
                    ..row
                })
            })
            .collect();
        if rows.is_empty() {
            break;
        }

        let inv_inertia = world_inverse_inertia(&body.inertia_inv, &state.orientation);
        let lambdas = coupled_multipliers(&rows, inv_mass, &inv_inertia);

        let mut translation = Vector3::zeros();
        let mut rotation = Vector3::zeros();
        for (row, lambda) in rows.iter().zip(lambdas) {
            if lambda <= 0.0 {
                continue;
            }
            translation -= row.normal * (lambda * inv_mass);
            rotation -= (inv_inertia * row.arm) * lambda;

            let correction = &mut corrections[row.side.index()];
            correction.lambda += lambda;
            correction.taut = true;
        }
        state.position += translation;
        state.orientation =
            renormalize(UnitQuaternion::from_scaled_axis(rotation) * state.orientation);
    }

    let taut = Side::BOTH.map(|side| corrections[side.index()].taut);
    remove_separating_velocity(state, body, lines, taut);

    clamp_line_stretch(state, lines, lines.line_length);
    corrections
}

fn remove_separating_velocity(
    state: &mut KiteState,
    body: &KiteBody,
    lines: &LineConstraint,
    taut: [bool; 2],
) {
    let rows: Vec<LineRow> = Side::BOTH
        .iter()
        .filter(|side| taut[side.index()])
        .filter_map(|side| {
            let (row, lever, _) = line_row(state, lines, *side, true)?;
            let point_velocity = state.velocity + state.angular_velocity.cross(&lever);
            let radial = point_velocity.dot(&row.normal);
            (radial > 0.0).then_some(LineRow {
                error: radial,
                ..row
            })
        })
        .collect();
    if rows.is_empty() {
        return;
    }

    let inv_mass = 1.0 / body.mass;
    let inv_inertia = world_inverse_inertia(&body.inertia_inv, &state.orientation);
    let impulses = coupled_multipliers(&rows, inv_mass, &inv_inertia);

    let mut linear = Vector3::zeros();
    let mut angular = Vector3::zeros();
    for (row, impulse) in rows.iter().zip(impulses) {
        linear -= row.normal * (impulse * inv_mass);
        angular -= inv_inertia * row.arm * impulse;
    }
    state.velocity += linear;
    state.angular_velocity += angular;
}

/// Translation-only projection: moves the body straight back until no line
/// is longer than `max_length`, and drops the separating linear velocity
/// along the corrected lines. Returns whether anything moved.
pub fn clamp_line_stretch(state: &mut KiteState, lines: &LineConstraint, max_length: f64) -> bool {
    let mut moved = false;
    for _ in 0..FALLBACK_PASSES {
        let rows: Vec<LineRow> = Side::BOTH
            .iter()
            .filter_map(|side| {
                let (row, _, distance) = line_row(state, lines, *side, false)?;
                let excess = distance - max_length;
                (excess > CONSTRAINT_SLOP).then_some(LineRow { error: excess, ..row })
            })
            .collect();
        if rows.is_empty() {
            break;
        }

        let shifts = coupled_multipliers(&rows, 1.0, &Matrix3::zeros());
        let mut translation = Vector3::zeros();
        for (row, shift) in rows.iter().zip(shifts) {
            translation -= row.normal * shift;
        }
        state.position += translation;

        let velocity_rows: Vec<LineRow> = rows
            .iter()
            .zip(shifts)
            .filter(|(_, shift)| *shift > 0.0)
            .filter_map(|(row, _)| {
                let radial = state.velocity.dot(&row.normal);
                (radial > 0.0).then_some(LineRow { error: radial, ..*row })
            })
            .collect();
        let impulses = coupled_multipliers(&velocity_rows, 1.0, &Matrix3::zeros());
        for (row, impulse) in velocity_rows.iter().zip(impulses) {
            state.velocity -= row.normal * impulse;
        }
        moved = true;
    }
    moved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::KiteGeometry;
    use approx::assert_relative_eq;

    fn body() -> KiteBody {
        KiteBody::new(0.31, Matrix3::from_diagonal(&Vector3::new(0.055, 0.02, 0.07)))
    }

    fn attachments() -> LineAttachments {
        let geometry = KiteGeometry::delta();
        LineAttachments {
            left: geometry.point(Side::Left.control_point()),
            right: geometry.point(Side::Right.control_point()),
        }
    }

    fn handles() -> HandlePositions {
        HandlePositions {
            left: Vector3::new(-0.3, 1.0, 0.0),
            right: Vector3::new(0.3, 1.0, 0.0),
        }
    }

    fn distances(state: &KiteState, lines: &LineConstraint) -> [f64; 2] {
        Side::BOTH.map(|side| {
            let attachment = lines.attachments.get(side).unwrap();
            (state.to_world(&attachment) - lines.handles.get(side)).norm()
        })
    }

    #[test]
    fn test_overstretched_lines_are_pulled_back() {
        let attachments = attachments();
        let handles = handles();
        let lines = LineConstraint {
            attachments: &attachments,
            handles: &handles,
            line_length: 10.0,
            iterations: 3,
        };
        let mut state = KiteState::at_rest(Vector3::new(0.0, 6.0, -10.0), UnitQuaternion::identity());
        state.velocity = Vector3::new(0.0, 1.0, -4.0);

        let corrections = enforce_line_constraints(&mut state, &body(), &lines);

        assert!(corrections.iter().all(|c| c.taut && c.lambda > 0.0));
        for distance in distances(&state, &lines) {
            assert!(distance <= 10.0 * 1.01);
        }
        assert_relative_eq!(state.orientation.quaternion().norm(), 1.0, epsilon = 1e-12);

        // No attachment is still moving away from its handle
        for side in Side::BOTH {
            let attachment = attachments.get(side).unwrap();
            let (lever, normal, _) =
                line_geometry(&state, &attachment, &handles.get(side)).unwrap();
            let v = state.velocity + state.angular_velocity.cross(&lever);
            assert!(v.dot(&normal) <= 1e-9);
        }
    }

    #[test]
    fn test_mirrored_lines_correct_symmetrically() {
        let attachments = attachments();
        let handles = handles();
        let lines = LineConstraint {
            attachments: &attachments,
            handles: &handles,
            line_length: 12.0,
            iterations: 3,
        };
        let mut state = KiteState::at_rest(Vector3::new(0.0, 7.0, -13.0), UnitQuaternion::identity());
        state.velocity = Vector3::new(0.0, -0.5, -6.0);

        let corrections = enforce_line_constraints(&mut state, &body(), &lines);

        assert!(corrections.iter().all(|c| c.taut));
        assert_eq!(corrections[0].lambda, corrections[1].lambda);
        assert_eq!(state.position.x, 0.0);
        assert_eq!(state.velocity.x, 0.0);
        let [left, right] = distances(&state, &lines);
        assert_eq!(left, right);
        assert!(left <= 12.0 + 1e-6);
    }

    #[test]
    fn test_single_line_pull_is_dropped_when_other_suffices() {
        let rows = [
            LineRow {
                side: Side::Left,
                normal: Vector3::z(),
                arm: Vector3::zeros(),
                error: 1.0,
            },
            LineRow {
                side: Side::Right,
                normal: Vector3::new(0.6, 0.0, 0.8),
                arm: Vector3::zeros(),
                error: 0.1,
            },
        ];
        let lambdas = coupled_multipliers(&rows, 1.0, &Matrix3::zeros());
        assert_relative_eq!(lambdas[0], 1.0, epsilon = 1e-12);
        assert_eq!(lambdas[1], 0.0);
    }

    #[test]
    fn test_slack_lines_do_nothing() {
        let attachments = attachments();
        let handles = handles();
        let lines = LineConstraint {
            attachments: &attachments,
            handles: &handles,
            line_length: 15.0,
            iterations: 3,
        };
        let start = KiteState::at_rest(Vector3::new(0.0, 5.0, -8.0), UnitQuaternion::identity());
        let mut state = start.clone();

        let corrections = enforce_line_constraints(&mut state, &body(), &lines);

        assert_eq!(corrections, [LineCorrection::default(); 2]);
        assert_eq!(state, start);
        assert_eq!(corrections[0].tension(1.0 / 60.0), 0.0);
    }

    #[test]
    fn test_missing_attachment_is_skipped() {
        let geometry = KiteGeometry::delta();
        let attachments = LineAttachments {
            left: None,
            right: geometry.point(Side::Right.control_point()),
        };
        let handles = handles();
        let lines = LineConstraint {
            attachments: &attachments,
            handles: &handles,
            line_length: 10.0,
            iterations: 2,
        };
        let mut state = KiteState::at_rest(Vector3::new(0.0, 6.0, -12.0), UnitQuaternion::identity());

        let corrections = enforce_line_constraints(&mut state, &body(), &lines);

        assert!(!corrections[Side::Left.index()].taut);
        assert!(corrections[Side::Right.index()].taut);
    }

    #[test]
    fn test_clamp_line_stretch_is_translation_only() {
        let attachments = attachments();
        let handles = handles();
        let lines = LineConstraint {
            attachments: &attachments,
            handles: &handles,
            line_length: 5.0,
            iterations: 1,
        };
        let orientation = UnitQuaternion::from_euler_angles(0.2, 0.1, -0.3);
        let mut state = KiteState::at_rest(Vector3::new(0.0, 4.0, -6.0), orientation);

        assert!(clamp_line_stretch(&mut state, &lines, 5.0));
        assert_eq!(state.orientation, orientation);
        for distance in distances(&state, &lines) {
            assert!(distance <= 5.0 + 1e-6);
        }
    }
}
