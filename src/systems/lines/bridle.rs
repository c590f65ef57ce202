use nalgebra::{Matrix3, Vector3};

use crate::resources::{KiteGeometry, Side};
use crate::utils::{trilaterate, VECTOR_EPSILON};

fn anchor_points(geometry: &KiteGeometry, side: Side) -> Option<[Vector3<f64>; 3]> {
    let [a, b, c] = side.bridle_anchors();
    Some([geometry.point(a)?, geometry.point(b)?, geometry.point(c)?])
}

/// Rest length of each bridle on `side`: `factor` times the distance from
/// the anchor to the default control point.
pub fn bridle_rest_lengths(geometry: &KiteGeometry, side: Side, factor: f64) -> Option<[f64; 3]> {
    let control = geometry.point(side.control_point())?;
    let anchors = anchor_points(geometry, side)?;
    Some(anchors.map(|anchor| (anchor - control).norm() * factor))
}

/// Body-local point where the three bridles of `side` meet.
///
/// At factor 1.0 this is the control point itself. Returns `None` when the
/// bridles cannot meet (anchors missing, collinear, or lengths too short).
pub fn convergence_point(geometry: &KiteGeometry, side: Side, factor: f64) -> Option<Vector3<f64>> {
    let control = geometry.point(side.control_point())?;
    let anchors = anchor_points(geometry, side)?;
    let radii = bridle_rest_lengths(geometry, side, factor)?;
    trilaterate(anchors, radii, &control)
}

/// Splits the main-line force acting at the convergence point into the
/// tension of each bridle.
///
/// `line_force` is body-local. Bridles cannot push, so negative components
/// are reported as zero. A degenerate bridle layout yields zero tensions.
pub fn decompose_tension(
    geometry: &KiteGeometry,
    side: Side,
    convergence: &Vector3<f64>,
    line_force: &Vector3<f64>,
) -> [f64; 3] {
    let Some(anchors) = anchor_points(geometry, side) else {
        return [0.0; 3];
    };
    let mut columns = [Vector3::zeros(); 3];
    for (column, anchor) in columns.iter_mut().zip(anchors.iter()) {
        match (convergence - anchor).try_normalize(VECTOR_EPSILON) {
            Some(direction) => *column = direction,
            None => return [0.0; 3],
        }
    }
    let directions = Matrix3::from_columns(&columns);
    match directions.lu().solve(line_force) {
        Some(t) => [t.x.max(0.0), t.y.max(0.0), t.z.max(0.0)],
        None => [0.0; 3],
    }
}
