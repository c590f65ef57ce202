use nalgebra::{Matrix3, UnitQuaternion, Vector3};

use super::constants::VECTOR_EPSILON;

/// Returns true when every component of the vector is finite.
#[inline]
pub fn is_finite_vector(v: &Vector3<f64>) -> bool {
    v.iter().all(|x| x.is_finite())
}

/// Scale `v` down to `max` magnitude. Returns the (possibly clamped) vector
/// and whether the clamp was active.
pub fn clamp_magnitude(v: Vector3<f64>, max: f64) -> (Vector3<f64>, bool) {
    let norm = v.norm();
    if norm > max && norm > VECTOR_EPSILON {
        (v * (max / norm), true)
    } else {
        (v, false)
    }
}

/// Wraps an angle in degrees into [0, 360).
pub fn wrap_degrees(deg: f64) -> f64 {
    let wrapped = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Inverse inertia tensor expressed in the world frame.
pub fn world_inverse_inertia(
    inertia_inv_body: &Matrix3<f64>,
    orientation: &UnitQuaternion<f64>,
) -> Matrix3<f64> {
    let r = orientation.to_rotation_matrix();
    r.matrix() * inertia_inv_body * r.matrix().transpose()
}

/// Renormalise a quaternion after composition.
pub fn renormalize(q: UnitQuaternion<f64>) -> UnitQuaternion<f64> {
    UnitQuaternion::new_normalize(q.into_inner())
}

/// Finds the point at distances `radii` from three anchor points.
///
/// Two mirror solutions exist in general; the one closest to `hint` is
/// returned. `None` when the spheres do not intersect or the anchors are
/// collinear.
pub fn trilaterate(
    anchors: [Vector3<f64>; 3],
    radii: [f64; 3],
    hint: &Vector3<f64>,
) -> Option<Vector3<f64>> {
    let [p1, p2, p3] = anchors;
    let [r1, r2, r3] = radii;

    let d_vec = p2 - p1;
    let d = d_vec.norm();
    if d < VECTOR_EPSILON {
        return None;
    }
    let ex = d_vec / d;
    let i = ex.dot(&(p3 - p1));
    let ey_raw = p3 - p1 - ex * i;
    let ey_norm = ey_raw.norm();
    if ey_norm < VECTOR_EPSILON {
        return None;
    }
    let ey = ey_raw / ey_norm;
    let ez = ex.cross(&ey);
    let j = ey.dot(&(p3 - p1));

    let x = (r1 * r1 - r2 * r2 + d * d) / (2.0 * d);
    let y = (r1 * r1 - r3 * r3 + i * i + j * j) / (2.0 * j) - (i / j) * x;
    let z_sq = r1 * r1 - x * x - y * y;
    if z_sq < -1e-9 {
        return None;
    }
    let z = z_sq.max(0.0).sqrt();

    let base = p1 + ex * x + ey * y;
    let a = base + ez * z;
    let b = base - ez * z;
    if (a - hint).norm_squared() <= (b - hint).norm_squared() {
        Some(a)
    } else {
        Some(b)
    }
}
