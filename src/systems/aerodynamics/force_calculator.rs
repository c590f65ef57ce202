use bevy::prelude::*;
use nalgebra::{UnitQuaternion, Vector3};

use crate::components::{
    AeroForces, AeroSample, Force, ForceCategory, Kite, KiteBody, KiteState, Moment,
    ReferenceFrame,
};
use crate::resources::{AerodynamicsConfig, KiteGeometry, RotationSample, WindField};
use crate::utils::VECTOR_EPSILON;

const MIN_TORQUE_RATIO: f64 = 0.1;
const MAX_TORQUE_RATIO: f64 = 3.0;

// --- Pure Calculation Logic ---

/// Integrates flat-plate pressure over every sail panel for a uniform
/// apparent wind.
///
/// # Arguments
/// * `geometry` - Named points and triangular panels, body frame.
/// * `config` - Air density, thresholds, lift scale and stall curve.
/// * `apparent_wind` - Apparent wind in world frame [m/s].
/// * `orientation` - Body to world rotation.
pub fn calculate_forces(
    geometry: &KiteGeometry,
    config: &AerodynamicsConfig,
    apparent_wind: &Vector3<f64>,
    orientation: &UnitQuaternion<f64>,
) -> AeroSample {
    calculate_forces_sampled(geometry, config, orientation, apparent_wind, |_| *apparent_wind)
}

/// Same as [`calculate_forces`], but asks `sample_wind` for the apparent
/// wind at each panel centroid. The closure receives the centroid offset
/// from the body origin in world frame.
///
/// `reference_wind` gates the whole calculation: below the minimum apparent
/// wind the result is all zeros.
pub fn calculate_forces_sampled<F>(
    geometry: &KiteGeometry,
    config: &AerodynamicsConfig,
    orientation: &UnitQuaternion<f64>,
    reference_wind: &Vector3<f64>,
    sample_wind: F,
) -> AeroSample
where
    F: Fn(&Vector3<f64>) -> Vector3<f64>,
{
    let mut sample = AeroSample {
        stall_factor: 1.0,
        ..Default::default()
    };
    if reference_wind.norm() < config.min_apparent_wind {
        return sample;
    }

    let mut raw_force = Vector3::zeros();
    let mut raw_torque = Vector3::zeros();
    let mut left = Vector3::zeros();
    let mut right = Vector3::zeros();
    let mut weighted_aoa = 0.0;
    let mut area_used = 0.0;

    for panel in geometry.panels() {
        let Some([a, b, c]) = geometry.panel_vertices(panel) else {
            continue;
        };
        let Some(normal_local) = (b - a).cross(&(c - a)).try_normalize(VECTOR_EPSILON) else {
            continue;
        };
        let normal = orientation * normal_local;
        let centroid_local = (a + b + c) / 3.0;
        let offset = orientation * centroid_local;

        let wind = sample_wind(&offset);
        let speed = wind.norm();
        if speed < config.min_apparent_wind {
            continue;
        }
        let cos_incidence = (wind / speed).dot(&normal);
        // Both faces catch wind: only the magnitude of the incidence matters
        let incidence = cos_incidence.abs();
        if incidence < config.incidence_epsilon {
            continue;
        }
        let push_direction = if cos_incidence >= 0.0 { normal } else { -normal };

        let dynamic_pressure = 0.5 * config.air_density * speed * speed;
        let panel_force = push_direction * (dynamic_pressure * panel.area * incidence);

        raw_force += panel_force;
        raw_torque += offset.cross(&panel_force);
        if centroid_local.x < 0.0 {
            left += panel_force;
        } else {
            right += panel_force;
        }
        weighted_aoa += incidence.min(1.0).asin().to_degrees() * panel.area;
        area_used += panel.area;
        sample.panels_used += 1;
    }

    if sample.panels_used == 0 {
        return sample;
    }

    sample.angle_of_attack = weighted_aoa / area_used;
    sample.stall_factor = config.stall.factor(sample.angle_of_attack);
    let scale = config.lift_scale * sample.stall_factor;

    sample.raw_force = raw_force;
    sample.lift = raw_force * scale;
    sample.left_force = left * scale;
    sample.right_force = right * scale;

    let raw_norm = raw_force.norm();
    let torque_ratio = if raw_norm > VECTOR_EPSILON {
        (sample.lift.norm() / raw_norm).clamp(MIN_TORQUE_RATIO, MAX_TORQUE_RATIO)
    } else {
        1.0
    };
    sample.torque = raw_torque * torque_ratio;
    sample
}

// --- Bevy System ---

/// Computes the aerodynamic force and torque on the kite and replaces the
/// aerodynamic entries of its force list.
pub fn aero_force_system(
    mut query: Query<(&KiteState, &mut AeroForces, &mut KiteBody), With<Kite>>,
    geometry: Res<KiteGeometry>,
    wind: Res<WindField>,
    config: Res<AerodynamicsConfig>,
) {
    for (state, mut aero, mut body) in query.iter_mut() {
        let reference = aero.apparent_wind;
        let sample = calculate_forces_sampled(
            &geometry,
            &config,
            &state.orientation,
            &reference,
            |offset| {
                wind.apparent_wind_at(
                    &state.velocity,
                    Some(RotationSample {
                        angular_velocity: state.angular_velocity,
                        point: state.position + offset,
                        center: state.position,
                    }),
                )
            },
        );
        aero.record(sample, reference, config.smoothing);

        body.clear_category(&ForceCategory::Aerodynamic);
        body.add_force(Force {
            vector: aero.force(),
            point: None,
            frame: ReferenceFrame::World,
            category: ForceCategory::Aerodynamic,
        });
        body.add_moment(Moment {
            vector: aero.torque(),
            frame: ReferenceFrame::World,
            category: ForceCategory::Aerodynamic,
        });
    }
}
