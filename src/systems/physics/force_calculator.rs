use crate::components::{KiteBody, KiteState, ReferenceFrame};
use crate::resources::PhysicsConfig;
use bevy::prelude::*;
use nalgebra::{UnitQuaternion, Vector3};

/// Sums gravity plus every recorded force and moment into world-frame
/// totals. Forces with an application point add their lever-arm moment.
pub fn calculate_net_forces_moments(
    body: &KiteBody,
    orientation: &UnitQuaternion<f64>,
    gravity: &Vector3<f64>,
) -> (Vector3<f64>, Vector3<f64>) {
    let mut net_force = gravity * body.mass;
    let mut net_moment = Vector3::zeros();

    for force in &body.forces {
        let force_world = match force.frame {
            ReferenceFrame::Body => orientation * force.vector,
            ReferenceFrame::World => force.vector,
        };
        net_force += force_world;

        if let Some(point) = force.point {
            net_moment += (orientation * point).cross(&force_world);
        }
    }

    for moment in &body.moments {
        net_moment += match moment.frame {
            ReferenceFrame::Body => orientation * moment.vector,
            ReferenceFrame::World => moment.vector,
        };
    }

    (net_force, net_moment)
}

pub fn force_calculator_system(
    mut query: Query<(&mut KiteBody, &KiteState)>,
    config: Res<PhysicsConfig>,
) {
    for (mut body, state) in query.iter_mut() {
        let (force, moment) = calculate_net_forces_moments(&body, &state.orientation, &config.gravity);
        body.net_force = force;
        body.net_moment = moment;
    }
}
