use bevy::prelude::*;
use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

/// Marker for the simulated kite entity.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Kite;

/// Rigid-body state of the kite, all in world space.
#[derive(Component, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KiteState {
    /// Position of the body origin (spine base) [m]
    pub position: Vector3<f64>,

    /// Linear velocity [m/s]
    pub velocity: Vector3<f64>,

    /// Angular velocity [rad/s]
    pub angular_velocity: Vector3<f64>,

    /// Rotation from body to world frame
    pub orientation: UnitQuaternion<f64>,

    /// Last committed position known to be finite, used as fallback
    pub previous_position: Vector3<f64>,
}

impl Default for KiteState {
    fn default() -> Self {
        Self::at_rest(Vector3::zeros(), UnitQuaternion::identity())
    }
}

impl KiteState {
    pub fn at_rest(position: Vector3<f64>, orientation: UnitQuaternion<f64>) -> Self {
        Self {
            position,
            velocity: Vector3::zeros(),
            angular_velocity: Vector3::zeros(),
            orientation,
            previous_position: position,
        }
    }

    /// World position of a body-local point.
    pub fn to_world(&self, local: &Vector3<f64>) -> Vector3<f64> {
        self.position + self.orientation * local
    }

    /// Velocity of a body-local point, including rotation.
    pub fn point_velocity(&self, local: &Vector3<f64>) -> Vector3<f64> {
        self.velocity + self.angular_velocity.cross(&(self.orientation * local))
    }

    /// Render-layer transform (f32, same axes).
    pub fn to_transform(&self) -> Transform {
        let q = self.orientation.quaternion();
        Transform {
            translation: Vec3::new(
                self.position.x as f32,
                self.position.y as f32,
                self.position.z as f32,
            ),
            rotation: Quat::from_xyzw(q.i as f32, q.j as f32, q.k as f32, q.w as f32),
            scale: Vec3::ONE,
        }
    }
}
