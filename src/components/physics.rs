use bevy::prelude::*;
use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

/// Mass properties and the forces/moments accumulated for the current step.
#[derive(Component, Debug, Clone, Serialize, Deserialize)]
pub struct KiteBody {
    pub mass: f64,
    /// Body-frame inertia tensor
    pub inertia: Matrix3<f64>,
    pub inertia_inv: Matrix3<f64>,
    pub net_force: Vector3<f64>,
    pub net_moment: Vector3<f64>,
    pub forces: Vec<Force>,
    pub moments: Vec<Moment>,
    pub filter: ForceFilter,
}

/// Exponential low-pass over net force and moment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForceFilter {
    force: Vector3<f64>,
    moment: Vector3<f64>,
    seeded: bool,
}

impl ForceFilter {
    /// Blends in a new sample with weight `alpha` and returns the filtered pair.
    pub fn apply(
        &mut self,
        force: Vector3<f64>,
        moment: Vector3<f64>,
        alpha: f64,
    ) -> (Vector3<f64>, Vector3<f64>) {
        if self.seeded {
            self.force = self.force * (1.0 - alpha) + force * alpha;
            self.moment = self.moment * (1.0 - alpha) + moment * alpha;
        } else {
            self.force = force;
            self.moment = moment;
            self.seeded = true;
        }
        (self.force, self.moment)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Force {
    pub vector: Vector3<f64>,
    /// Application point, body-local; `None` acts through the origin
    pub point: Option<Vector3<f64>>,
    pub frame: ReferenceFrame,
    pub category: ForceCategory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Moment {
    pub vector: Vector3<f64>,
    pub frame: ReferenceFrame,
    pub category: ForceCategory,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ReferenceFrame {
    Body,
    World,
}

/// Source of a recorded force. Gravity is never recorded; it is added from
/// the config when the net force is summed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ForceCategory {
    Aerodynamic,
    Line,
    Custom(String),
}

impl KiteBody {
    pub fn new(mass: f64, inertia: Matrix3<f64>) -> Self {
        let inertia_inv = inertia.try_inverse().unwrap_or_else(|| {
            error!("Inertia matrix is uninvertable, defaulting to identity.");
            Matrix3::identity()
        });
        Self {
            mass,
            inertia,
            inertia_inv,
            net_force: Vector3::zeros(),
            net_moment: Vector3::zeros(),
            forces: Vec::new(),
            moments: Vec::new(),
            filter: ForceFilter::default(),
        }
    }

    pub fn add_force(&mut self, force: Force) {
        self.forces.push(force);
    }

    pub fn add_moment(&mut self, moment: Moment) {
        self.moments.push(moment);
    }

    /// Drops every force and moment of the given category.
    pub fn clear_category(&mut self, category: &ForceCategory) {
        self.forces.retain(|f| &f.category != category);
        self.moments.retain(|m| &m.category != category);
    }
}
