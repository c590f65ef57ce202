use bevy::prelude::*;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::utils::{GeometryError, VECTOR_EPSILON};

/// Named anchor points used throughout the flight model.
pub mod points {
    pub const NOSE: &str = "nose";
    pub const SPINE_BASE: &str = "spine_base";
    pub const LEFT_WINGTIP: &str = "left_wingtip";
    pub const RIGHT_WINGTIP: &str = "right_wingtip";
    pub const LEFT_WHISKER: &str = "left_whisker";
    pub const RIGHT_WHISKER: &str = "right_whisker";
    pub const LEFT_BRIDLE_INTER: &str = "left_bridle_inter";
    pub const RIGHT_BRIDLE_INTER: &str = "right_bridle_inter";
    pub const BRIDLE_CENTER: &str = "bridle_center";
    pub const LEFT_CONTROL: &str = "left_control";
    pub const RIGHT_CONTROL: &str = "right_control";
}

/// Which side of the spine a line, panel or anchor belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    pub fn index(self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }

    pub fn control_point(self) -> &'static str {
        match self {
            Side::Left => points::LEFT_CONTROL,
            Side::Right => points::RIGHT_CONTROL,
        }
    }

    /// Bridle anchors for this side: nose, leading-edge inter point, spine centre.
    pub fn bridle_anchors(self) -> [&'static str; 3] {
        match self {
            Side::Left => [points::NOSE, points::LEFT_BRIDLE_INTER, points::BRIDLE_CENTER],
            Side::Right => [points::NOSE, points::RIGHT_BRIDLE_INTER, points::BRIDLE_CENTER],
        }
    }
}

/// A flat triangular sail panel, vertices referenced by anchor name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Panel {
    pub vertices: [String; 3],
    /// Precomputed panel area [m²]
    pub area: f64,
}

/// Immutable kite description in body-local coordinates.
///
/// Body frame: X lateral (negative X is the left wing), Y along the spine
/// toward the nose, +Z out of the front face of the sail.
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct KiteGeometry {
    points: BTreeMap<String, Vector3<f64>>,
    panels: Vec<Panel>,
}

impl KiteGeometry {
    /// Builds a geometry, computing each panel's area from its vertices.
    /// Panels with unknown vertices keep a zero area; `validate` reports them.
    pub fn new(points: BTreeMap<String, Vector3<f64>>, panels: Vec<[&str; 3]>) -> Self {
        let panels = panels
            .into_iter()
            .map(|names| {
                let area = match (
                    points.get(names[0]),
                    points.get(names[1]),
                    points.get(names[2]),
                ) {
                    (Some(a), Some(b), Some(c)) => 0.5 * (b - a).cross(&(c - a)).norm(),
                    _ => 0.0,
                };
                Panel {
                    vertices: names.map(str::to_string),
                    area,
                }
            })
            .collect();

        Self { points, panels }
    }

    /// Standard delta kite, 1.65 m span.
    pub fn delta() -> Self {
        use points::*;

        let points = BTreeMap::from(
            [
                (NOSE, Vector3::new(0.0, 0.65, 0.0)),
                (SPINE_BASE, Vector3::new(0.0, 0.0, 0.0)),
                (LEFT_WINGTIP, Vector3::new(-0.825, 0.0, 0.0)),
                (RIGHT_WINGTIP, Vector3::new(0.825, 0.0, 0.0)),
                (LEFT_WHISKER, Vector3::new(-0.4125, 0.1, -0.15)),
                (RIGHT_WHISKER, Vector3::new(0.4125, 0.1, -0.15)),
                (LEFT_BRIDLE_INTER, Vector3::new(-0.619, 0.1625, 0.0)),
                (RIGHT_BRIDLE_INTER, Vector3::new(0.619, 0.1625, 0.0)),
                (BRIDLE_CENTER, Vector3::new(0.0, 0.25, 0.0)),
                (LEFT_CONTROL, Vector3::new(-0.15, 0.5, 0.4)),
                (RIGHT_CONTROL, Vector3::new(0.15, 0.5, 0.4)),
            ]
            .map(|(name, p)| (name.to_string(), p)),
        );

        // Right-hand panels mirror the left ones with reversed winding so
        // both halves share a +Z raw normal.
        let panels = vec![
            [NOSE, LEFT_WINGTIP, LEFT_WHISKER],
            [NOSE, LEFT_WHISKER, SPINE_BASE],
            [NOSE, RIGHT_WHISKER, RIGHT_WINGTIP],
            [NOSE, SPINE_BASE, RIGHT_WHISKER],
        ];

        Self::new(points, panels)
    }

    pub fn point(&self, name: &str) -> Option<Vector3<f64>> {
        self.points.get(name).copied()
    }

    pub fn points(&self) -> impl Iterator<Item = (&str, &Vector3<f64>)> {
        self.points.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    /// Resolves a panel's three vertices, `None` if any anchor is missing.
    pub fn panel_vertices(&self, panel: &Panel) -> Option<[Vector3<f64>; 3]> {
        Some([
            self.point(&panel.vertices[0])?,
            self.point(&panel.vertices[1])?,
            self.point(&panel.vertices[2])?,
        ])
    }

    pub fn total_area(&self) -> f64 {
        self.panels.iter().map(|p| p.area).sum()
    }

    /// Checks that every referenced anchor exists and no panel is degenerate.
    pub fn validate(&self) -> Result<(), GeometryError> {
        match self.issues().into_iter().next() {
            Some(issue) => Err(issue),
            None => Ok(()),
        }
    }

    /// Every problem with the geometry, each missing anchor reported once.
    ///
    /// None of these is fatal to a flight: panels with a missing anchor or
    /// zero area contribute nothing and a missing control point leaves its
    /// line unattached.
    pub fn issues(&self) -> Vec<GeometryError> {
        let mut missing = BTreeSet::new();
        let mut issues = Vec::new();
        for (index, panel) in self.panels.iter().enumerate() {
            let mut complete = true;
            for name in &panel.vertices {
                if !self.points.contains_key(name) {
                    complete = false;
                    if missing.insert(name.as_str()) {
                        issues.push(GeometryError::MissingPoint(name.clone()));
                    }
                }
            }
            if complete && panel.area < VECTOR_EPSILON {
                issues.push(GeometryError::DegeneratePanel(index));
            }
        }
        for side in Side::BOTH {
            let name = side.control_point();
            if !self.points.contains_key(name) && missing.insert(name) {
                issues.push(GeometryError::MissingPoint(name.to_string()));
            }
        }
        issues
    }
}

impl Default for KiteGeometry {
    fn default() -> Self {
        Self::delta()
    }
}
