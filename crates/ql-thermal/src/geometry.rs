//! Canonical 1D-discretizable shapes.
//!
//! Each geometry reduces to a single coordinate from the center (r=0,
//! zero-flux symmetry) to the surface. The curvature exponent `m` in
//!
//!   dT/dt = alpha * (d2T/dr2 + m/r * dT/dr)
//!
//! is 0 for a slab, 1 for a cylinder, 2 for a sphere.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use ql_core::Real;

use crate::error::{ThermalError, ThermalResult};

/// 1D heat-conduction geometry. Dimensions in meters. Immutable per run.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    /// Infinite slab, symmetric about the midplane; solve half thickness.
    Slab { half_thickness: Real },
    /// Solid cylinder, radial conduction.
    Cylinder { radius: Real },
    /// Solid sphere, radial conduction.
    Sphere { radius: Real },
}

impl Geometry {
    /// Distance from center to surface.
    pub fn extent(&self) -> Real {
        match *self {
            Geometry::Slab { half_thickness } => half_thickness,
            Geometry::Cylinder { radius } | Geometry::Sphere { radius } => radius,
        }
    }

    /// Curvature exponent of the conduction operator.
    pub fn shape_exponent(&self) -> Real {
        match self {
            Geometry::Slab { .. } => 0.0,
            Geometry::Cylinder { .. } => 1.0,
            Geometry::Sphere { .. } => 2.0,
        }
    }

    /// Uniform node positions, center -> surface.
    pub fn mesh(&self, n_nodes: usize) -> Vec<Real> {
        let last = (n_nodes - 1) as Real;
        let extent = self.extent();
        (0..n_nodes).map(|i| extent * i as Real / last).collect()
    }

    /// Volume per unit slab area / unit cylinder length; absolute for spheres.
    pub fn volume(&self) -> Real {
        match *self {
            Geometry::Slab { half_thickness } => 2.0 * half_thickness,
            Geometry::Cylinder { radius } => PI * radius * radius,
            Geometry::Sphere { radius } => 4.0 / 3.0 * PI * radius.powi(3),
        }
    }

    /// Characteristic length for Biot-number estimates (volume/surface).
    pub fn characteristic_length(&self) -> Real {
        match *self {
            Geometry::Slab { half_thickness } => half_thickness,
            Geometry::Cylinder { radius } => radius / 2.0,
            Geometry::Sphere { radius } => radius / 3.0,
        }
    }

    pub fn validate(&self) -> ThermalResult<()> {
        let extent = self.extent();
        if !extent.is_finite() || extent <= 0.0 {
            return Err(ThermalError::Configuration {
                what: format!("geometry extent must be positive, got {extent}"),
            });
        }
        Ok(())
    }
}
