//! Temperature-dependent thermophysical properties.
//!
//! Conductivity and specific heat may be constants or piecewise-linear
//! curves over temperature; density and emissivity are constants.

use serde::{Deserialize, Serialize};

use ql_core::{interp_clamped, Real};

use crate::error::{MaterialError, MaterialResult};

/// A scalar property, constant or interpolated over temperature (deg C).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Property {
    Constant(Real),
    /// Sorted (temperature, value) breakpoints; clamped outside the table.
    Curve(Vec<(Real, Real)>),
}

impl Property {
    pub fn at(&self, temperature: Real) -> Real {
        match self {
            Property::Constant(v) => *v,
            // validate() guarantees a non-empty table
            Property::Curve(table) => interp_clamped(table, temperature).unwrap_or(0.0),
        }
    }

    fn validate(&self, what: &'static str) -> MaterialResult<()> {
        match self {
            Property::Constant(v) => {
                if !v.is_finite() || *v <= 0.0 {
                    return Err(MaterialError::NonPhysical { what });
                }
            }
            Property::Curve(table) => {
                if table.is_empty() {
                    return Err(MaterialError::InvalidCurve { what: "empty curve" });
                }
                for pair in table.windows(2) {
                    if pair[1].0 <= pair[0].0 {
                        return Err(MaterialError::InvalidCurve {
                            what: "breakpoints must be strictly increasing",
                        });
                    }
                }
                if table.iter().any(|(t, v)| !t.is_finite() || !v.is_finite() || *v <= 0.0) {
                    return Err(MaterialError::NonPhysical { what });
                }
            }
        }
        Ok(())
    }
}

/// Thermophysical property set for one material.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaterialProperties {
    /// Thermal conductivity k(T), W/(m K)
    pub conductivity: Property,
    /// Specific heat cp(T), J/(kg K)
    pub specific_heat: Property,
    /// Density, kg/m^3
    pub density: Real,
    /// Surface emissivity, 0-1
    pub emissivity: Real,
}

impl MaterialProperties {
    /// Constant-property material, the common starting point.
    pub fn constant(k: Real, cp: Real, density: Real, emissivity: Real) -> Self {
        Self {
            conductivity: Property::Constant(k),
            specific_heat: Property::Constant(cp),
            density,
            emissivity,
        }
    }

    /// Typical low-alloy steel defaults.
    pub fn steel_defaults() -> Self {
        Self::constant(40.0, 460.0, 7850.0, 0.85)
    }

    pub fn conductivity_at(&self, temperature: Real) -> Real {
        self.conductivity.at(temperature)
    }

    pub fn specific_heat_at(&self, temperature: Real) -> Real {
        self.specific_heat.at(temperature)
    }

    /// Thermal diffusivity alpha = k/(rho*cp), m^2/s.
    pub fn diffusivity_at(&self, temperature: Real) -> Real {
        self.conductivity_at(temperature) / (self.density * self.specific_heat_at(temperature))
    }

    pub fn validate(&self) -> MaterialResult<()> {
        self.conductivity.validate("conductivity")?;
        self.specific_heat.validate("specific heat")?;
        if !self.density.is_finite() || self.density <= 0.0 {
            return Err(MaterialError::NonPhysical { what: "density" });
        }
        if !(0.0..=1.0).contains(&self.emissivity) {
            return Err(MaterialError::NonPhysical { what: "emissivity" });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_property_ignores_temperature() {
        let mat = MaterialProperties::steel_defaults();
        assert_eq!(mat.conductivity_at(25.0), 40.0);
        assert_eq!(mat.conductivity_at(850.0), 40.0);
    }

    #[test]
    fn curve_property_interpolates() {
        let k = Property::Curve(vec![(20.0, 45.0), (800.0, 27.0)]);
        let mid = k.at(410.0);
        assert!(mid < 45.0 && mid > 27.0);
        // clamped outside the table
        assert_eq!(k.at(1000.0), 27.0);
    }

    #[test]
    fn diffusivity_matches_definition() {
        let mat = MaterialProperties::constant(40.0, 460.0, 7850.0, 0.85);
        let alpha = mat.diffusivity_at(500.0);
        assert!((alpha - 40.0 / (7850.0 * 460.0)).abs() < 1e-12);
    }

    #[test]
    fn validate_rejects_unsorted_curve() {
        let mat = MaterialProperties {
            conductivity: Property::Curve(vec![(800.0, 27.0), (20.0, 45.0)]),
            specific_heat: Property::Constant(460.0),
            density: 7850.0,
            emissivity: 0.85,
        };
        assert!(mat.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_emissivity() {
        let mut mat = MaterialProperties::steel_defaults();
        mat.emissivity = 1.4;
        assert!(mat.validate().is_err());
    }
}
