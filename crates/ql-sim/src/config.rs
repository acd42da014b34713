//! Run configuration for a complete heat-treatment simulation.

use serde::{Deserialize, Serialize};

use ql_core::Real;
use ql_hardness::SofteningTable;
use ql_kinetics::RegressionTable;
use ql_material::{Composition, MaterialProperties};
use ql_thermal::{Geometry, Schedule, SolverConfig};

use crate::error::{SimError, SimResult};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunConfig {
    pub composition: Composition,
    pub material: MaterialProperties,
    pub geometry: Geometry,
    pub schedule: Schedule,
    #[serde(default)]
    pub solver: SolverConfig,
    /// Uniform part temperature at the start of the cycle, deg C
    pub initial_temperature: Real,
    #[serde(default = "RegressionTable::default")]
    pub regressions: RegressionTable,
    #[serde(default = "SofteningTable::default")]
    pub softening: SofteningTable,
}

impl RunConfig {
    /// Room-temperature start with default estimator tables.
    pub fn new(
        composition: Composition,
        material: MaterialProperties,
        geometry: Geometry,
        schedule: Schedule,
    ) -> Self {
        Self {
            composition,
            material,
            geometry,
            schedule,
            solver: SolverConfig::default(),
            initial_temperature: 25.0,
            regressions: RegressionTable::default(),
            softening: SofteningTable::default(),
        }
    }

    pub fn validate(&self) -> SimResult<()> {
        if !self.initial_temperature.is_finite() {
            return Err(SimError::Configuration {
                what: format!(
                    "initial temperature {} is not finite",
                    self.initial_temperature
                ),
            });
        }
        self.schedule.validate()?;
        self.geometry.validate()?;
        self.material.validate().map_err(|e| SimError::Configuration {
            what: e.to_string(),
        })?;
        Ok(())
    }
}
