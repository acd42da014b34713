//! Error types for thermal solving.

use ql_core::QlError;
use ql_material::MaterialError;
use thiserror::Error;

use crate::schedule::PhaseKind;

/// Errors that can occur while configuring or running the solver.
#[derive(Error, Debug)]
pub enum ThermalError {
    /// Invalid geometry/material/schedule, detected before stepping.
    #[error("Configuration error: {what}")]
    Configuration { what: String },

    /// NaN/Inf appeared in the temperature field mid-run.
    #[error(
        "Numerical divergence in {phase:?} phase at t={elapsed_s:.3}s \
         (last valid center temperature {last_temperature:.1} degC)"
    )]
    Divergence {
        phase: PhaseKind,
        elapsed_s: f64,
        last_temperature: f64,
    },

    #[error("Material error: {0}")]
    Material(#[from] MaterialError),

    #[error("Solve cancelled")]
    Cancelled,
}

pub type ThermalResult<T> = Result<T, ThermalError>;

impl From<QlError> for ThermalError {
    fn from(e: QlError) -> Self {
        match e {
            QlError::Cancelled => ThermalError::Cancelled,
        }
    }
}
