use ql_core::QlError;
use ql_kinetics::KineticsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HardnessError {
    #[error("invalid input: {what}")]
    InvalidInput { what: String },

    /// A prerequisite (t8/5, kinetic data) is missing; callers may skip
    /// the dependent output.
    #[error("hardness data unavailable: {what}")]
    DataUnavailable { what: String },

    #[error(transparent)]
    Kinetics(#[from] KineticsError),

    #[error("operation cancelled")]
    Cancelled,
}

impl From<QlError> for HardnessError {
    fn from(err: QlError) -> Self {
        match err {
            QlError::Cancelled => HardnessError::Cancelled,
        }
    }
}

pub type HardnessResult<T> = Result<T, HardnessError>;
