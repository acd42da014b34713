use ql_core::QlError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KineticsError {
    /// A parameter fit failed; stored parameters are left untouched.
    #[error("calibration failed: {what}")]
    Calibration { what: String },

    /// Required kinetic data is missing; callers may skip the dependent
    /// output rather than abort.
    #[error("kinetic data unavailable: {what}")]
    DataUnavailable { what: String },

    #[error("invalid parameter: {what}")]
    InvalidParameter { what: String },

    #[error("operation cancelled")]
    Cancelled,
}

impl From<QlError> for KineticsError {
    fn from(err: QlError) -> Self {
        match err {
            QlError::Cancelled => KineticsError::Cancelled,
        }
    }
}

pub type KineticsResult<T> = Result<T, KineticsError>;
