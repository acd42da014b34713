use ql_hardness::HardnessError;
use ql_kinetics::KineticsError;
use ql_thermal::ThermalError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("configuration error: {what}")]
    Configuration { what: String },

    #[error(transparent)]
    Thermal(ThermalError),

    #[error(transparent)]
    Kinetics(KineticsError),

    #[error(transparent)]
    Hardness(HardnessError),

    #[error("run cancelled")]
    Cancelled,
}

impl From<ThermalError> for SimError {
    fn from(err: ThermalError) -> Self {
        match err {
            ThermalError::Cancelled => SimError::Cancelled,
            other => SimError::Thermal(other),
        }
    }
}

impl From<KineticsError> for SimError {
    fn from(err: KineticsError) -> Self {
        match err {
            KineticsError::Cancelled => SimError::Cancelled,
            other => SimError::Kinetics(other),
        }
    }
}

impl From<HardnessError> for SimError {
    fn from(err: HardnessError) -> Self {
        match err {
            HardnessError::Cancelled => SimError::Cancelled,
            other => SimError::Hardness(other),
        }
    }
}

pub type SimResult<T> = Result<T, SimError>;
