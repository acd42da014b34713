//! Error types for material inputs.

use thiserror::Error;

/// Errors raised while validating material data.
#[derive(Error, Debug)]
pub enum MaterialError {
    #[error("Invalid property curve: {what}")]
    InvalidCurve { what: &'static str },

    #[error("Non-physical property value: {what}")]
    NonPhysical { what: &'static str },
}

pub type MaterialResult<T> = Result<T, MaterialError>;
