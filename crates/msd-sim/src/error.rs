//! Error types for simulation operations.

use msd_core::CoreError;
use thiserror::Error;

use crate::sim::SimStatus;

/// Errors encountered during transient simulation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Non-physical condition: {what} = {value}")]
    NonPhysical { what: &'static str, value: f64 },

    #[error("Non-finite value: {what} = {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Integration failed ({status:?}): {message}")]
    IntegrationFailed { status: SimStatus, message: String },

    #[error("Backend error: {message}")]
    Backend { message: String },
}

pub type SimResult<T> = Result<T, SimError>;

impl From<CoreError> for SimError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::NonPhysical { what, value } => SimError::NonPhysical { what, value },
            CoreError::NonFinite { what, value } => SimError::NonFinite { what, value },
            CoreError::InvalidArg { what } => SimError::InvalidArg { what },
        }
    }
}
