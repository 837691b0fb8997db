//! Vehicle composition errors.

use am_core::CoreError;
use thiserror::Error;

pub type VehicleResult<T> = Result<T, VehicleError>;

/// Errors raised while assembling or validating a vehicle.
#[derive(Error, Debug)]
pub enum VehicleError {
    #[error("Duplicate component tag: {tag}")]
    DuplicateTag { tag: String },

    #[error("Missing component: {what}")]
    MissingComponent { what: &'static str },

    #[error("Non-physical value for {what}")]
    NonPhysical { what: &'static str },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}

impl From<VehicleError> for CoreError {
    fn from(e: VehicleError) -> Self {
        match e {
            VehicleError::DuplicateTag { .. } => CoreError::InvalidArg {
                what: "duplicate component tag",
            },
            VehicleError::MissingComponent { what } => CoreError::InvalidArg { what },
            VehicleError::NonPhysical { what } => CoreError::Invariant { what },
            VehicleError::InvalidArg { what } => CoreError::InvalidArg { what },
        }
    }
}
