//! Atmosphere property errors.

use am_core::CoreError;
use thiserror::Error;

/// Result type for atmosphere operations.
pub type AtmoResult<T> = Result<T, AtmoError>;

/// Errors that can occur during atmosphere property calculations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AtmoError {
    /// Altitude outside the validity range of the model.
    #[error("Altitude out of range: {altitude_m} m (model limit {limit_m} m)")]
    AltitudeOutOfRange { altitude_m: f64, limit_m: f64 },

    /// Non-physical values (negative temperature, pressure, etc.).
    #[error("Non-physical value for {what}")]
    NonPhysical { what: &'static str },

    /// Invalid argument.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}

impl From<AtmoError> for CoreError {
    fn from(err: AtmoError) -> Self {
        match err {
            AtmoError::AltitudeOutOfRange { .. } => CoreError::InvalidArg { what: "altitude" },
            AtmoError::NonPhysical { what } => CoreError::Invariant { what },
            AtmoError::InvalidArg { what } => CoreError::InvalidArg { what },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = AtmoError::AltitudeOutOfRange {
            altitude_m: 90_000.0,
            limit_m: 86_000.0,
        };
        assert!(err.to_string().contains("90000"));
    }
}
