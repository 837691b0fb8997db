//! Physics evaluator errors.

use am_core::CoreError;
use thiserror::Error;

pub type PhysicsResult<T> = Result<T, PhysicsError>;

/// Errors from physics evaluators.
///
/// `InnerConvergence` is reserved for the bounded fixed-point loops nested
/// inside a single evaluation (fuel cell polarization, throttle matching) so
/// their failures stay distinguishable from the outer segment solver's.
#[derive(Error, Debug)]
pub enum PhysicsError {
    #[error("Non-physical value for {what}")]
    NonPhysical { what: &'static str },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Operation not supported: {what}")]
    NotSupported { what: &'static str },

    #[error("Inner iteration failed to converge: {what} ({iterations} iterations)")]
    InnerConvergence {
        what: &'static str,
        iterations: usize,
    },

    #[error("Input length mismatch: {what} (expected {expected}, got {got})")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },
}

impl From<PhysicsError> for CoreError {
    fn from(e: PhysicsError) -> Self {
        match e {
            PhysicsError::NonPhysical { what } => CoreError::Invariant { what },
            PhysicsError::InvalidArg { what } => CoreError::InvalidArg { what },
            PhysicsError::NotSupported { what } => CoreError::InvalidArg { what },
            PhysicsError::InnerConvergence { what, .. } => CoreError::Invariant { what },
            PhysicsError::LengthMismatch { what, .. } => CoreError::InvalidArg { what },
        }
    }
}
