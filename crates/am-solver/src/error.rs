//! Error types for solver operations.

use am_core::CoreError;
use thiserror::Error;

/// Errors that can occur while driving a residual system.
///
/// Non-convergence is NOT an error here; it comes back as a structured
/// `SolveReport` so partial results stay inspectable. These variants cover
/// genuinely broken setups and failures inside the residual closure.
#[derive(Error, Debug)]
pub enum SolverError {
    #[error("Problem setup error: {what}")]
    ProblemSetup { what: String },

    #[error("Residual evaluation failed: {message}")]
    Residual { message: String },

    #[error("Numeric error: {what}")]
    Numeric { what: String },
}

pub type SolverResult<T> = Result<T, SolverError>;

impl From<SolverError> for CoreError {
    fn from(e: SolverError) -> Self {
        match e {
            SolverError::ProblemSetup { .. } => CoreError::InvalidArg {
                what: "solver problem setup",
            },
            SolverError::Residual { .. } => CoreError::Invariant {
                what: "residual evaluation",
            },
            SolverError::Numeric { .. } => CoreError::Invariant { what: "numeric" },
        }
    }
}
