//! Error types for mission evaluation.

use am_atmosphere::AtmoError;
use am_physics::PhysicsError;
use am_solver::SolverError;
use am_vehicle::VehicleError;
use thiserror::Error;

pub type MissionResult<T> = Result<T, MissionError>;

/// Errors raised while setting up or evaluating a mission.
///
/// Solver non-convergence is NOT represented here: it is a per-segment flag
/// in the results. These variants are configuration and data-integrity
/// failures, plus physics-evaluator errors propagating uncaught through the
/// pipeline (those are programmer/setup mistakes, intentionally fatal).
#[derive(Error, Debug)]
pub enum MissionError {
    /// Missing or inconsistent segment configuration (e.g. no initial
    /// altitude and no predecessor to inherit one from).
    #[error("Configuration error: {what}")]
    Config { what: String },

    /// A named state path does not exist.
    #[error("Unknown state path: {path}")]
    MissingPath { path: String },

    /// Flat-vector length does not match the structured state.
    /// Continuing would silently corrupt physical state.
    #[error("Pack/unpack size mismatch for {what}: expected {expected}, got {got}")]
    SizeMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("Atmosphere error: {0}")]
    Atmosphere(#[from] AtmoError),

    #[error("Physics error: {0}")]
    Physics(#[from] PhysicsError),

    #[error("Vehicle error: {0}")]
    Vehicle(#[from] VehicleError),

    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),
}

impl MissionError {
    pub fn config(what: impl Into<String>) -> Self {
        MissionError::Config { what: what.into() }
    }
}
