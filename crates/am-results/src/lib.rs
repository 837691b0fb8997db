//! am-results: on-disk persistence for mission runs.
//!
//! A run is a manifest (identity, timestamp, per-segment convergence) plus
//! one JSONL record per segment carrying the full nested condition
//! snapshot. Run IDs are content hashes of the mission definition and
//! solver version, so re-running an unchanged study lands on the same ID.

pub mod hash;
pub mod snapshot;
pub mod store;
pub mod types;

use thiserror::Error;

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(Error, Debug)]
pub enum ResultsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Run not found: {run_id}")]
    RunNotFound { run_id: String },

    #[error("Invalid path: {message}")]
    InvalidPath { message: String },

    #[error("Malformed snapshot: {message}")]
    MalformedSnapshot { message: String },
}

pub use hash::compute_run_id;
pub use snapshot::{conditions_from_json, conditions_to_json};
pub use store::RunStore;
pub use types::{RunManifest, SegmentRecord, SegmentSummary};
