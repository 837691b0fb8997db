//! Result data types.

use am_mission::{MissionResults, SegmentOutcome};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub type RunId = String;

/// Per-segment convergence summary carried in the manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentSummary {
    pub tag: String,
    pub converged: bool,
    pub residual_norm: Option<f64>,
}

/// Identity and provenance of one stored run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: RunId,
    pub mission_tag: String,
    pub vehicle_tag: String,
    pub timestamp: String,
    pub solver_version: String,
    pub segments: Vec<SegmentSummary>,
}

impl RunManifest {
    pub fn new(
        run_id: RunId,
        mission_tag: impl Into<String>,
        vehicle_tag: impl Into<String>,
        solver_version: impl Into<String>,
        results: &MissionResults,
    ) -> Self {
        Self {
            run_id,
            mission_tag: mission_tag.into(),
            vehicle_tag: vehicle_tag.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            solver_version: solver_version.into(),
            segments: results
                .segments
                .iter()
                .map(|outcome| SegmentSummary {
                    tag: outcome.tag.clone(),
                    converged: outcome.converged,
                    residual_norm: outcome.residual_norm,
                })
                .collect(),
        }
    }

    pub fn all_converged(&self) -> bool {
        self.segments.iter().all(|s| s.converged)
    }
}

/// One segment's full condition snapshot, one JSONL line per segment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentRecord {
    pub tag: String,
    pub converged: bool,
    pub conditions: Value,
}

impl SegmentRecord {
    pub fn from_outcome(outcome: &SegmentOutcome) -> Self {
        Self {
            tag: outcome.tag.clone(),
            converged: outcome.converged,
            conditions: crate::snapshot::conditions_to_json(&outcome.conditions),
        }
    }
}
