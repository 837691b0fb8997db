//! Aggregated mission results.

use crate::conditions::Conditions;
use crate::error::MissionResult;
use crate::segment::SegmentPhase;

/// Final state of one segment after mission evaluation.
#[derive(Clone, Debug)]
pub struct SegmentOutcome {
    pub tag: String,
    /// Whether the segment solve converged within its budget
    pub converged: bool,
    pub phase: SegmentPhase,
    /// Final residual norm from the segment solve, if one ran
    pub residual_norm: Option<f64>,
    /// Full condition snapshot, field names stable for reporting
    pub conditions: Conditions,
}

/// Ordered per-segment outcomes for one mission run.
///
/// Per-segment convergence flags are the caller's signal that part of the
/// trade study needs attention; a failed segment never aborts the run.
#[derive(Clone, Debug)]
pub struct MissionResults {
    pub tag: String,
    pub segments: Vec<SegmentOutcome>,
}

impl MissionResults {
    pub fn all_converged(&self) -> bool {
        self.segments.iter().all(|s| s.converged)
    }

    pub fn segment(&self, tag: &str) -> Option<&SegmentOutcome> {
        self.segments.iter().find(|s| s.tag == tag)
    }

    /// Concatenate one condition column across every segment, in mission
    /// order. Fails if any segment lacks the path.
    pub fn merged_column(&self, path: &[&str], col: usize) -> MissionResult<Vec<f64>> {
        let mut merged = Vec::new();
        for outcome in &self.segments {
            merged.extend(outcome.conditions.column(path, col)?);
        }
        Ok(merged)
    }
}
