//! Multi-segment mission sequencer.

use crate::error::{MissionError, MissionResult};
use crate::results::{MissionResults, SegmentOutcome};
use crate::segment::Segment;
use tracing::info;

/// An ordered sequence of segments evaluated with state continuity.
///
/// Insertion order is the flight order. Each segment (except the first)
/// receives the previous segment's final state as its initial conditions,
/// a directed chain, never a cycle. A segment that fails to converge is
/// recorded and the remaining segments still run from its last available
/// state.
#[derive(Debug, Default)]
pub struct Mission {
    pub tag: String,
    pub segments: Vec<Segment>,
}

impl Mission {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            segments: Vec::new(),
        }
    }

    pub fn append_segment(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    /// Checks run once before the first segment: the vehicle must be
    /// assembled validly and carry designed mass properties.
    fn pre_process(&self) -> MissionResult<()> {
        if self.segments.is_empty() {
            return Err(MissionError::config("mission has no segments"));
        }
        for segment in &self.segments {
            am_vehicle::validate::validate(segment.analyses.vehicle.as_ref())?;
            if segment.analyses.vehicle.mass_properties.takeoff.value <= 0.0 {
                return Err(MissionError::config(format!(
                    "vehicle '{}' has no takeoff mass; run the weight design pre-pass",
                    segment.analyses.vehicle.tag
                )));
            }
        }
        Ok(())
    }

    /// Evaluate every segment in order and aggregate the results.
    pub fn evaluate(&mut self) -> MissionResult<MissionResults> {
        self.pre_process()?;
        info!(mission = %self.tag, segments = self.segments.len(), "mission start");

        for index in 0..self.segments.len() {
            if index > 0 {
                // hand the predecessor's final state over as initials;
                // drop its own initials so the chain stays one deep
                let mut snapshot = self.segments[index - 1].state.clone();
                snapshot.initials = None;
                self.segments[index].state.initials = Some(Box::new(snapshot));
            }
            self.segments[index].evaluate()?;
        }

        let segments = self
            .segments
            .iter()
            .map(|segment| SegmentOutcome {
                tag: segment.tag.clone(),
                converged: segment.converged,
                phase: segment.phase,
                residual_norm: segment.residual_norm,
                conditions: segment.state.conditions.clone(),
            })
            .collect();

        let results = MissionResults {
            tag: self.tag.clone(),
            segments,
        };
        info!(
            mission = %self.tag,
            all_converged = results.all_converged(),
            "mission finished"
        );
        Ok(results)
    }
}
