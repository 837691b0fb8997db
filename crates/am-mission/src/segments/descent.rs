//! Descent segments.

use crate::error::{MissionError, MissionResult};
use crate::process::Step;
use crate::segment::{Analyses, Segment};
use crate::segments::climb::{climb_profile, ClimbLaw};
use crate::segments::longitudinal_segment;
use am_core::units::{Length, Velocity};
use std::sync::Arc;

/// Descend at constant true airspeed and constant rate of descent.
pub fn constant_speed_constant_rate(
    tag: impl Into<String>,
    analyses: Analyses,
    altitude_start: Option<Length>,
    altitude_end: Length,
    descent_rate: Velocity,
    air_speed: Option<Velocity>,
) -> MissionResult<Segment> {
    let mut segment = longitudinal_segment(tag, analyses)?;
    segment.altitude_start_m = altitude_start.map(|a| a.value);
    segment.altitude_end_m = Some(altitude_end.value);
    segment.descent_rate_mps = Some(descent_rate.value);
    segment.air_speed_mps = air_speed.map(|v| v.value);
    segment
        .process
        .initialize
        .replace("conditions", Arc::new(initialize_descent) as Step);
    Ok(segment)
}

fn initialize_descent(segment: &mut Segment) -> MissionResult<()> {
    let rate = segment
        .descent_rate_mps
        .filter(|r| *r > 0.0)
        .ok_or_else(|| MissionError::config("descent segment needs a positive descent rate"))?;
    climb_profile(segment, ClimbLaw::Rate(rate))
}
