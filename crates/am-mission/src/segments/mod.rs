//! Concrete segment types.
//!
//! Each constructor installs only its own boundary-condition physics atop
//! the shared evaluate pipeline: a `conditions` initialize step plus the
//! control variables and flight-dynamics flags that match its unknowns.

pub mod climb;
pub mod cruise;
pub mod descent;

use crate::controls::{ScalarControl, ThrottleControl};
use crate::error::MissionResult;
use crate::segment::{Analyses, Segment};

/// Shared skeleton for the longitudinal evaluate segments: throttle and
/// body angle solved against force balance in x and z.
pub(crate) fn longitudinal_segment(
    tag: impl Into<String>,
    analyses: Analyses,
) -> MissionResult<Segment> {
    let mut segment = Segment::new(tag, analyses)?;
    segment.flight_dynamics.force_x = true;
    segment.flight_dynamics.force_z = true;

    let propulsors = segment.analyses.vehicle.propulsor_tags();
    segment.controls.throttle = ThrottleControl {
        active: true,
        assigned_propulsors: vec![propulsors],
        initial_guess_values: vec![0.5],
    };
    segment.controls.body_angle = ScalarControl::activate(2.0_f64.to_radians());
    Ok(segment)
}
