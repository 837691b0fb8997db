//! Climb segments: constant-speed altitude gain profiles.

use crate::error::{MissionError, MissionResult};
use crate::process::Step;
use crate::segment::{Analyses, Segment};
use crate::segments::longitudinal_segment;
use crate::state::paths;
use am_core::units::{Angle, Length, Velocity};
use std::sync::Arc;

/// Climb at constant true airspeed and constant rate of climb.
pub fn constant_speed_constant_rate(
    tag: impl Into<String>,
    analyses: Analyses,
    altitude_start: Option<Length>,
    altitude_end: Length,
    climb_rate: Velocity,
    air_speed: Option<Velocity>,
) -> MissionResult<Segment> {
    let mut segment = longitudinal_segment(tag, analyses)?;
    segment.altitude_start_m = altitude_start.map(|a| a.value);
    segment.altitude_end_m = Some(altitude_end.value);
    segment.climb_rate_mps = Some(climb_rate.value);
    segment.air_speed_mps = air_speed.map(|v| v.value);
    segment
        .process
        .initialize
        .replace("conditions", Arc::new(initialize_constant_rate) as Step);
    Ok(segment)
}

/// Climb at constant true airspeed and constant flight path angle.
pub fn constant_speed_constant_angle(
    tag: impl Into<String>,
    analyses: Analyses,
    altitude_start: Option<Length>,
    altitude_end: Length,
    climb_angle: Angle,
    air_speed: Option<Velocity>,
) -> MissionResult<Segment> {
    let mut segment = longitudinal_segment(tag, analyses)?;
    segment.altitude_start_m = altitude_start.map(|a| a.value);
    segment.altitude_end_m = Some(altitude_end.value);
    segment.climb_angle_rad = Some(climb_angle.value);
    segment.air_speed_mps = air_speed.map(|v| v.value);
    segment
        .process
        .initialize
        .replace("conditions", Arc::new(initialize_constant_angle) as Step);
    Ok(segment)
}

fn initialize_constant_rate(segment: &mut Segment) -> MissionResult<()> {
    let rate = segment
        .climb_rate_mps
        .filter(|r| *r > 0.0)
        .ok_or_else(|| MissionError::config("climb segment needs a positive climb rate"))?;
    climb_profile(segment, ClimbLaw::Rate(rate))
}

fn initialize_constant_angle(segment: &mut Segment) -> MissionResult<()> {
    let angle = segment
        .climb_angle_rad
        .filter(|a| *a > 0.0)
        .ok_or_else(|| MissionError::config("climb segment needs a positive climb angle"))?;
    climb_profile(segment, ClimbLaw::Angle(angle))
}

pub(crate) enum ClimbLaw {
    /// Vertical speed fixed [m/s], positive up
    Rate(f64),
    /// Flight path angle fixed [rad], positive up
    Angle(f64),
}

/// Shared altitude-profile setup for climb and descent segment types.
pub(crate) fn climb_profile(segment: &mut Segment, law: ClimbLaw) -> MissionResult<()> {
    let alt0 = segment.inherit_or(
        segment.altitude_start_m,
        |init| init.final_value(paths::ALTITUDE, 0),
        "initial altitude",
    )?;
    let alt_end = segment
        .altitude_end_m
        .ok_or_else(|| MissionError::config("climb/descent segment needs an end altitude"))?;
    let air_speed = segment.inherit_or(
        segment.air_speed_mps,
        |init| init.final_value(paths::FREESTREAM_VELOCITY, 0),
        "airspeed",
    )?;
    let delta_h = alt_end - alt0;
    if delta_h == 0.0 {
        return Err(MissionError::config(
            "climb/descent start and end altitudes are identical",
        ));
    }

    // vertical speed, positive up, signed by the altitude change
    let v_climb = match law {
        ClimbLaw::Rate(rate) => rate * delta_h.signum(),
        ClimbLaw::Angle(angle) => air_speed * angle.sin() * delta_h.signum(),
    };
    if air_speed <= v_climb.abs() {
        return Err(MissionError::config(
            "airspeed must exceed the vertical speed",
        ));
    }

    let t_final = delta_h / v_climb;
    let v_horizontal = (air_speed * air_speed - v_climb * v_climb).sqrt();
    let beta = segment.sideslip_angle_rad;

    let t_nondim = segment.state.numerics.dimensionless.control_points.clone();
    let n = t_nondim.len();
    let time: Vec<f64> = t_nondim.iter().map(|x| x * t_final).collect();
    let altitude: Vec<f64> = t_nondim.iter().map(|x| alt0 + x * delta_h).collect();

    let c = &mut segment.state.conditions;
    c.set_column(paths::TIME, 0, &time)?;
    c.set_column(paths::ALTITUDE, 0, &altitude)?;

    let position = c.field_mut(paths::POSITION)?;
    for i in 0..n {
        position[(i, 2)] = -altitude[i];
    }
    let velocity = c.field_mut(paths::VELOCITY)?;
    for i in 0..n {
        velocity[(i, 0)] = v_horizontal * beta.cos();
        velocity[(i, 1)] = v_horizontal * beta.sin();
        velocity[(i, 2)] = -v_climb;
    }
    Ok(())
}
