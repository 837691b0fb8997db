//! Cruise segments: constant altitude profiles.

use crate::error::{MissionError, MissionResult};
use crate::process::Step;
use crate::segment::{Analyses, Segment};
use crate::segments::longitudinal_segment;
use crate::state::paths;
use am_core::nudge_apart;
use am_core::units::{Length, Velocity};
use std::sync::Arc;

/// Cruise at constant true airspeed and constant altitude over a distance.
///
/// Unknowns: throttle, body angle. Residuals: force balance in x and z.
/// Altitude and airspeed inherit from the predecessor when unset.
pub fn constant_speed_constant_altitude(
    tag: impl Into<String>,
    analyses: Analyses,
    altitude: Option<Length>,
    air_speed: Option<Velocity>,
    distance: Length,
) -> MissionResult<Segment> {
    let mut segment = longitudinal_segment(tag, analyses)?;
    segment.altitude_m = altitude.map(|a| a.value);
    segment.air_speed_mps = air_speed.map(|v| v.value);
    segment.distance_m = Some(distance.value);
    segment
        .process
        .initialize
        .replace("conditions", Arc::new(initialize_constant_speed) as Step);
    Ok(segment)
}

fn initialize_constant_speed(segment: &mut Segment) -> MissionResult<()> {
    let alt = segment.inherit_or(
        segment.altitude_m,
        |init| init.final_value(paths::ALTITUDE, 0),
        "altitude",
    )?;
    let air_speed = segment.inherit_or(
        segment.air_speed_mps,
        |init| init.final_value(paths::FREESTREAM_VELOCITY, 0),
        "airspeed",
    )?;
    let distance = segment
        .distance_m
        .filter(|d| *d > 0.0)
        .ok_or_else(|| MissionError::config("cruise segment needs a positive distance"))?;
    if air_speed <= 0.0 {
        return Err(MissionError::config("cruise airspeed must be positive"));
    }

    let beta = segment.sideslip_angle_rad;
    let t_final = distance / air_speed;
    let t_nondim = segment.state.numerics.dimensionless.control_points.clone();
    let n = t_nondim.len();

    let time: Vec<f64> = t_nondim.iter().map(|x| x * t_final).collect();
    let c = &mut segment.state.conditions;
    c.set_column(paths::TIME, 0, &time)?;
    c.fill(paths::ALTITUDE, alt)?;

    let position = c.field_mut(paths::POSITION)?;
    for i in 0..n {
        position[(i, 2)] = -alt;
    }
    let velocity = c.field_mut(paths::VELOCITY)?;
    for i in 0..n {
        velocity[(i, 0)] = air_speed * beta.cos();
        velocity[(i, 1)] = air_speed * beta.sin();
        velocity[(i, 2)] = 0.0;
    }
    Ok(())
}

/// Cruise at constant altitude with a linear speed change at a fixed
/// acceleration.
///
/// Identical start and end speeds are a degenerate configuration (the time
/// span collapses); the end speed is nudged off the singularity rather
/// than rejected.
pub fn constant_acceleration_constant_altitude(
    tag: impl Into<String>,
    analyses: Analyses,
    altitude: Option<Length>,
    air_speed_start: Option<Velocity>,
    air_speed_end: Velocity,
    acceleration_mps2: f64,
) -> MissionResult<Segment> {
    let mut segment = longitudinal_segment(tag, analyses)?;
    segment.altitude_m = altitude.map(|a| a.value);
    segment.air_speed_mps = air_speed_start.map(|v| v.value);
    segment.air_speed_end_mps = Some(air_speed_end.value);
    segment.acceleration_mps2 = Some(acceleration_mps2);
    segment
        .process
        .initialize
        .replace("conditions", Arc::new(initialize_constant_acceleration) as Step);
    Ok(segment)
}

fn initialize_constant_acceleration(segment: &mut Segment) -> MissionResult<()> {
    let alt = segment.inherit_or(
        segment.altitude_m,
        |init| init.final_value(paths::ALTITUDE, 0),
        "altitude",
    )?;
    let v_start = segment.inherit_or(
        segment.air_speed_mps,
        |init| init.final_value(paths::FREESTREAM_VELOCITY, 0),
        "start airspeed",
    )?;
    let v_end_raw = segment
        .air_speed_end_mps
        .ok_or_else(|| MissionError::config("acceleration segment needs an end airspeed"))?;
    let accel = segment
        .acceleration_mps2
        .filter(|a| *a != 0.0)
        .ok_or_else(|| MissionError::config("acceleration segment needs a nonzero acceleration"))?;

    // equal start/end speeds would collapse the time span
    let v_end = nudge_apart(v_start, v_end_raw, 1e-3);
    let t_final = (v_end - v_start) / accel;
    if t_final <= 0.0 {
        return Err(MissionError::config(
            "acceleration sign does not move the speed toward its end value",
        ));
    }

    let beta = segment.sideslip_angle_rad;
    let t_nondim = segment.state.numerics.dimensionless.control_points.clone();
    let n = t_nondim.len();
    let time: Vec<f64> = t_nondim.iter().map(|x| x * t_final).collect();

    let c = &mut segment.state.conditions;
    c.set_column(paths::TIME, 0, &time)?;
    c.fill(paths::ALTITUDE, alt)?;

    let position = c.field_mut(paths::POSITION)?;
    for i in 0..n {
        position[(i, 2)] = -alt;
    }
    let velocity = c.field_mut(paths::VELOCITY)?;
    for i in 0..n {
        let v = v_start + accel * time[i];
        velocity[(i, 0)] = v * beta.cos();
        velocity[(i, 1)] = v * beta.sin();
        velocity[(i, 2)] = 0.0;
    }
    Ok(())
}
