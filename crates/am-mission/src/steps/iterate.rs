//! Iterate-stage steps: one pass is one residual evaluation.

use crate::error::{MissionError, MissionResult};
use crate::segment::Segment;
use crate::state::paths;
use am_core::units::constants::G0_MPS2;
use am_physics::{
    AeroState, PemFuelCell, PerformanceCache, PropulsorOperatingState, StorageState,
};
use nalgebra::DVector;

/// Floor on velocity magnitude in rate/ratio denominators.
const V_EPS: f64 = 0.1;

/// Carry predecessor final conditions into this segment's first row.
///
/// Time is shifted so the segment starts where its predecessor ended, and
/// the inertial x/y position of the first control point is pinned to the
/// predecessor's last. Both writes are idempotent across iterate passes.
pub fn initials(segment: &mut Segment) -> MissionResult<()> {
    let Some(init) = segment.state.initials.as_deref() else {
        return Ok(());
    };

    let t_prev = init.final_value(paths::TIME, 0)?;
    let x_prev = init.final_value(paths::POSITION, 0)?;
    let y_prev = init.final_value(paths::POSITION, 1)?;

    let mut time = segment.state.conditions.column(paths::TIME, 0)?;
    let t0 = time[0];
    for t in time.iter_mut() {
        *t = *t - t0 + t_prev;
    }
    segment.state.conditions.set_column(paths::TIME, 0, &time)?;

    let position = segment.state.conditions.field_mut(paths::POSITION)?;
    position[(0, 0)] = x_prev;
    position[(0, 1)] = y_prev;
    Ok(())
}

/// Map solver unknowns back into named conditions.
pub fn unpack_unknowns(segment: &mut Segment) -> MissionResult<()> {
    let controls = segment.controls.clone();

    if controls.throttle.active {
        for (group, tags) in controls.throttle.assigned_propulsors.iter().enumerate() {
            let name = format!("throttle_{group}");
            let values = segment.state.unknowns.column(&[name.as_str()], 0)?;
            for tag in tags {
                segment
                    .state
                    .conditions
                    .set_column(&["energy", tag.as_str(), "throttle"], 0, &values)?;
            }
        }
    }

    if controls.body_angle.active {
        let values = segment.state.unknowns.column(&["body_angle"], 0)?;
        segment
            .state
            .conditions
            .set_column(paths::BODY_ORIENTATION, 1, &values)?;
    }
    if controls.bank_angle.active {
        let values = segment.state.unknowns.column(&["bank_angle"], 0)?;
        segment
            .state
            .conditions
            .set_column(paths::BODY_ORIENTATION, 0, &values)?;
    }
    if controls.wind_angle.active {
        let values = segment.state.unknowns.column(&["wind_angle"], 0)?;
        segment
            .state
            .conditions
            .set_column(paths::BODY_ORIENTATION, 2, &values)?;
    }
    if controls.velocity.active {
        let values = segment.state.unknowns.column(&["velocity"], 0)?;
        segment
            .state
            .conditions
            .set_column(paths::VELOCITY, 0, &values)?;
    }
    if controls.altitude.active {
        let alts = segment.state.unknowns.column(&["altitude"], 0)?;
        segment
            .state
            .conditions
            .set_column(paths::ALTITUDE, 0, &alts)?;
        let z: Vec<f64> = alts.iter().map(|a| -a).collect();
        segment.state.conditions.set_column(paths::POSITION, 2, &z)?;
    }

    Ok(())
}

/// Rescale the dimensionless operators onto the segment's time span.
pub fn update_differentials_time(segment: &mut Segment) -> MissionResult<()> {
    let time = segment.state.conditions.column(paths::TIME, 0)?;
    let t0 = time[0];
    let span = time[time.len() - 1] - t0;
    segment.state.numerics.rescale_time(t0, span)
}

/// Fill freestream columns from the atmosphere model.
pub fn update_atmosphere(segment: &mut Segment) -> MissionResult<()> {
    let altitude = segment.state.conditions.column(paths::ALTITUDE, 0)?;
    let data = segment
        .analyses
        .atmosphere
        .compute_values(&altitude, segment.temperature_deviation_k)?;

    let c = &mut segment.state.conditions;
    c.set_column(paths::PRESSURE, 0, &data.pressure)?;
    c.set_column(paths::TEMPERATURE, 0, &data.temperature)?;
    c.set_column(paths::DENSITY, 0, &data.density)?;
    c.set_column(paths::SPEED_OF_SOUND, 0, &data.speed_of_sound)?;
    c.set_column(paths::DYNAMIC_VISCOSITY, 0, &data.dynamic_viscosity)?;
    c.set_column(paths::KINEMATIC_VISCOSITY, 0, &data.kinematic_viscosity)?;
    c.set_column(paths::THERMAL_CONDUCTIVITY, 0, &data.thermal_conductivity)?;
    c.set_column(paths::PRANDTL_NUMBER, 0, &data.prandtl_number)?;
    Ok(())
}

/// Velocity magnitude, Mach, dynamic pressure, Reynolds number per point.
pub fn update_freestream(segment: &mut Segment) -> MissionResult<()> {
    let velocity = segment.state.conditions.field(paths::VELOCITY)?.clone();
    let density = segment.state.conditions.column(paths::DENSITY, 0)?;
    let sound = segment.state.conditions.column(paths::SPEED_OF_SOUND, 0)?;
    let viscosity = segment
        .state
        .conditions
        .column(paths::DYNAMIC_VISCOSITY, 0)?;

    let n = velocity.nrows();
    let mut v_mag = Vec::with_capacity(n);
    let mut mach = Vec::with_capacity(n);
    let mut q = Vec::with_capacity(n);
    let mut reynolds = Vec::with_capacity(n);

    for i in 0..n {
        let v = (velocity[(i, 0)].powi(2) + velocity[(i, 1)].powi(2) + velocity[(i, 2)].powi(2))
            .sqrt();
        v_mag.push(v);
        mach.push(v / sound[i]);
        q.push(0.5 * density[i] * v * v);
        reynolds.push(density[i] * v / viscosity[i]);
    }

    let c = &mut segment.state.conditions;
    c.set_column(paths::FREESTREAM_VELOCITY, 0, &v_mag)?;
    c.set_column(paths::MACH, 0, &mach)?;
    c.set_column(paths::DYNAMIC_PRESSURE, 0, &q)?;
    c.set_column(paths::REYNOLDS, 0, &reynolds)?;
    Ok(())
}

/// Flight path angle of each control point from the inertial velocity.
fn flight_path_angles(segment: &Segment) -> MissionResult<Vec<f64>> {
    let velocity = segment.state.conditions.field(paths::VELOCITY)?;
    let mut gamma = Vec::with_capacity(velocity.nrows());
    for i in 0..velocity.nrows() {
        let vx = velocity[(i, 0)];
        let vy = velocity[(i, 1)];
        let vz = velocity[(i, 2)];
        let v = (vx * vx + vy * vy + vz * vz).sqrt().max(V_EPS);
        gamma.push((-vz / v).asin());
    }
    Ok(gamma)
}

/// Angle of attack from body pitch and flight path angle.
pub fn update_orientations(segment: &mut Segment) -> MissionResult<()> {
    let gamma = flight_path_angles(segment)?;
    let theta = segment
        .state
        .conditions
        .column(paths::BODY_ORIENTATION, 1)?;

    let alpha: Vec<f64> = theta
        .iter()
        .zip(gamma.iter())
        .map(|(t, g)| t - g)
        .collect();
    segment
        .state
        .conditions
        .set_column(paths::ANGLE_OF_ATTACK, 0, &alpha)?;
    Ok(())
}

/// Aerodynamic coefficients and wind-frame forces.
pub fn update_aerodynamics(segment: &mut Segment) -> MissionResult<()> {
    let alpha = segment.state.conditions.column(paths::ANGLE_OF_ATTACK, 0)?;
    let mach = segment.state.conditions.column(paths::MACH, 0)?;

    let coeffs = segment.analyses.aerodynamics.evaluate(&AeroState {
        angle_of_attack: &alpha,
        mach: &mach,
    })?;

    let reference_area = segment.analyses.vehicle.reference_area()?.value;
    let q = segment.state.conditions.column(paths::DYNAMIC_PRESSURE, 0)?;

    {
        let c = &mut segment.state.conditions;
        c.set_column(paths::LIFT_COEFFICIENT, 0, &coeffs.lift)?;
        c.set_column(paths::DRAG_COEFFICIENT, 0, &coeffs.drag)?;
        c.set_column(paths::MOMENT_COEFFICIENT, 0, &coeffs.pitching_moment)?;

        let wind = c.field_mut(paths::WIND_FORCE)?;
        for i in 0..wind.nrows() {
            let lift = q[i] * reference_area * coeffs.lift[i];
            let drag = q[i] * reference_area * coeffs.drag[i];
            wind[(i, 0)] = -drag;
            wind[(i, 1)] = 0.0;
            wind[(i, 2)] = -lift;
        }
    }
    Ok(())
}

/// Propulsion performance and energy-storage bookkeeping.
///
/// Propulsors are evaluated in declaration order with a fresh memoization
/// cache per pass (cached results are only valid for one candidate unknown
/// vector). Fuel cell stacks cover bus load up to their rating; battery
/// modules split the remainder evenly and march their state of charge
/// forward one control point at a time.
pub fn update_energy(segment: &mut Segment) -> MissionResult<()> {
    let vehicle = segment.analyses.vehicle.clone();
    let propulsion = segment.analyses.propulsion.clone();
    let storage = segment.analyses.energy_storage.clone();

    let density = segment.state.conditions.column(paths::DENSITY, 0)?;
    let velocity = segment
        .state
        .conditions
        .column(paths::FREESTREAM_VELOCITY, 0)?;
    let time = segment.state.conditions.column(paths::TIME, 0)?;
    let n = density.len();

    let mut total_thrust = vec![[0.0f64; 3]; n];
    let mut total_mass_rate = vec![0.0f64; n];

    for network in &vehicle.networks {
        for bus in &network.busses {
            // fresh per bus: identity groups never span busses, and cached
            // results are only valid for one candidate unknown vector
            let mut cache = PerformanceCache::new();
            let mut bus_power = vec![0.0f64; n];

            for propulsor in &bus.propulsors {
                let tag = propulsor.tag.as_str();
                let throttle = segment
                    .state
                    .conditions
                    .column(&["energy", tag, "throttle"], 0)?;
                let operating = PropulsorOperatingState {
                    throttle: &throttle,
                    density: &density,
                    velocity: &velocity,
                };
                let (performance, _reused, _identity) = propulsion.compute_performance(
                    propulsor,
                    bus.efficiency,
                    &operating,
                    &mut cache,
                )?;

                let c = &mut segment.state.conditions;
                let thrust_field = c.field_mut(&["energy", tag, "thrust_vector"])?;
                for i in 0..n {
                    for axis in 0..3 {
                        thrust_field[(i, axis)] = performance.thrust_n[i][axis];
                        total_thrust[i][axis] += performance.thrust_n[i][axis];
                    }
                }
                c.set_column(
                    &["energy", tag, "mechanical_power"],
                    0,
                    &performance.mechanical_power_w,
                )?;
                c.set_column(
                    &["energy", tag, "electrical_power"],
                    0,
                    &performance.electrical_power_w,
                )?;
                for i in 0..n {
                    bus_power[i] += performance.electrical_power_w[i];
                }
            }

            let bus_tag = bus.tag.as_str();
            segment
                .state
                .conditions
                .set_column(&["energy", bus_tag, "power_draw"], 0, &bus_power)?;

            // Fuel cells supply the bus first, up to their rating.
            let mut remaining = bus_power.clone();
            let fuel_cell = PemFuelCell::new();
            for stack in &bus.fuel_cell_stacks {
                let stack_tag = stack.tag.as_str();
                let mut supplied = vec![0.0f64; n];
                let mut stack_voltage = vec![0.0f64; n];
                let mut h2_flow = vec![0.0f64; n];
                for i in 0..n {
                    let supply = remaining[i].min(stack.rated_power.value).max(0.0);
                    let point = fuel_cell.operating_point(stack, supply)?;
                    supplied[i] = supply;
                    stack_voltage[i] = point.stack_voltage_v;
                    h2_flow[i] = point.hydrogen_flow_kg_s;
                    remaining[i] -= supply;
                    total_mass_rate[i] += point.hydrogen_flow_kg_s;
                }
                let c = &mut segment.state.conditions;
                c.set_column(&["energy", bus_tag, stack_tag, "power_supplied"], 0, &supplied)?;
                c.set_column(
                    &["energy", bus_tag, stack_tag, "stack_voltage"],
                    0,
                    &stack_voltage,
                )?;
                c.set_column(&["energy", bus_tag, stack_tag, "hydrogen_flow"], 0, &h2_flow)?;
            }

            // Batteries split what the fuel cells did not cover.
            let module_count = bus.battery_modules.len().max(1) as f64;
            for module in &bus.battery_modules {
                let module_tag = module.tag.as_str();
                let soc_path = ["energy", bus_tag, module_tag, "state_of_charge"];

                let initial_soc = match segment.state.initials.as_deref() {
                    Some(init) => match init.conditions.column(&soc_path, 0) {
                        Ok(column) => *column.last().unwrap_or(&1.0),
                        Err(_) => segment.initial_battery_state_of_charge,
                    },
                    None => segment.initial_battery_state_of_charge,
                };

                let mut storage_state =
                    StorageState::new(n, initial_soc, module.nominal_voltage);
                for i in 0..n {
                    storage_state.power_draw_w[i] = remaining[i].max(0.0) / module_count;
                }
                for i in 0..n - 1 {
                    let dt = time[i + 1] - time[i];
                    storage.energy_calc(module, &mut storage_state, i, dt)?;
                }

                let c = &mut segment.state.conditions;
                c.set_column(&soc_path, 0, &storage_state.state_of_charge)?;
                c.set_column(
                    &["energy", bus_tag, module_tag, "voltage"],
                    0,
                    &storage_state.voltage_v,
                )?;
                c.set_column(
                    &["energy", bus_tag, module_tag, "current"],
                    0,
                    &storage_state.current_a,
                )?;
                c.set_column(
                    &["energy", bus_tag, module_tag, "heat"],
                    0,
                    &storage_state.heat_w,
                )?;
            }
        }
    }

    let c = &mut segment.state.conditions;
    let thrust_field = c.field_mut(paths::THRUST_FORCE)?;
    for i in 0..n {
        for axis in 0..3 {
            thrust_field[(i, axis)] = total_thrust[i][axis];
        }
    }
    c.set_column(paths::MASS_RATE, 0, &total_mass_rate)?;
    Ok(())
}

/// Vehicle mass over the segment and the gravity force column.
pub fn update_weights(segment: &mut Segment) -> MissionResult<()> {
    let initial_mass = match segment.state.initials.as_deref() {
        Some(init) => init.final_value(paths::TOTAL_MASS, 0)?,
        None => {
            let takeoff = segment.analyses.vehicle.mass_properties.takeoff.value;
            if takeoff <= 0.0 {
                return Err(MissionError::config(format!(
                    "segment '{}': vehicle has no takeoff mass; run the weight design pre-pass",
                    segment.tag
                )));
            }
            takeoff
        }
    };

    let mass_rate = segment.state.conditions.column(paths::MASS_RATE, 0)?;
    let n = mass_rate.len();
    let burned = &segment.state.numerics.time.integrate * DVector::from_vec(mass_rate);

    let mut mass = Vec::with_capacity(n);
    for i in 0..n {
        mass.push(initial_mass - burned[i]);
    }

    let c = &mut segment.state.conditions;
    c.set_column(paths::TOTAL_MASS, 0, &mass)?;
    let gravity = c.field_mut(paths::GRAVITY_FORCE)?;
    for i in 0..n {
        gravity[(i, 0)] = 0.0;
        gravity[(i, 1)] = 0.0;
        gravity[(i, 2)] = mass[i] * G0_MPS2;
    }
    Ok(())
}

/// Sum wind-frame, body-frame, and gravity forces in the inertial frame.
///
/// Inertial axes are NED (z down). Wind-to-inertial rotates by the flight
/// path angle; body-to-inertial by the pitch attitude.
pub fn update_forces(segment: &mut Segment) -> MissionResult<()> {
    let gamma = flight_path_angles(segment)?;
    let theta = segment
        .state
        .conditions
        .column(paths::BODY_ORIENTATION, 1)?;
    let wind = segment.state.conditions.field(paths::WIND_FORCE)?.clone();
    let thrust = segment.state.conditions.field(paths::THRUST_FORCE)?.clone();
    let gravity = segment
        .state
        .conditions
        .field(paths::GRAVITY_FORCE)?
        .clone();

    let total = segment.state.conditions.field_mut(paths::TOTAL_FORCE)?;
    for i in 0..total.nrows() {
        let (sin_g, cos_g) = gamma[i].sin_cos();
        let (sin_t, cos_t) = theta[i].sin_cos();

        // wind frame: x along velocity, z completing the NED-consistent triad
        let fw_x = wind[(i, 0)] * cos_g + wind[(i, 2)] * sin_g;
        let fw_z = -wind[(i, 0)] * sin_g + wind[(i, 2)] * cos_g;

        // body frame: x out the nose, pitched by theta
        let fb_x = thrust[(i, 0)] * cos_t + thrust[(i, 2)] * sin_t;
        let fb_z = -thrust[(i, 0)] * sin_t + thrust[(i, 2)] * cos_t;

        total[(i, 0)] = fw_x + fb_x + gravity[(i, 0)];
        total[(i, 1)] = wind[(i, 1)] + thrust[(i, 1)] + gravity[(i, 1)];
        total[(i, 2)] = fw_z + fb_z + gravity[(i, 2)];
    }
    Ok(())
}

/// Pitching moment from the aerodynamic moment coefficient.
pub fn update_moments(segment: &mut Segment) -> MissionResult<()> {
    let cm = segment
        .state
        .conditions
        .column(paths::MOMENT_COEFFICIENT, 0)?;
    let q = segment.state.conditions.column(paths::DYNAMIC_PRESSURE, 0)?;
    let wing = segment.analyses.vehicle.main_wing()?;
    let reference_area = wing.reference_area.value;
    let mean_chord = (reference_area / wing.aspect_ratio).sqrt();

    let moment = segment.state.conditions.field_mut(paths::BODY_MOMENT)?;
    for i in 0..moment.nrows() {
        moment[(i, 0)] = 0.0;
        moment[(i, 1)] = q[i] * reference_area * mean_chord * cm[i];
        moment[(i, 2)] = 0.0;
    }
    Ok(())
}

/// Acceleration from the time-differentiation operator on velocity.
pub fn update_acceleration(segment: &mut Segment) -> MissionResult<()> {
    let velocity = segment.state.conditions.field(paths::VELOCITY)?.clone();
    let acceleration = &segment.state.numerics.time.differentiate * velocity;
    let field = segment.state.conditions.field_mut(paths::ACCELERATION)?;
    field.copy_from(&acceleration);
    Ok(())
}

/// Force (and moment) balance residuals on the active axes.
pub fn update_residuals(segment: &mut Segment) -> MissionResult<()> {
    let total = segment.state.conditions.field(paths::TOTAL_FORCE)?.clone();
    let acceleration = segment
        .state
        .conditions
        .field(paths::ACCELERATION)?
        .clone();
    let mass = segment.state.conditions.column(paths::TOTAL_MASS, 0)?;
    let flight_dynamics = segment.flight_dynamics;
    let n = mass.len();

    let mut force_residual = |axis: usize, name: &str| -> MissionResult<()> {
        let mut r = Vec::with_capacity(n);
        for i in 0..n {
            r.push(total[(i, axis)] / mass[i] - acceleration[(i, axis)]);
        }
        segment.state.residuals.set_column(&[name], 0, &r)
    };

    if flight_dynamics.force_x {
        force_residual(0, "force_x")?;
    }
    if flight_dynamics.force_y {
        force_residual(1, "force_y")?;
    }
    if flight_dynamics.force_z {
        force_residual(2, "force_z")?;
    }

    if flight_dynamics.moment_x || flight_dynamics.moment_y || flight_dynamics.moment_z {
        let moment = segment.state.conditions.field(paths::BODY_MOMENT)?.clone();
        let q = segment.state.conditions.column(paths::DYNAMIC_PRESSURE, 0)?;
        let wing = segment.analyses.vehicle.main_wing()?;
        let reference = wing.reference_area.value * (wing.reference_area.value / wing.aspect_ratio).sqrt();

        let mut moment_residual = |axis: usize, name: &str| -> MissionResult<()> {
            let mut r = Vec::with_capacity(n);
            for i in 0..n {
                r.push(moment[(i, axis)] / (q[i] * reference).max(1e-9));
            }
            segment.state.residuals.set_column(&[name], 0, &r)
        };
        if flight_dynamics.moment_x {
            moment_residual(0, "moment_x")?;
        }
        if flight_dynamics.moment_y {
            moment_residual(1, "moment_y")?;
        }
        if flight_dynamics.moment_z {
            moment_residual(2, "moment_z")?;
        }
    }

    Ok(())
}
