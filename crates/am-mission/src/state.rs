//! Per-segment state: initials, numerics, unknowns, conditions, residuals.

use crate::conditions::Conditions;
use crate::error::MissionResult;
use crate::numerics::Numerics;
use am_vehicle::Vehicle;

/// Well-known condition paths.
///
/// The result structure is an in-process contract: downstream reporting
/// code addresses fields by these names, so they are stable.
pub mod paths {
    pub const TIME: &[&str] = &["frames", "inertial", "time"];
    pub const POSITION: &[&str] = &["frames", "inertial", "position_vector"];
    pub const VELOCITY: &[&str] = &["frames", "inertial", "velocity_vector"];
    pub const ACCELERATION: &[&str] = &["frames", "inertial", "acceleration_vector"];
    pub const GRAVITY_FORCE: &[&str] = &["frames", "inertial", "gravity_force_vector"];
    pub const TOTAL_FORCE: &[&str] = &["frames", "inertial", "total_force_vector"];
    pub const BODY_ORIENTATION: &[&str] = &["frames", "body", "orientation"];
    pub const THRUST_FORCE: &[&str] = &["frames", "body", "thrust_force_vector"];
    pub const BODY_MOMENT: &[&str] = &["frames", "body", "moment_vector"];
    pub const WIND_FORCE: &[&str] = &["frames", "wind", "force_vector"];

    pub const ALTITUDE: &[&str] = &["freestream", "altitude"];
    pub const DENSITY: &[&str] = &["freestream", "density"];
    pub const PRESSURE: &[&str] = &["freestream", "pressure"];
    pub const TEMPERATURE: &[&str] = &["freestream", "temperature"];
    pub const SPEED_OF_SOUND: &[&str] = &["freestream", "speed_of_sound"];
    pub const DYNAMIC_VISCOSITY: &[&str] = &["freestream", "dynamic_viscosity"];
    pub const KINEMATIC_VISCOSITY: &[&str] = &["freestream", "kinematic_viscosity"];
    pub const THERMAL_CONDUCTIVITY: &[&str] = &["freestream", "thermal_conductivity"];
    pub const PRANDTL_NUMBER: &[&str] = &["freestream", "prandtl_number"];
    pub const FREESTREAM_VELOCITY: &[&str] = &["freestream", "velocity"];
    pub const MACH: &[&str] = &["freestream", "mach_number"];
    pub const DYNAMIC_PRESSURE: &[&str] = &["freestream", "dynamic_pressure"];
    pub const REYNOLDS: &[&str] = &["freestream", "reynolds_number"];

    pub const ANGLE_OF_ATTACK: &[&str] = &["aerodynamics", "angle_of_attack"];
    pub const LIFT_COEFFICIENT: &[&str] = &["aerodynamics", "lift_coefficient"];
    pub const DRAG_COEFFICIENT: &[&str] = &["aerodynamics", "drag_coefficient"];
    pub const MOMENT_COEFFICIENT: &[&str] = &["aerodynamics", "moment_coefficient"];

    pub const TOTAL_MASS: &[&str] = &["weights", "total_mass"];
    pub const MASS_RATE: &[&str] = &["weights", "vehicle_mass_rate"];
}

/// Complete state for one mission segment.
///
/// `initials` is a snapshot of the predecessor segment's final state,
/// assigned by the sequencer; `numerics` holds the discretization; the
/// remaining three containers are the solve surface. Row expansion applies
/// to everything except `initials` and `numerics`.
#[derive(Clone, Debug, Default)]
pub struct State {
    pub initials: Option<Box<State>>,
    pub numerics: Numerics,
    pub unknowns: Conditions,
    pub conditions: Conditions,
    pub residuals: Conditions,
}

impl State {
    /// Fresh state with the standard condition layout for a vehicle.
    pub fn new(vehicle: &Vehicle) -> MissionResult<Self> {
        Ok(Self {
            initials: None,
            numerics: Numerics::default(),
            unknowns: Conditions::new(),
            conditions: build_base_conditions(vehicle)?,
            residuals: Conditions::new(),
        })
    }

    /// Expand unknowns, conditions, and residuals to `rows` rows.
    /// Idempotent at the current row count.
    pub fn expand_rows(&mut self, rows: usize) {
        self.unknowns.expand_rows(rows);
        self.conditions.expand_rows(rows);
        self.residuals.expand_rows(rows);
    }

    /// Last-row value of a condition column, used for segment chaining.
    pub fn final_value(&self, path: &[&str], col: usize) -> MissionResult<f64> {
        let column = self.conditions.column(path, col)?;
        column
            .last()
            .copied()
            .ok_or_else(|| crate::error::MissionError::MissingPath {
                path: path.join("."),
            })
    }
}

/// The standard condition tree every evaluate-style segment shares.
///
/// Energy groups are laid out per propulsor and per battery module so the
/// reporting structure mirrors the vehicle composition:
/// `energy.<propulsor>.throttle`, `energy.<bus>.<module>.state_of_charge`.
pub fn build_base_conditions(vehicle: &Vehicle) -> MissionResult<Conditions> {
    let mut c = Conditions::new();

    c.ensure_field(paths::TIME, 1, 1)?;
    c.ensure_field(paths::POSITION, 1, 3)?;
    c.ensure_field(paths::VELOCITY, 1, 3)?;
    c.ensure_field(paths::ACCELERATION, 1, 3)?;
    c.ensure_field(paths::GRAVITY_FORCE, 1, 3)?;
    c.ensure_field(paths::TOTAL_FORCE, 1, 3)?;
    c.ensure_field(paths::BODY_ORIENTATION, 1, 3)?;
    c.ensure_field(paths::THRUST_FORCE, 1, 3)?;
    c.ensure_field(paths::BODY_MOMENT, 1, 3)?;
    c.ensure_field(paths::WIND_FORCE, 1, 3)?;

    c.ensure_field(paths::ALTITUDE, 1, 1)?;
    c.ensure_field(paths::DENSITY, 1, 1)?;
    c.ensure_field(paths::PRESSURE, 1, 1)?;
    c.ensure_field(paths::TEMPERATURE, 1, 1)?;
    c.ensure_field(paths::SPEED_OF_SOUND, 1, 1)?;
    c.ensure_field(paths::DYNAMIC_VISCOSITY, 1, 1)?;
    c.ensure_field(paths::KINEMATIC_VISCOSITY, 1, 1)?;
    c.ensure_field(paths::THERMAL_CONDUCTIVITY, 1, 1)?;
    c.ensure_field(paths::PRANDTL_NUMBER, 1, 1)?;
    c.ensure_field(paths::FREESTREAM_VELOCITY, 1, 1)?;
    c.ensure_field(paths::MACH, 1, 1)?;
    c.ensure_field(paths::DYNAMIC_PRESSURE, 1, 1)?;
    c.ensure_field(paths::REYNOLDS, 1, 1)?;

    c.ensure_field(paths::ANGLE_OF_ATTACK, 1, 1)?;
    c.ensure_field(paths::LIFT_COEFFICIENT, 1, 1)?;
    c.ensure_field(paths::DRAG_COEFFICIENT, 1, 1)?;
    c.ensure_field(paths::MOMENT_COEFFICIENT, 1, 1)?;

    c.ensure_field(paths::TOTAL_MASS, 1, 1)?;
    c.ensure_field(paths::MASS_RATE, 1, 1)?;

    for network in &vehicle.networks {
        for bus in &network.busses {
            for propulsor in &bus.propulsors {
                let tag = propulsor.tag.as_str();
                c.ensure_field(&["energy", tag, "throttle"], 1, 1)?;
                c.ensure_field(&["energy", tag, "thrust_vector"], 1, 3)?;
                c.ensure_field(&["energy", tag, "mechanical_power"], 1, 1)?;
                c.ensure_field(&["energy", tag, "electrical_power"], 1, 1)?;
            }
            let bus_tag = bus.tag.as_str();
            c.ensure_field(&["energy", bus_tag, "power_draw"], 1, 1)?;
            for module in &bus.battery_modules {
                let module_tag = module.tag.as_str();
                c.ensure_field(&["energy", bus_tag, module_tag, "state_of_charge"], 1, 1)?;
                c.ensure_field(&["energy", bus_tag, module_tag, "voltage"], 1, 1)?;
                c.ensure_field(&["energy", bus_tag, module_tag, "current"], 1, 1)?;
                c.ensure_field(&["energy", bus_tag, module_tag, "heat"], 1, 1)?;
            }
            for stack in &bus.fuel_cell_stacks {
                let stack_tag = stack.tag.as_str();
                c.ensure_field(&["energy", bus_tag, stack_tag, "power_supplied"], 1, 1)?;
                c.ensure_field(&["energy", bus_tag, stack_tag, "stack_voltage"], 1, 1)?;
                c.ensure_field(&["energy", bus_tag, stack_tag, "hydrogen_flow"], 1, 1)?;
            }
        }
    }

    Ok(c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use am_vehicle::{Bus, Network, Propulsor, Wing};
    use am_core::units::{m, sq_m, w};

    fn vehicle() -> Vehicle {
        let mut v = Vehicle::new("test");
        v.append_wing(Wing::new("main_wing", sq_m(15.0), 8.0)).unwrap();
        let mut network = Network::new("electric");
        let mut bus = Bus::new("dc_bus", 400.0);
        bus.append_propulsor(Propulsor::new("prop", m(1.2), w(60e3)));
        network.append_bus(bus);
        v.append_network(network).unwrap();
        v
    }

    #[test]
    fn base_layout_contains_energy_groups() {
        let state = State::new(&vehicle()).unwrap();
        assert!(state
            .conditions
            .field(&["energy", "prop", "throttle"])
            .is_ok());
        assert!(state.conditions.field(paths::VELOCITY).is_ok());
    }

    #[test]
    fn expand_rows_leaves_numerics_alone() {
        let mut state = State::new(&vehicle()).unwrap();
        state.numerics.number_of_control_points = 8;
        state.numerics.build().unwrap();
        state.expand_rows(8);

        assert_eq!(state.conditions.field(paths::VELOCITY).unwrap().nrows(), 8);
        assert_eq!(state.numerics.dimensionless.control_points.len(), 8);
    }
}
