//! Energy network composition: busses, storage modules, propulsors.

use am_core::units::{kg, Length, Mass, Power};
use am_core::{BusId, PropulsorId};

/// An electric propulsor (motor + rotor or ducted fan).
///
/// `identity_tag` declares this propulsor performance-identical to every
/// other propulsor on the same bus carrying the same tag; the propulsion
/// evaluator computes one member of each identity group and reuses the
/// result for the rest.
#[derive(Clone, Debug)]
pub struct Propulsor {
    pub tag: String,
    /// Identity group for performance memoization (None = always computed)
    pub identity_tag: Option<String>,
    /// Rotor or fan diameter
    pub rotor_diameter: Length,
    /// Combined motor + controller efficiency at the design point
    pub motor_efficiency: f64,
    /// Propulsive (rotor/fan) efficiency at the design point
    pub propulsive_efficiency: f64,
    /// Rated shaft power
    pub rated_power: Power,
    /// Installed mass
    pub mass: Mass,
    /// Thrust line angle relative to the body x-axis [rad]
    pub thrust_angle: f64,
}

impl Propulsor {
    pub fn new(tag: impl Into<String>, rotor_diameter: Length, rated_power: Power) -> Self {
        Self {
            tag: tag.into(),
            identity_tag: None,
            rotor_diameter,
            motor_efficiency: 0.95,
            propulsive_efficiency: 0.80,
            rated_power,
            mass: kg(0.0),
            thrust_angle: 0.0,
        }
    }

    /// Rotor disc area [m²].
    pub fn disc_area_m2(&self) -> f64 {
        std::f64::consts::PI * (0.5 * self.rotor_diameter.value).powi(2)
    }
}

/// A battery module on a bus.
#[derive(Clone, Debug)]
pub struct BatteryModule {
    pub tag: String,
    /// Usable energy capacity [Wh]
    pub capacity_wh: f64,
    /// Nominal pack voltage [V]
    pub nominal_voltage: f64,
    /// Lumped internal resistance [Ω]
    pub internal_resistance: f64,
    pub mass: Mass,
}

impl BatteryModule {
    pub fn new(tag: impl Into<String>, capacity_wh: f64, nominal_voltage: f64) -> Self {
        Self {
            tag: tag.into(),
            capacity_wh,
            nominal_voltage,
            internal_resistance: 0.05,
            mass: kg(0.0),
        }
    }

    /// Capacity in joules.
    pub fn capacity_j(&self) -> f64 {
        self.capacity_wh * 3600.0
    }
}

/// A proton-exchange-membrane fuel cell stack on a bus.
#[derive(Clone, Debug)]
pub struct FuelCellStack {
    pub tag: String,
    /// Number of cells in series
    pub cell_count: u32,
    /// Active area per cell [cm²]
    pub cell_area_cm2: f64,
    /// Open-circuit voltage per cell [V]
    pub open_circuit_voltage: f64,
    /// Rated stack power
    pub rated_power: Power,
    pub mass: Mass,
}

impl FuelCellStack {
    pub fn new(tag: impl Into<String>, cell_count: u32, rated_power: Power) -> Self {
        Self {
            tag: tag.into(),
            cell_count,
            cell_area_cm2: 250.0,
            open_circuit_voltage: 1.0,
            rated_power,
            mass: kg(0.0),
        }
    }
}

/// An electrical bus: one storage side, one load side.
#[derive(Clone, Debug)]
pub struct Bus {
    pub tag: String,
    /// Bus operating voltage [V]
    pub voltage: f64,
    /// Distribution efficiency between storage and propulsor terminals
    pub efficiency: f64,
    pub battery_modules: Vec<BatteryModule>,
    pub fuel_cell_stacks: Vec<FuelCellStack>,
    pub propulsors: Vec<Propulsor>,
}

impl Bus {
    pub fn new(tag: impl Into<String>, voltage: f64) -> Self {
        Self {
            tag: tag.into(),
            voltage,
            efficiency: 0.98,
            battery_modules: Vec::new(),
            fuel_cell_stacks: Vec::new(),
            propulsors: Vec::new(),
        }
    }

    pub fn append_battery_module(&mut self, module: BatteryModule) {
        self.battery_modules.push(module);
    }

    pub fn append_fuel_cell_stack(&mut self, stack: FuelCellStack) {
        self.fuel_cell_stacks.push(stack);
    }

    /// Append a propulsor and return its stable in-bus ID.
    pub fn append_propulsor(&mut self, propulsor: Propulsor) -> PropulsorId {
        let id = PropulsorId::from_index(self.propulsors.len() as u32);
        self.propulsors.push(propulsor);
        id
    }

    pub fn propulsor(&self, id: PropulsorId) -> Option<&Propulsor> {
        self.propulsors.get(id.index() as usize)
    }
}

/// An energy network: an ordered collection of busses.
#[derive(Clone, Debug, Default)]
pub struct Network {
    pub tag: String,
    pub busses: Vec<Bus>,
}

impl Network {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            busses: Vec::new(),
        }
    }

    /// Append a bus and return its stable in-network ID.
    pub fn append_bus(&mut self, bus: Bus) -> BusId {
        let id = BusId::from_index(self.busses.len() as u32);
        self.busses.push(bus);
        id
    }

    pub fn bus(&self, id: BusId) -> Option<&Bus> {
        self.busses.get(id.index() as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use am_core::units::{m, w};

    #[test]
    fn bus_ids_are_stable_indices() {
        let mut network = Network::new("electric");
        let mut bus = Bus::new("dc_bus", 400.0);
        let p0 = bus.append_propulsor(Propulsor::new("port", m(1.0), w(40e3)));
        let p1 = bus.append_propulsor(Propulsor::new("starboard", m(1.0), w(40e3)));
        assert_eq!(p0.index(), 0);
        assert_eq!(p1.index(), 1);
        assert_eq!(bus.propulsor(p1).unwrap().tag, "starboard");

        let b0 = network.append_bus(bus);
        assert_eq!(network.bus(b0).unwrap().tag, "dc_bus");
    }

    #[test]
    fn disc_area() {
        let p = Propulsor::new("fan", m(2.0), w(100e3));
        assert!((p.disc_area_m2() - std::f64::consts::PI).abs() < 1e-12);
    }
}
