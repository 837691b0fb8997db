//! Shared test fixture: a small battery-electric aircraft with three
//! identical propulsors, mirroring a typical conceptual-design study.

use am_atmosphere::UsStandard1976;
use am_mission::Analyses;
use am_physics::{ElectricRotor, LithiumIonPack, PolarAero};
use am_vehicle::{
    design, BatteryModule, Bus, Fuselage, Network, Propulsor, Vehicle, WeightMethod, Wing,
};
use am_core::units::{kg, m, sq_m, w};
use std::sync::Arc;

pub fn electric_testbed() -> Vehicle {
    let mut vehicle = Vehicle::new("electric_testbed");

    let mut wing = Wing::new("main_wing", sq_m(12.0), 8.0);
    wing.main_wing = true;
    vehicle.append_wing(wing).unwrap();

    let mut fuselage = Fuselage::new("fuselage", m(6.0), m(1.2), m(1.3));
    fuselage.seats = 2;
    vehicle.append_fuselage(fuselage).unwrap();

    let mut network = Network::new("electric");
    let mut bus = Bus::new("dc_bus", 400.0);
    bus.append_battery_module(BatteryModule::new("pack", 20_000.0, 400.0));
    for tag in ["center_propulsor", "port_propulsor", "starboard_propulsor"] {
        let mut propulsor = Propulsor::new(tag, m(1.2), w(12e3));
        propulsor.identity_tag = Some("cruise_rotor".into());
        bus.append_propulsor(propulsor);
    }
    network.append_bus(bus);
    vehicle.append_network(network).unwrap();

    design(&mut vehicle, WeightMethod::Electric, kg(90.0)).unwrap();
    vehicle
}

pub fn testbed_analyses() -> Analyses {
    analyses_for(electric_testbed())
}

/// Same airframe with dead propulsors: thrust is identically zero, so any
/// nonzero drag makes the force balance unsatisfiable.
pub fn powerless_testbed() -> Vehicle {
    let mut vehicle = electric_testbed();
    for network in &mut vehicle.networks {
        for bus in &mut network.busses {
            for propulsor in &mut bus.propulsors {
                propulsor.rated_power = w(0.0);
            }
        }
    }
    vehicle
}

pub fn analyses_for(vehicle: Vehicle) -> Analyses {
    let aspect_ratio = vehicle.main_wing().unwrap().aspect_ratio;
    Analyses {
        vehicle: Arc::new(vehicle),
        atmosphere: Arc::new(UsStandard1976::new()),
        aerodynamics: Arc::new(PolarAero::new(0.25, 5.7, 0.025, aspect_ratio, 0.8)),
        propulsion: Arc::new(ElectricRotor::new()),
        energy_storage: Arc::new(LithiumIonPack::new()),
    }
}
