//! Weight correlation design pre-pass.
//!
//! Each method arm is a stateless correlation producing a component mass
//! breakdown from geometry and ratings. The numbers are conceptual-design
//! estimates; swapping in a different correlation set means adding an enum
//! variant, and the match below keeps that exhaustive.

use crate::error::{VehicleError, VehicleResult};
use crate::vehicle::Vehicle;
use am_core::units::{kg, Mass};

/// Which correlation set sizes the airframe.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WeightMethod {
    /// Piston/turboprop general aviation correlations
    GeneralAviation,
    /// Battery-electric correlations (adds motor + pack masses from ratings)
    Electric,
}

/// Component mass breakdown from a design pass.
#[derive(Clone, Debug, Default)]
pub struct WeightBreakdown {
    pub wings_kg: f64,
    pub fuselages_kg: f64,
    pub landing_gear_kg: f64,
    pub systems_kg: f64,
    pub propulsion_kg: f64,
    pub energy_storage_kg: f64,
    pub empty_kg: f64,
}

/// Structural mass of one lifting surface (simplified transport-category
/// regression on area, aspect ratio, sweep, and thickness).
fn wing_mass_kg(area_m2: f64, aspect_ratio: f64, sweep_rad: f64, t_over_c: f64) -> f64 {
    9.6 * area_m2 * (aspect_ratio / 8.0).powf(0.55) * (0.12 / t_over_c).powf(0.3)
        / sweep_rad.cos().powf(0.5)
}

fn fuselage_mass_kg(wetted_area_m2: f64, seats: u32) -> f64 {
    7.0 * wetted_area_m2 + 14.0 * seats as f64
}

/// Run the selected correlation set over the vehicle composition.
pub fn compute_weight_breakdown(
    vehicle: &Vehicle,
    method: WeightMethod,
) -> VehicleResult<WeightBreakdown> {
    if vehicle.wings.is_empty() {
        return Err(VehicleError::MissingComponent { what: "wing" });
    }

    let mut breakdown = WeightBreakdown::default();

    for wing in &vehicle.wings {
        breakdown.wings_kg += wing_mass_kg(
            wing.reference_area.value,
            wing.aspect_ratio,
            wing.sweep,
            wing.thickness_to_chord,
        );
    }
    for fuselage in &vehicle.fuselages {
        breakdown.fuselages_kg += fuselage_mass_kg(fuselage.wetted_area_m2(), fuselage.seats);
    }

    let structure = breakdown.wings_kg + breakdown.fuselages_kg;
    breakdown.landing_gear_kg = 0.08 * structure;

    match method {
        WeightMethod::GeneralAviation => {
            breakdown.systems_kg = 0.12 * structure;
            // Installed engine mass from rated power, 1.4 kW/kg class
            for network in &vehicle.networks {
                for bus in &network.busses {
                    for propulsor in &bus.propulsors {
                        let installed = if propulsor.mass.value > 0.0 {
                            propulsor.mass.value
                        } else {
                            propulsor.rated_power.value / 1400.0
                        };
                        breakdown.propulsion_kg += 1.3 * installed;
                    }
                }
            }
        }
        WeightMethod::Electric => {
            breakdown.systems_kg = 0.15 * structure;
            for network in &vehicle.networks {
                for bus in &network.busses {
                    // Electric motors around 5 kW/kg, plus mounting
                    for propulsor in &bus.propulsors {
                        let motor = if propulsor.mass.value > 0.0 {
                            propulsor.mass.value
                        } else {
                            propulsor.rated_power.value / 5000.0
                        };
                        breakdown.propulsion_kg += 1.15 * motor;
                    }
                    // Packs around 200 Wh/kg at pack level
                    for module in &bus.battery_modules {
                        let pack = if module.mass.value > 0.0 {
                            module.mass.value
                        } else {
                            module.capacity_wh / 200.0
                        };
                        breakdown.energy_storage_kg += pack;
                    }
                    for stack in &bus.fuel_cell_stacks {
                        let stack_mass = if stack.mass.value > 0.0 {
                            stack.mass.value
                        } else {
                            stack.rated_power.value / 2000.0
                        };
                        breakdown.energy_storage_kg += stack_mass;
                    }
                }
            }
        }
    }

    breakdown.empty_kg = breakdown.wings_kg
        + breakdown.fuselages_kg
        + breakdown.landing_gear_kg
        + breakdown.systems_kg
        + breakdown.propulsion_kg
        + breakdown.energy_storage_kg;

    Ok(breakdown)
}

/// Design pre-pass: compute the breakdown once and cache mass properties on
/// the vehicle. Mission evaluation reads these and never writes them.
pub fn design(vehicle: &mut Vehicle, method: WeightMethod, payload: Mass) -> VehicleResult<()> {
    crate::validate::validate(vehicle)?;
    let breakdown = compute_weight_breakdown(vehicle, method)?;

    vehicle.mass_properties.empty = kg(breakdown.empty_kg);
    vehicle.mass_properties.payload = payload;
    vehicle.mass_properties.takeoff = kg(breakdown.empty_kg + payload.value);
    vehicle.mass_properties.breakdown = Some(breakdown);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::propulsion::{BatteryModule, Bus, Network, Propulsor};
    use crate::wing::Wing;
    use am_core::units::{m, sq_m, w};

    fn electric_vehicle() -> Vehicle {
        let mut vehicle = Vehicle::new("e_test");
        vehicle
            .append_wing(Wing::new("main_wing", sq_m(15.0), 8.0))
            .unwrap();
        let mut network = Network::new("electric");
        let mut bus = Bus::new("dc_bus", 400.0);
        bus.append_battery_module(BatteryModule::new("pack", 50_000.0, 400.0));
        bus.append_propulsor(Propulsor::new("prop", m(1.2), w(60e3)));
        network.append_bus(bus);
        vehicle.append_network(network).unwrap();
        vehicle
    }

    #[test]
    fn design_caches_mass_properties() {
        let mut vehicle = electric_vehicle();
        design(&mut vehicle, WeightMethod::Electric, kg(180.0)).unwrap();

        let props = &vehicle.mass_properties;
        assert!(props.empty.value > 0.0);
        assert!((props.takeoff.value - props.empty.value - 180.0).abs() < 1e-9);
        let breakdown = props.breakdown.as_ref().unwrap();
        assert!(breakdown.energy_storage_kg > 0.0);
    }

    #[test]
    fn electric_heavier_than_ga_for_same_airframe() {
        let vehicle = electric_vehicle();
        let ga = compute_weight_breakdown(&vehicle, WeightMethod::GeneralAviation).unwrap();
        let electric = compute_weight_breakdown(&vehicle, WeightMethod::Electric).unwrap();
        // Same airframe, but the electric arm books the pack mass
        assert!(electric.empty_kg > ga.empty_kg);
    }

    #[test]
    fn declared_masses_override_correlations() {
        let mut vehicle = electric_vehicle();
        vehicle.networks[0].busses[0].propulsors[0].mass = kg(25.0);
        let breakdown = compute_weight_breakdown(&vehicle, WeightMethod::Electric).unwrap();
        assert!((breakdown.propulsion_kg - 1.15 * 25.0).abs() < 1e-9);
    }
}
