//! Vehicle validation logic.

use crate::error::{VehicleError, VehicleResult};
use crate::vehicle::Vehicle;
use std::collections::HashSet;

/// Validate a vehicle before design and mission evaluation.
///
/// Checks structural completeness and physical plausibility of the
/// composition; correlation-level physics is not checked here.
pub fn validate(vehicle: &Vehicle) -> VehicleResult<()> {
    if vehicle.wings.is_empty() {
        return Err(VehicleError::MissingComponent { what: "wing" });
    }

    for wing in &vehicle.wings {
        if wing.reference_area.value <= 0.0 {
            return Err(VehicleError::NonPhysical {
                what: "wing reference area",
            });
        }
        if wing.aspect_ratio <= 0.0 {
            return Err(VehicleError::NonPhysical {
                what: "wing aspect ratio",
            });
        }
    }

    for fuselage in &vehicle.fuselages {
        if fuselage.length.value <= 0.0 {
            return Err(VehicleError::NonPhysical {
                what: "fuselage length",
            });
        }
    }

    // Propulsor tags must be unique vehicle-wide: mission conditions are
    // keyed by tag.
    let mut seen = HashSet::new();
    for network in &vehicle.networks {
        for bus in &network.busses {
            if bus.voltage <= 0.0 {
                return Err(VehicleError::NonPhysical { what: "bus voltage" });
            }
            for propulsor in &bus.propulsors {
                if !seen.insert(propulsor.tag.clone()) {
                    return Err(VehicleError::DuplicateTag {
                        tag: propulsor.tag.clone(),
                    });
                }
                if propulsor.rotor_diameter.value <= 0.0 {
                    return Err(VehicleError::NonPhysical {
                        what: "rotor diameter",
                    });
                }
                if !(0.0..=1.0).contains(&propulsor.motor_efficiency)
                    || !(0.0..=1.0).contains(&propulsor.propulsive_efficiency)
                {
                    return Err(VehicleError::NonPhysical {
                        what: "propulsor efficiency",
                    });
                }
            }
            for module in &bus.battery_modules {
                if module.capacity_wh <= 0.0 {
                    return Err(VehicleError::NonPhysical {
                        what: "battery capacity",
                    });
                }
                if module.internal_resistance < 0.0 {
                    return Err(VehicleError::NonPhysical {
                        what: "battery internal resistance",
                    });
                }
            }
            for stack in &bus.fuel_cell_stacks {
                if stack.cell_count == 0 {
                    return Err(VehicleError::NonPhysical {
                        what: "fuel cell count",
                    });
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::propulsion::{Bus, Network, Propulsor};
    use crate::wing::Wing;
    use am_core::units::{m, sq_m, w};

    fn basic_vehicle() -> Vehicle {
        let mut vehicle = Vehicle::new("test");
        vehicle
            .append_wing(Wing::new("main_wing", sq_m(15.0), 8.0))
            .unwrap();
        vehicle
    }

    #[test]
    fn valid_vehicle_passes() {
        assert!(validate(&basic_vehicle()).is_ok());
    }

    #[test]
    fn wingless_vehicle_fails() {
        let vehicle = Vehicle::new("bare");
        assert!(matches!(
            validate(&vehicle),
            Err(VehicleError::MissingComponent { what: "wing" })
        ));
    }

    #[test]
    fn duplicate_propulsor_tags_across_busses_fail() {
        let mut vehicle = basic_vehicle();
        let mut network = Network::new("electric");
        let mut bus_a = Bus::new("bus_a", 400.0);
        bus_a.append_propulsor(Propulsor::new("prop", m(1.0), w(40e3)));
        let mut bus_b = Bus::new("bus_b", 400.0);
        bus_b.append_propulsor(Propulsor::new("prop", m(1.0), w(40e3)));
        network.append_bus(bus_a);
        network.append_bus(bus_b);
        vehicle.append_network(network).unwrap();

        assert!(matches!(
            validate(&vehicle),
            Err(VehicleError::DuplicateTag { .. })
        ));
    }

    #[test]
    fn bad_efficiency_fails() {
        let mut vehicle = basic_vehicle();
        let mut network = Network::new("electric");
        let mut bus = Bus::new("bus", 400.0);
        let mut prop = Propulsor::new("prop", m(1.0), w(40e3));
        prop.motor_efficiency = 1.2;
        bus.append_propulsor(prop);
        network.append_bus(bus);
        vehicle.append_network(network).unwrap();

        assert!(matches!(
            validate(&vehicle),
            Err(VehicleError::NonPhysical { .. })
        ));
    }
}
