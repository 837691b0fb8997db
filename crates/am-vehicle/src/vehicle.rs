//! Vehicle aggregate and cached mass properties.

use crate::error::{VehicleError, VehicleResult};
use crate::fuselage::Fuselage;
use crate::propulsion::Network;
use crate::weights::WeightBreakdown;
use crate::wing::Wing;
use am_core::units::{kg, Area, Mass};

/// Cached mass properties, written once by the weight design pre-pass.
#[derive(Clone, Debug)]
pub struct MassProperties {
    /// Operating empty mass
    pub empty: Mass,
    /// Payload carried on this mission
    pub payload: Mass,
    /// Takeoff (total) mass
    pub takeoff: Mass,
    /// Full component breakdown from the design pass
    pub breakdown: Option<WeightBreakdown>,
}

impl Default for MassProperties {
    fn default() -> Self {
        Self {
            empty: kg(0.0),
            payload: kg(0.0),
            takeoff: kg(0.0),
            breakdown: None,
        }
    }
}

/// An aircraft: named components plus cached design outputs.
///
/// Assemble with the `append_*` methods, then run `validate` and the weight
/// design pre-pass before handing the vehicle to mission evaluation. After
/// design the vehicle is treated as read-only.
#[derive(Clone, Debug, Default)]
pub struct Vehicle {
    pub tag: String,
    pub wings: Vec<Wing>,
    pub fuselages: Vec<Fuselage>,
    pub networks: Vec<Network>,
    pub mass_properties: MassProperties,
}

impl Vehicle {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn append_wing(&mut self, wing: Wing) -> VehicleResult<()> {
        if self.wings.iter().any(|w| w.tag == wing.tag) {
            return Err(VehicleError::DuplicateTag { tag: wing.tag });
        }
        self.wings.push(wing);
        Ok(())
    }

    pub fn append_fuselage(&mut self, fuselage: Fuselage) -> VehicleResult<()> {
        if self.fuselages.iter().any(|f| f.tag == fuselage.tag) {
            return Err(VehicleError::DuplicateTag { tag: fuselage.tag });
        }
        self.fuselages.push(fuselage);
        Ok(())
    }

    pub fn append_network(&mut self, network: Network) -> VehicleResult<()> {
        if self.networks.iter().any(|n| n.tag == network.tag) {
            return Err(VehicleError::DuplicateTag { tag: network.tag });
        }
        self.networks.push(network);
        Ok(())
    }

    /// The aerodynamic reference surface: the wing flagged `main_wing`, or
    /// the first wing when none is flagged.
    pub fn main_wing(&self) -> VehicleResult<&Wing> {
        self.wings
            .iter()
            .find(|w| w.main_wing)
            .or_else(|| self.wings.first())
            .ok_or(VehicleError::MissingComponent { what: "wing" })
    }

    /// Aerodynamic reference area.
    pub fn reference_area(&self) -> VehicleResult<Area> {
        Ok(self.main_wing()?.reference_area)
    }

    /// All propulsors across every network and bus, in declaration order.
    pub fn propulsor_tags(&self) -> Vec<String> {
        self.networks
            .iter()
            .flat_map(|n| n.busses.iter())
            .flat_map(|b| b.propulsors.iter())
            .map(|p| p.tag.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use am_core::units::sq_m;

    #[test]
    fn duplicate_wing_tag_rejected() {
        let mut vehicle = Vehicle::new("test");
        vehicle
            .append_wing(Wing::new("main_wing", sq_m(15.0), 8.0))
            .unwrap();
        let err = vehicle
            .append_wing(Wing::new("main_wing", sq_m(4.0), 5.0))
            .unwrap_err();
        assert!(matches!(err, VehicleError::DuplicateTag { .. }));
    }

    #[test]
    fn main_wing_prefers_flag() {
        let mut vehicle = Vehicle::new("test");
        vehicle
            .append_wing(Wing::new("tail", sq_m(3.0), 4.0))
            .unwrap();
        let mut main = Wing::new("main_wing", sq_m(15.0), 8.0);
        main.main_wing = true;
        vehicle.append_wing(main).unwrap();
        assert_eq!(vehicle.main_wing().unwrap().tag, "main_wing");
    }

    #[test]
    fn missing_wing_is_an_error() {
        let vehicle = Vehicle::new("bare");
        assert!(vehicle.main_wing().is_err());
    }
}
