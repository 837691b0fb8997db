//! Lithium-ion battery pack discharge model.

use crate::error::{PhysicsError, PhysicsResult};
use crate::traits::{EnergyStorage, StorageState};
use am_vehicle::BatteryModule;

/// Lumped-parameter lithium-ion pack.
///
/// Open-circuit voltage follows an affine fit in state of charge; terminal
/// voltage and current come from the power balance
/// `P = V_oc·I − R·I²`, solved in closed form per time step. State of
/// charge marches forward with the energy drawn over each interval, a
/// path-dependent quantity that cannot be posed as an algebraic residual.
#[derive(Clone, Debug)]
pub struct LithiumIonPack {
    /// Fraction of nominal voltage at zero charge
    pub voltage_sag_fraction: f64,
}

impl LithiumIonPack {
    pub fn new() -> Self {
        Self {
            voltage_sag_fraction: 0.8,
        }
    }

    /// Open-circuit voltage at a state of charge.
    fn open_circuit_voltage(&self, module: &BatteryModule, soc: f64) -> f64 {
        let sag = self.voltage_sag_fraction;
        module.nominal_voltage * (sag + (1.0 - sag) * soc.clamp(0.0, 1.0))
    }
}

impl Default for LithiumIonPack {
    fn default() -> Self {
        Self::new()
    }
}

impl EnergyStorage for LithiumIonPack {
    fn name(&self) -> &str {
        "lithium-ion pack"
    }

    fn energy_calc(
        &self,
        module: &BatteryModule,
        state: &mut StorageState,
        time_index: usize,
        delta_t_s: f64,
    ) -> PhysicsResult<()> {
        let n = state.len();
        if time_index + 1 >= n {
            return Err(PhysicsError::InvalidArg {
                what: "storage time index",
            });
        }
        if delta_t_s < 0.0 {
            return Err(PhysicsError::NonPhysical {
                what: "negative time step",
            });
        }

        let soc = state.state_of_charge[time_index];
        let power = state.power_draw_w[time_index];
        let v_oc = self.open_circuit_voltage(module, soc);
        let r = module.internal_resistance;

        // P = V_oc·I − R·I²  →  I = (V_oc − sqrt(V_oc² − 4RP)) / 2R
        let current = if r > 0.0 {
            let discriminant = v_oc * v_oc - 4.0 * r * power;
            if discriminant < 0.0 {
                // Demanded power exceeds what the pack can deliver at this
                // charge; current saturates at the peak-power point.
                v_oc / (2.0 * r)
            } else {
                (v_oc - discriminant.sqrt()) / (2.0 * r)
            }
        } else {
            power / v_oc.max(1e-9)
        };

        let heat = r * current * current;
        let drawn_j = (power + heat) * delta_t_s;
        let next_soc = soc - drawn_j / module.capacity_j();

        state.current_a[time_index] = current;
        state.voltage_v[time_index] = v_oc - r * current;
        state.heat_w[time_index] = heat;
        state.state_of_charge[time_index + 1] = next_soc;
        // Seed the next row's voltage so post-processing sees a full column
        state.voltage_v[time_index + 1] = self.open_circuit_voltage(module, next_soc);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_module() -> BatteryModule {
        BatteryModule::new("pack", 50_000.0, 400.0)
    }

    fn discharge(power_w: f64, steps: usize, dt: f64) -> StorageState {
        let module = test_module();
        let pack = LithiumIonPack::new();
        let mut state = StorageState::new(steps + 1, 1.0, module.nominal_voltage);
        for row in state.power_draw_w.iter_mut() {
            *row = power_w;
        }
        for i in 0..steps {
            pack.energy_calc(&module, &mut state, i, dt).unwrap();
        }
        state
    }

    #[test]
    fn soc_decreases_monotonically_under_load() {
        let state = discharge(80_000.0, 8, 10.0);
        for pair in state.state_of_charge.windows(2) {
            assert!(pair[1] < pair[0], "SOC must fall: {pair:?}");
        }
    }

    #[test]
    fn zero_load_holds_charge() {
        let state = discharge(0.0, 4, 10.0);
        for &soc in &state.state_of_charge {
            assert_eq!(soc, 1.0);
        }
    }

    #[test]
    fn discharge_energy_accounts_for_ohmic_heat() {
        let state = discharge(80_000.0, 1, 10.0);
        let module = test_module();
        let delta_soc = state.state_of_charge[0] - state.state_of_charge[1];
        let energy_j = delta_soc * module.capacity_j();
        // More energy leaves the pack than reaches the bus
        assert!(energy_j > 80_000.0 * 10.0);
        assert!(state.heat_w[0] > 0.0);
    }

    #[test]
    fn out_of_range_index_rejected() {
        let module = test_module();
        let pack = LithiumIonPack::new();
        let mut state = StorageState::new(4, 1.0, 400.0);
        let err = pack.energy_calc(&module, &mut state, 3, 1.0).unwrap_err();
        assert!(matches!(err, PhysicsError::InvalidArg { .. }));
    }
}
