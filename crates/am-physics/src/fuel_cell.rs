//! Proton-exchange-membrane fuel cell stack model.

use crate::error::{PhysicsError, PhysicsResult};
use am_vehicle::FuelCellStack;

/// Converged operating point of a PEM stack at one power demand.
#[derive(Clone, Copy, Debug)]
pub struct FuelCellOperatingPoint {
    /// Stack terminal voltage [V]
    pub stack_voltage_v: f64,
    /// Stack current [A]
    pub current_a: f64,
    /// Current density [A/cm²]
    pub current_density_a_cm2: f64,
    /// Cell voltage [V]
    pub cell_voltage_v: f64,
    /// Electrical efficiency relative to the thermoneutral voltage
    pub efficiency: f64,
    /// Hydrogen consumption [kg/s]
    pub hydrogen_flow_kg_s: f64,
}

/// PEM polarization model with a bounded inner voltage-current iteration.
///
/// Cell voltage and current density are mutually coupled through the
/// polarization curve, so the operating point at a demanded power is found
/// by a damped fixed-point loop with its own tolerance and iteration cap.
/// A cap overrun surfaces as `PhysicsError::InnerConvergence`, distinct
/// from the mission solver's outer non-convergence.
#[derive(Clone, Debug)]
pub struct PemFuelCell {
    /// Activation (Tafel) slope [V/decade-e]
    pub tafel_slope_v: f64,
    /// Exchange current density [A/cm²]
    pub exchange_current_a_cm2: f64,
    /// Area-specific ohmic resistance [Ω·cm²]
    pub ohmic_resistance_ohm_cm2: f64,
    /// Limiting current density [A/cm²]
    pub limiting_current_a_cm2: f64,
    /// Inner-loop convergence tolerance on cell voltage [V]
    pub tolerance_v: f64,
    /// Inner-loop iteration cap
    pub max_iterations: usize,
}

/// Thermoneutral voltage of the hydrogen reaction [V].
const E_THERMONEUTRAL_V: f64 = 1.48;

/// Hydrogen consumption per unit stack charge [kg/C] (M_H2 / 2F).
const H2_KG_PER_COULOMB: f64 = 2.016e-3 / (2.0 * 96_485.0);

impl PemFuelCell {
    pub fn new() -> Self {
        Self {
            tafel_slope_v: 0.04,
            exchange_current_a_cm2: 3e-3,
            ohmic_resistance_ohm_cm2: 0.10,
            limiting_current_a_cm2: 1.6,
            tolerance_v: 1e-6,
            max_iterations: 60,
        }
    }

    /// Cell voltage at a current density from the polarization curve.
    fn cell_voltage(&self, stack: &FuelCellStack, i_a_cm2: f64) -> f64 {
        let i = i_a_cm2.max(1e-9);
        let activation = self.tafel_slope_v * (i / self.exchange_current_a_cm2).max(1.0).ln();
        let ohmic = self.ohmic_resistance_ohm_cm2 * i;
        let concentration = if i < self.limiting_current_a_cm2 {
            -0.05 * (1.0 - i / self.limiting_current_a_cm2).ln()
        } else {
            f64::INFINITY
        };
        stack.open_circuit_voltage - activation - ohmic - concentration
    }

    /// Find the operating point delivering `power_w` from the stack.
    pub fn operating_point(
        &self,
        stack: &FuelCellStack,
        power_w: f64,
    ) -> PhysicsResult<FuelCellOperatingPoint> {
        if power_w < 0.0 {
            return Err(PhysicsError::NonPhysical {
                what: "negative fuel cell power demand",
            });
        }

        let cells = stack.cell_count as f64;
        let area = stack.cell_area_cm2;

        if power_w == 0.0 {
            let v_cell = self.cell_voltage(stack, 0.0);
            return Ok(FuelCellOperatingPoint {
                stack_voltage_v: cells * v_cell,
                current_a: 0.0,
                current_density_a_cm2: 0.0,
                cell_voltage_v: v_cell,
                efficiency: 0.0,
                hydrogen_flow_kg_s: 0.0,
            });
        }

        // Damped fixed point: guess a cell voltage, infer the current
        // density delivering the demanded power, re-read the polarization
        // curve, repeat.
        let mut v_cell: f64 = 0.7;
        let mut i_density = 0.0;
        let mut converged = false;
        let mut iterations = 0;

        for iter in 0..self.max_iterations {
            iterations = iter + 1;
            i_density = power_w / (cells * v_cell.max(0.05) * area);
            if i_density >= self.limiting_current_a_cm2 {
                return Err(PhysicsError::InnerConvergence {
                    what: "fuel cell beyond limiting current",
                    iterations,
                });
            }
            let v_next = self.cell_voltage(stack, i_density);
            if v_next <= 0.0 {
                return Err(PhysicsError::NonPhysical {
                    what: "fuel cell voltage collapse",
                });
            }
            let v_new = 0.5 * (v_cell + v_next);
            if (v_new - v_cell).abs() < self.tolerance_v {
                v_cell = v_new;
                converged = true;
                break;
            }
            v_cell = v_new;
        }

        if !converged {
            return Err(PhysicsError::InnerConvergence {
                what: "fuel cell polarization loop",
                iterations,
            });
        }

        let current = i_density * area;
        Ok(FuelCellOperatingPoint {
            stack_voltage_v: cells * v_cell,
            current_a: current,
            current_density_a_cm2: i_density,
            cell_voltage_v: v_cell,
            efficiency: v_cell / E_THERMONEUTRAL_V,
            hydrogen_flow_kg_s: cells * current * H2_KG_PER_COULOMB,
        })
    }
}

impl Default for PemFuelCell {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use am_core::units::w;

    fn test_stack() -> FuelCellStack {
        FuelCellStack::new("stack", 300, w(80e3))
    }

    #[test]
    fn inner_loop_converges_at_moderate_power() {
        let cell = PemFuelCell::new();
        let point = cell.operating_point(&test_stack(), 30e3).unwrap();

        assert!(point.cell_voltage_v > 0.4 && point.cell_voltage_v < 1.0);
        assert!(point.efficiency > 0.3 && point.efficiency < 0.75);
        assert!(point.hydrogen_flow_kg_s > 0.0);
        // delivered power matches the demand at the converged point
        let delivered = point.stack_voltage_v * point.current_a;
        assert!((delivered - 30e3).abs() / 30e3 < 1e-3);
    }

    #[test]
    fn higher_power_lower_cell_voltage() {
        let cell = PemFuelCell::new();
        let low = cell.operating_point(&test_stack(), 10e3).unwrap();
        let high = cell.operating_point(&test_stack(), 50e3).unwrap();
        assert!(high.cell_voltage_v < low.cell_voltage_v);
        assert!(high.current_a > low.current_a);
    }

    #[test]
    fn overload_reports_inner_convergence_failure() {
        let cell = PemFuelCell::new();
        let err = cell.operating_point(&test_stack(), 10e6).unwrap_err();
        assert!(matches!(err, PhysicsError::InnerConvergence { .. }));
    }

    #[test]
    fn zero_power_is_open_circuit() {
        let cell = PemFuelCell::new();
        let point = cell.operating_point(&test_stack(), 0.0).unwrap();
        assert_eq!(point.current_a, 0.0);
        assert!(point.stack_voltage_v > 0.0);
    }
}
