//! US Standard Atmosphere 1976 layer model.

use crate::error::{AtmoError, AtmoResult};
use crate::model::{AtmosphereData, AtmosphereModel};
use am_core::units::constants::{G0_MPS2, GAMMA_AIR, R_AIR};

/// One geopotential layer: base altitude, base temperature, base pressure,
/// and temperature lapse rate within the layer.
struct Layer {
    base_m: f64,
    base_temp_k: f64,
    base_pressure_pa: f64,
    lapse_k_per_m: f64,
}

/// Layer table to 86 km. Base pressures are the standard published values,
/// consistent with recursive integration of the hydrostatic equation.
const LAYERS: [Layer; 7] = [
    Layer {
        base_m: 0.0,
        base_temp_k: 288.15,
        base_pressure_pa: 101_325.0,
        lapse_k_per_m: -0.0065,
    },
    Layer {
        base_m: 11_000.0,
        base_temp_k: 216.65,
        base_pressure_pa: 22_632.06,
        lapse_k_per_m: 0.0,
    },
    Layer {
        base_m: 20_000.0,
        base_temp_k: 216.65,
        base_pressure_pa: 5_474.889,
        lapse_k_per_m: 0.001,
    },
    Layer {
        base_m: 32_000.0,
        base_temp_k: 228.65,
        base_pressure_pa: 868.0187,
        lapse_k_per_m: 0.0028,
    },
    Layer {
        base_m: 47_000.0,
        base_temp_k: 270.65,
        base_pressure_pa: 110.9063,
        lapse_k_per_m: 0.0,
    },
    Layer {
        base_m: 51_000.0,
        base_temp_k: 270.65,
        base_pressure_pa: 66.93887,
        lapse_k_per_m: -0.0028,
    },
    Layer {
        base_m: 71_000.0,
        base_temp_k: 214.65,
        base_pressure_pa: 3.956420,
        lapse_k_per_m: -0.002,
    },
];

/// Upper validity limit of the layer table.
const ALTITUDE_LIMIT_M: f64 = 86_000.0;

/// Specific heat of air at constant pressure (J/(kg K)), ideal-gas value.
const CP_AIR: f64 = GAMMA_AIR * R_AIR / (GAMMA_AIR - 1.0);

/// US Standard Atmosphere 1976.
///
/// Valid from sea level to 86 km geopotential altitude. Altitudes below sea
/// level are clamped to zero (conceptual-design missions occasionally probe
/// slightly negative altitudes during iteration).
#[derive(Clone, Debug, Default)]
pub struct UsStandard1976;

impl UsStandard1976 {
    pub fn new() -> Self {
        Self
    }

    fn layer_for(altitude_m: f64) -> &'static Layer {
        let mut layer = &LAYERS[0];
        for candidate in LAYERS.iter() {
            if altitude_m >= candidate.base_m {
                layer = candidate;
            }
        }
        layer
    }

    /// Standard temperature and pressure at one altitude.
    fn standard_tp(altitude_m: f64) -> (f64, f64) {
        let layer = Self::layer_for(altitude_m);
        let dh = altitude_m - layer.base_m;

        if layer.lapse_k_per_m == 0.0 {
            let t = layer.base_temp_k;
            let p = layer.base_pressure_pa * (-G0_MPS2 * dh / (R_AIR * t)).exp();
            (t, p)
        } else {
            let t = layer.base_temp_k + layer.lapse_k_per_m * dh;
            let exponent = -G0_MPS2 / (layer.lapse_k_per_m * R_AIR);
            let p = layer.base_pressure_pa * (t / layer.base_temp_k).powf(exponent);
            (t, p)
        }
    }

    /// Sutherland's law for dynamic viscosity of air.
    fn dynamic_viscosity(temperature_k: f64) -> f64 {
        1.458e-6 * temperature_k.powf(1.5) / (temperature_k + 110.4)
    }

    /// Empirical thermal conductivity correlation from the 1976 standard.
    fn thermal_conductivity(temperature_k: f64) -> f64 {
        2.64638e-3 * temperature_k.powf(1.5)
            / (temperature_k + 245.4 * 10f64.powf(-12.0 / temperature_k))
    }
}

impl AtmosphereModel for UsStandard1976 {
    fn name(&self) -> &str {
        "US Standard Atmosphere 1976"
    }

    fn compute_values(
        &self,
        altitude_m: &[f64],
        temperature_deviation_k: f64,
    ) -> AtmoResult<AtmosphereData> {
        let mut data = AtmosphereData::with_capacity(altitude_m.len());

        for &raw_alt in altitude_m {
            if !raw_alt.is_finite() {
                return Err(AtmoError::NonPhysical { what: "altitude" });
            }
            if raw_alt > ALTITUDE_LIMIT_M {
                return Err(AtmoError::AltitudeOutOfRange {
                    altitude_m: raw_alt,
                    limit_m: ALTITUDE_LIMIT_M,
                });
            }
            let alt = raw_alt.max(0.0);

            let (t_std, p) = Self::standard_tp(alt);
            let t = t_std + temperature_deviation_k;
            if t <= 0.0 {
                return Err(AtmoError::NonPhysical { what: "temperature" });
            }

            let rho = p / (R_AIR * t);
            let a = (GAMMA_AIR * R_AIR * t).sqrt();
            let mu = Self::dynamic_viscosity(t);
            let k = Self::thermal_conductivity(t);

            data.pressure.push(p);
            data.temperature.push(t);
            data.density.push(rho);
            data.speed_of_sound.push(a);
            data.dynamic_viscosity.push(mu);
            data.kinematic_viscosity.push(mu / rho);
            data.thermal_conductivity.push(k);
            data.prandtl_number.push(mu * CP_AIR / k);
        }

        Ok(data)
    }
}
