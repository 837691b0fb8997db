//! Atmosphere model trait and shared data types.

use crate::error::AtmoResult;

/// Freestream properties evaluated at a set of altitudes.
///
/// All vectors have the same length as the altitude input, one entry per
/// mission control point. SI units throughout.
#[derive(Clone, Debug, Default)]
pub struct AtmosphereData {
    /// Static pressure [Pa]
    pub pressure: Vec<f64>,
    /// Static temperature [K]
    pub temperature: Vec<f64>,
    /// Density [kg/m³]
    pub density: Vec<f64>,
    /// Speed of sound [m/s]
    pub speed_of_sound: Vec<f64>,
    /// Dynamic viscosity [Pa·s]
    pub dynamic_viscosity: Vec<f64>,
    /// Kinematic viscosity [m²/s]
    pub kinematic_viscosity: Vec<f64>,
    /// Thermal conductivity [W/(m·K)]
    pub thermal_conductivity: Vec<f64>,
    /// Prandtl number [-]
    pub prandtl_number: Vec<f64>,
}

impl AtmosphereData {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            pressure: Vec::with_capacity(n),
            temperature: Vec::with_capacity(n),
            density: Vec::with_capacity(n),
            speed_of_sound: Vec::with_capacity(n),
            dynamic_viscosity: Vec::with_capacity(n),
            kinematic_viscosity: Vec::with_capacity(n),
            thermal_conductivity: Vec::with_capacity(n),
            prandtl_number: Vec::with_capacity(n),
        }
    }

    /// Number of evaluated points.
    pub fn len(&self) -> usize {
        self.pressure.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pressure.is_empty()
    }
}

/// Trait for atmosphere property models.
///
/// Implementations are pure functions of altitude and temperature deviation,
/// and must be thread-safe (Send + Sync).
pub trait AtmosphereModel: Send + Sync {
    /// Model name for diagnostics and identification.
    fn name(&self) -> &str;

    /// Evaluate freestream properties at each altitude.
    ///
    /// `temperature_deviation_k` is an offset applied to the standard
    /// temperature profile (hot/cold day studies). Pressure follows the
    /// standard profile; density is recomputed from the shifted temperature.
    fn compute_values(
        &self,
        altitude_m: &[f64],
        temperature_deviation_k: f64,
    ) -> AtmoResult<AtmosphereData>;
}
