//! Core traits for physics evaluators.
//!
//! Everything here is vectorized over a segment's N control points: inputs
//! are borrowed slices of length N, outputs are freshly allocated vectors of
//! length N. Evaluators never see the mission state container itself.

use crate::cache::PerformanceCache;
use crate::error::PhysicsResult;
use am_vehicle::{BatteryModule, Propulsor};

/// Flight state the aerodynamics evaluator consumes.
#[derive(Clone, Copy, Debug)]
pub struct AeroState<'a> {
    /// Angle of attack [rad]
    pub angle_of_attack: &'a [f64],
    /// Freestream Mach number [-]
    pub mach: &'a [f64],
}

/// Aerodynamic coefficients at each control point.
#[derive(Clone, Debug)]
pub struct AeroCoefficients {
    pub lift: Vec<f64>,
    pub drag: Vec<f64>,
    pub pitching_moment: Vec<f64>,
}

/// Trait for aerodynamic coefficient evaluators.
///
/// Implementations are deterministic functions of the flight state; panel
/// and vortex-lattice methods plug in behind this same interface.
pub trait AeroModel: Send + Sync {
    /// Model name for diagnostics and identification.
    fn name(&self) -> &str;

    /// Evaluate coefficients at every control point.
    fn evaluate(&self, state: &AeroState<'_>) -> PhysicsResult<AeroCoefficients>;
}

/// Operating state of a single propulsor across the control points.
#[derive(Clone, Copy, Debug)]
pub struct PropulsorOperatingState<'a> {
    /// Throttle setting [-], typically 0..1 with transient margin above
    pub throttle: &'a [f64],
    /// Freestream density [kg/m³]
    pub density: &'a [f64],
    /// Freestream velocity magnitude [m/s]
    pub velocity: &'a [f64],
}

/// Performance of one propulsor at each control point.
///
/// Thrust and moment are body-frame vectors stored as [x, y, z] triples per
/// point; powers are scalars per point.
#[derive(Clone, Debug)]
pub struct PropulsorPerformance {
    pub thrust_n: Vec<[f64; 3]>,
    pub moment_nm: Vec<[f64; 3]>,
    pub mechanical_power_w: Vec<f64>,
    pub electrical_power_w: Vec<f64>,
}

/// Trait for propulsor performance evaluators.
///
/// The cache argument carries the explicit identical-propulsor memoization:
/// when the propulsor declares an `identity_tag` already present in the
/// cache, the stored result is cloned back and flagged. The caller clears
/// the cache once per residual evaluation and processes identity groups in
/// declaration order, so reuse is deterministic and observable.
pub trait PropulsionModel: Send + Sync {
    fn name(&self) -> &str;

    /// Compute (or reuse) performance for one propulsor.
    ///
    /// Returns the performance plus `(reused, identity_tag)`: `reused` is
    /// true when the result came from the cache rather than a fresh
    /// evaluation. This is a performance contract only; reused results are
    /// bit-identical to what a fresh evaluation would produce.
    fn compute_performance(
        &self,
        propulsor: &Propulsor,
        bus_efficiency: f64,
        state: &PropulsorOperatingState<'_>,
        cache: &mut PerformanceCache,
    ) -> PhysicsResult<(PropulsorPerformance, bool, Option<String>)>;
}

/// Path-dependent storage conditions over a segment's control points.
///
/// `power_draw_w` is filled by the caller from the propulsion solution;
/// the remaining columns are advanced in place, one time step at a time,
/// by `EnergyStorage::energy_calc`. Row 0 is the segment's inherited
/// initial state.
#[derive(Clone, Debug)]
pub struct StorageState {
    /// Electrical load on the storage device [W]
    pub power_draw_w: Vec<f64>,
    /// State of charge [-], 0..1
    pub state_of_charge: Vec<f64>,
    /// Terminal voltage [V]
    pub voltage_v: Vec<f64>,
    /// Discharge current [A], positive out of the device
    pub current_a: Vec<f64>,
    /// Ohmic heat generation [W]
    pub heat_w: Vec<f64>,
}

impl StorageState {
    /// Fresh storage state with `n` rows and the given initial charge.
    pub fn new(n: usize, initial_soc: f64, nominal_voltage: f64) -> Self {
        Self {
            power_draw_w: vec![0.0; n],
            state_of_charge: vec![initial_soc; n],
            voltage_v: vec![nominal_voltage; n],
            current_a: vec![0.0; n],
            heat_w: vec![0.0; n],
        }
    }

    pub fn len(&self) -> usize {
        self.state_of_charge.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state_of_charge.is_empty()
    }
}

/// Trait for energy storage devices with path-dependent state.
///
/// State of charge cannot be posed as an algebraic residual; it is
/// integrated forward in time inside each converged segment iterate. The
/// caller owns the time loop and invokes `energy_calc` once per interval,
/// advancing row `time_index + 1` from row `time_index`.
pub trait EnergyStorage: Send + Sync {
    fn name(&self) -> &str;

    /// Advance storage state across one time interval of length `delta_t_s`.
    fn energy_calc(
        &self,
        module: &BatteryModule,
        state: &mut StorageState,
        time_index: usize,
        delta_t_s: f64,
    ) -> PhysicsResult<()>;
}
