//! am-physics: external physics collaborators for the mission engine.
//!
//! Provides the evaluator traits the mission core calls through narrow
//! interfaces, plus reference implementations:
//! - `AeroModel`: lift/drag/moment coefficients from flight state
//!   (`PolarAero`: stall-limited linear lift slope + parabolic drag polar)
//! - `PropulsionModel`: per-propulsor thrust/moment/power with an explicit
//!   memoization cache for declared-identical propulsors (`ElectricRotor`)
//! - `EnergyStorage`: path-dependent storage state advanced one control
//!   point at a time (`LithiumIonPack`), plus a PEM fuel cell with a bounded
//!   inner voltage-current iteration (`PemFuelCell`)
//!
//! All implementations are deterministic functions of state and parameters.
//! Physics-correlation fidelity is deliberately conceptual-design level; the
//! traits are the contract the engine relies on.

pub mod aerodynamics;
pub mod battery;
pub mod cache;
pub mod error;
pub mod fuel_cell;
pub mod propulsion;
pub mod traits;

pub use aerodynamics::PolarAero;
pub use battery::LithiumIonPack;
pub use cache::PerformanceCache;
pub use error::{PhysicsError, PhysicsResult};
pub use fuel_cell::{FuelCellOperatingPoint, PemFuelCell};
pub use propulsion::ElectricRotor;
pub use traits::{
    AeroCoefficients, AeroModel, AeroState, EnergyStorage, PropulsionModel, PropulsorOperatingState,
    PropulsorPerformance, StorageState,
};
