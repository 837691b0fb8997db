//! am-vehicle: vehicle composition for aeromission.
//!
//! A `Vehicle` is an aggregate of named components: wings, fuselages, and
//! energy networks (busses carrying battery modules, fuel cell stacks, and
//! propulsors). The vehicle is assembled through an in-memory composition
//! API, validated, then frozen by the weight design pre-pass before mission
//! evaluation. During a mission the vehicle is read-shared: only the cached
//! mass properties are written, and only once, by `design`.

pub mod error;
pub mod fuselage;
pub mod propulsion;
pub mod validate;
pub mod vehicle;
pub mod weights;
pub mod wing;

pub use error::{VehicleError, VehicleResult};
pub use fuselage::Fuselage;
pub use propulsion::{BatteryModule, Bus, FuelCellStack, Network, Propulsor};
pub use vehicle::{MassProperties, Vehicle};
pub use weights::{design, WeightBreakdown, WeightMethod};
pub use wing::Wing;
