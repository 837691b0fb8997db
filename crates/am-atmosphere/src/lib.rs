//! am-atmosphere: atmospheric property models for aeromission.
//!
//! Provides:
//! - `AtmosphereModel` trait for freestream property lookups
//! - US Standard Atmosphere 1976 implementation
//!
//! # Architecture
//!
//! This crate defines a stable API (`AtmosphereModel` trait) that isolates the
//! mission engine from any particular atmosphere formulation. The US Standard
//! 1976 layer model is the primary implementation; the trait allows future
//! additions (e.g. constant-property test atmospheres, planetary models).
//!
//! # Example
//!
//! ```
//! use am_atmosphere::{AtmosphereModel, UsStandard1976};
//!
//! let atmo = UsStandard1976::new();
//! let data = atmo.compute_values(&[0.0, 1524.0], 0.0).unwrap();
//! assert!((data.pressure[0] - 101_325.0).abs() < 1.0);
//! ```

pub mod error;
pub mod model;
pub mod us_standard_1976;

pub use error::{AtmoError, AtmoResult};
pub use model::{AtmosphereData, AtmosphereModel};
pub use us_standard_1976::UsStandard1976;
