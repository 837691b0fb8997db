//! Fuselage definition.

use am_core::units::{m, Length};

/// A fuselage body.
#[derive(Clone, Debug)]
pub struct Fuselage {
    pub tag: String,
    pub length: Length,
    pub width: Length,
    pub height: Length,
    /// Number of passenger seats (drives cabin weight correlations)
    pub seats: u32,
}

impl Fuselage {
    pub fn new(tag: impl Into<String>, length: Length, width: Length, height: Length) -> Self {
        Self {
            tag: tag.into(),
            length,
            width,
            height,
            seats: 0,
        }
    }

    /// Approximate wetted area treating the body as a tapered cylinder.
    pub fn wetted_area_m2(&self) -> f64 {
        let d = 0.5 * (self.width.value + self.height.value);
        std::f64::consts::PI * d * self.length.value * 0.8
    }
}

impl Default for Fuselage {
    fn default() -> Self {
        Self::new("fuselage", m(8.0), m(1.4), m(1.5))
    }
}
