//! Lifting surface definition.

use am_core::units::{sq_m, Area};

/// A lifting surface (main wing, horizontal tail, vertical tail).
///
/// Geometry is the planform summary a conceptual-design pass produces;
/// detailed sections and twist distributions are outside this crate.
#[derive(Clone, Debug)]
pub struct Wing {
    pub tag: String,
    /// Planform reference area
    pub reference_area: Area,
    /// Aspect ratio b²/S
    pub aspect_ratio: f64,
    /// Taper ratio tip/root
    pub taper: f64,
    /// Quarter-chord sweep [rad]
    pub sweep: f64,
    /// Average thickness-to-chord ratio
    pub thickness_to_chord: f64,
    /// Whether this surface is the vehicle's aerodynamic reference
    pub main_wing: bool,
}

impl Wing {
    pub fn new(tag: impl Into<String>, reference_area: Area, aspect_ratio: f64) -> Self {
        Self {
            tag: tag.into(),
            reference_area,
            aspect_ratio,
            taper: 1.0,
            sweep: 0.0,
            thickness_to_chord: 0.12,
            main_wing: false,
        }
    }

    /// Wing span b = sqrt(AR * S).
    pub fn span_m(&self) -> f64 {
        (self.aspect_ratio * self.reference_area.value).sqrt()
    }
}

impl Default for Wing {
    fn default() -> Self {
        Self::new("wing", sq_m(15.0), 8.0)
    }
}
