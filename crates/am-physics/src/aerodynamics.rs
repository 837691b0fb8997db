//! Parabolic drag polar aerodynamics.

use crate::error::{PhysicsError, PhysicsResult};
use crate::traits::{AeroCoefficients, AeroModel, AeroState};

/// Stall-limited linear lift slope with a parabolic drag polar.
///
/// CL = CL0 + CLα·α (clamped at ±CLmax), CD = CD0 + k·CL², both corrected
/// for compressibility with Prandtl-Glauert below the divergence clamp.
/// Stands in for panel or vortex-lattice evaluators behind the same trait.
#[derive(Clone, Debug)]
pub struct PolarAero {
    /// Zero-alpha lift coefficient
    pub cl0: f64,
    /// Lift-curve slope [1/rad]
    pub cl_alpha: f64,
    /// Stall clamp on |CL|
    pub cl_max: f64,
    /// Zero-lift drag coefficient
    pub cd0: f64,
    /// Induced drag factor k = 1/(π·AR·e)
    pub induced_factor: f64,
    /// Zero-alpha pitching moment coefficient
    pub cm0: f64,
    /// Pitching moment slope [1/rad]
    pub cm_alpha: f64,
}

impl PolarAero {
    /// Build a polar from wing aspect ratio and an Oswald factor.
    pub fn new(cl0: f64, cl_alpha: f64, cd0: f64, aspect_ratio: f64, oswald: f64) -> Self {
        Self {
            cl0,
            cl_alpha,
            cl_max: 1.5,
            cd0,
            induced_factor: 1.0 / (std::f64::consts::PI * aspect_ratio * oswald),
            cm0: 0.0,
            cm_alpha: -0.5,
        }
    }
}

impl Default for PolarAero {
    fn default() -> Self {
        Self::new(0.25, 5.7, 0.025, 8.0, 0.8)
    }
}

/// Prandtl-Glauert compressibility factor, clamped short of divergence.
fn compressibility(mach: f64) -> f64 {
    let m = mach.clamp(0.0, 0.95);
    1.0 / (1.0 - m * m).sqrt()
}

impl AeroModel for PolarAero {
    fn name(&self) -> &str {
        "parabolic drag polar"
    }

    fn evaluate(&self, state: &AeroState<'_>) -> PhysicsResult<AeroCoefficients> {
        let n = state.angle_of_attack.len();
        if state.mach.len() != n {
            return Err(PhysicsError::LengthMismatch {
                what: "aero state mach",
                expected: n,
                got: state.mach.len(),
            });
        }

        let mut coeffs = AeroCoefficients {
            lift: Vec::with_capacity(n),
            drag: Vec::with_capacity(n),
            pitching_moment: Vec::with_capacity(n),
        };

        for i in 0..n {
            let alpha = state.angle_of_attack[i];
            if !alpha.is_finite() {
                return Err(PhysicsError::NonPhysical {
                    what: "angle of attack",
                });
            }
            let beta = compressibility(state.mach[i]);

            let cl_linear = (self.cl0 + self.cl_alpha * alpha) * beta;
            let cl = cl_linear.clamp(-self.cl_max, self.cl_max);
            let cd = self.cd0 + self.induced_factor * cl * cl;
            let cm = self.cm0 + self.cm_alpha * alpha;

            coeffs.lift.push(cl);
            coeffs.drag.push(cd);
            coeffs.pitching_moment.push(cm);
        }

        Ok(coeffs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lift_grows_with_alpha_until_stall() {
        let aero = PolarAero::default();
        let alpha = [0.0, 0.05, 0.10, 0.5];
        let mach = [0.12; 4];
        let coeffs = aero.evaluate(&AeroState {
            angle_of_attack: &alpha,
            mach: &mach,
        })
        .unwrap();

        assert!(coeffs.lift[1] > coeffs.lift[0]);
        assert!(coeffs.lift[2] > coeffs.lift[1]);
        // deep stall clamps at cl_max
        assert!((coeffs.lift[3] - aero.cl_max).abs() < 1e-12);
    }

    #[test]
    fn drag_is_polar_in_lift() {
        let aero = PolarAero::default();
        let alpha = [0.03];
        let mach = [0.1];
        let coeffs = aero.evaluate(&AeroState {
            angle_of_attack: &alpha,
            mach: &mach,
        })
        .unwrap();

        let expected = aero.cd0 + aero.induced_factor * coeffs.lift[0].powi(2);
        assert!((coeffs.drag[0] - expected).abs() < 1e-12);
    }

    #[test]
    fn mismatched_lengths_rejected() {
        let aero = PolarAero::default();
        let err = aero
            .evaluate(&AeroState {
                angle_of_attack: &[0.0, 0.1],
                mach: &[0.2],
            })
            .unwrap_err();
        assert!(matches!(err, PhysicsError::LengthMismatch { .. }));
    }
}
