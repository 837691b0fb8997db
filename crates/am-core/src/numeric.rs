use crate::CoreError;

/// Floating point type used throughout the toolkit
pub type Real = f64;

/// One tolerance for everything
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, CoreError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

/// Push `b` away from `a` when the two are degenerately close.
///
/// Rate and ratio calculations (e.g. an acceleration segment configured with
/// identical start and end speeds) divide by `b - a`; nudging the end point
/// keeps the solve off the singularity without surfacing an error.
pub fn nudge_apart(a: Real, b: Real, eps: Real) -> Real {
    if (b - a).abs() < eps {
        a + eps.copysign(if b >= a { 1.0 } else { -1.0 })
    } else {
        b
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearly_equal_basic() {
        let tol = Tolerances {
            abs: 1e-12,
            rel: 1e-9,
        };
        assert!(nearly_equal(1.0, 1.0 + 1e-12, tol));
        assert!(nearly_equal(0.0, 1e-13, tol));
        assert!(!nearly_equal(1.0, 1.0 + 1e-6, tol));
    }

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }

    #[test]
    fn nudge_apart_degenerate_pair() {
        let b = nudge_apart(40.0, 40.0, 1e-3);
        assert!(b > 40.0);
        // already-separated values pass through untouched
        assert_eq!(nudge_apart(40.0, 50.0, 1e-3), 50.0);
    }
}
