//! Bounded, penalized Gauss-Newton for constrained segment solves.
//!
//! Some segments carry inequality constraints (a lift-coefficient ceiling,
//! monotonic forward time) and box bounds on their unknowns. This driver
//! folds violated inequalities into an augmented least-squares residual and
//! takes Levenberg-damped Gauss-Newton steps projected onto the bounds. It
//! is the constrained-mode strategy behind the same interface as the Newton
//! root finder; an external SQP package could replace it without touching
//! the callers.

use crate::error::{SolverError, SolverResult};
use crate::jacobian::finite_difference_jacobian;
use crate::newton::{SolveOutcome, SolveReport};
use nalgebra::{DMatrix, DVector};
use tracing::debug;

/// Box bounds on the unknown vector.
#[derive(Clone, Debug)]
pub struct Bounds {
    pub lower: DVector<f64>,
    pub upper: DVector<f64>,
}

impl Bounds {
    pub fn new(lower: DVector<f64>, upper: DVector<f64>) -> SolverResult<Self> {
        if lower.len() != upper.len() {
            return Err(SolverError::ProblemSetup {
                what: "bounds length mismatch".into(),
            });
        }
        if lower.iter().zip(upper.iter()).any(|(lo, hi)| lo > hi) {
            return Err(SolverError::ProblemSetup {
                what: "lower bound above upper bound".into(),
            });
        }
        Ok(Self { lower, upper })
    }

    fn project(&self, x: &mut DVector<f64>) {
        for i in 0..x.len() {
            x[i] = x[i].clamp(self.lower[i], self.upper[i]);
        }
    }
}

/// Constrained solve configuration.
#[derive(Clone, Debug)]
pub struct OptimizeConfig {
    pub max_iterations: usize,
    pub max_evaluations: usize,
    /// Tolerance on the equality residual norm
    pub tolerance: f64,
    /// Allowed inequality violation at convergence
    pub constraint_tolerance: f64,
    /// Weight on violated inequality terms in the augmented residual
    pub penalty_weight: f64,
    /// Levenberg damping added to the Gauss-Newton normal equations
    pub damping: f64,
    pub fd_step: f64,
}

impl Default for OptimizeConfig {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            max_evaluations: 20_000,
            tolerance: 1e-8,
            constraint_tolerance: 1e-6,
            penalty_weight: 1e3,
            damping: 1e-8,
            fd_step: 1e-7,
        }
    }
}

/// Minimize ||r(x)||² subject to g(x) ≤ 0 and box bounds.
///
/// `residual_fn` supplies the equality residuals; `inequality_fn` (optional)
/// supplies constraint values, positive when violated. Both are evaluated
/// once per candidate vector. The report's `residual_norm` covers the
/// equality residuals only.
pub fn optimize_solve<F, G>(
    x0: DVector<f64>,
    mut residual_fn: F,
    mut inequality_fn: Option<G>,
    bounds: Option<&Bounds>,
    config: &OptimizeConfig,
) -> SolverResult<SolveReport>
where
    F: FnMut(&DVector<f64>) -> SolverResult<DVector<f64>>,
    G: FnMut(&DVector<f64>) -> SolverResult<DVector<f64>>,
{
    if let Some(b) = bounds {
        if b.lower.len() != x0.len() {
            return Err(SolverError::ProblemSetup {
                what: "bounds do not match unknown vector".into(),
            });
        }
    }

    let sqrt_w = config.penalty_weight.sqrt();
    let mut evaluations = 0usize;

    // Augmented residual: equality residuals stacked over penalized,
    // clamped inequality violations.
    let mut augmented = |x: &DVector<f64>,
                         count: &mut usize|
     -> SolverResult<(DVector<f64>, f64, f64)> {
        *count += 1;
        let r = residual_fn(x)?;
        let r_norm = r.norm();
        let (aug, violation) = match inequality_fn.as_mut() {
            Some(g_fn) => {
                let g = g_fn(x)?;
                let mut worst: f64 = 0.0;
                let mut stacked = DVector::zeros(r.len() + g.len());
                stacked.rows_mut(0, r.len()).copy_from(&r);
                for (i, &gi) in g.iter().enumerate() {
                    worst = worst.max(gi);
                    stacked[r.len() + i] = sqrt_w * gi.max(0.0);
                }
                (stacked, worst)
            }
            None => (r, 0.0),
        };
        Ok((aug, r_norm, violation))
    };

    let mut x = x0;
    if let Some(b) = bounds {
        b.project(&mut x);
    }

    let (mut r_aug, mut r_norm, mut violation) = augmented(&x, &mut evaluations)?;
    let mut aug_norm = r_aug.norm();

    for iter in 0..config.max_iterations {
        if r_norm < config.tolerance && violation <= config.constraint_tolerance {
            debug!(iterations = iter, residual = r_norm, "optimizer converged");
            return Ok(SolveReport {
                x,
                residual_norm: r_norm,
                iterations: iter,
                evaluations,
                outcome: SolveOutcome::Converged,
            });
        }

        if evaluations + x.len() > config.max_evaluations {
            return Ok(SolveReport {
                x,
                residual_norm: r_norm,
                iterations: iter,
                evaluations,
                outcome: SolveOutcome::EvaluationBudget,
            });
        }

        let jac = finite_difference_jacobian(
            &x,
            &r_aug,
            &mut |p| augmented(p, &mut evaluations).map(|(aug, _, _)| aug),
            config.fd_step,
        )?;

        // Levenberg-damped normal equations: (JᵀJ + λI) dx = -Jᵀ r
        let jtj = jac.transpose() * &jac;
        let n = x.len();
        let damped = jtj + DMatrix::identity(n, n) * config.damping;
        let rhs = -(jac.transpose() * &r_aug);
        let dx = match damped.cholesky() {
            Some(chol) => chol.solve(&rhs),
            None => {
                return Ok(SolveReport {
                    x,
                    residual_norm: r_norm,
                    iterations: iter,
                    evaluations,
                    outcome: SolveOutcome::SingularJacobian,
                });
            }
        };

        // Backtracking on the augmented norm, projecting every candidate
        let mut alpha = 1.0;
        let mut accepted = false;
        for _ in 0..25 {
            let mut x_new = &x + alpha * &dx;
            if let Some(b) = bounds {
                b.project(&mut x_new);
            }
            let (r_aug_new, r_norm_new, violation_new) = augmented(&x_new, &mut evaluations)?;
            let aug_norm_new = r_aug_new.norm();
            if aug_norm_new < aug_norm {
                x = x_new;
                r_aug = r_aug_new;
                r_norm = r_norm_new;
                violation = violation_new;
                aug_norm = aug_norm_new;
                accepted = true;
                break;
            }
            alpha *= 0.5;
        }

        debug!(
            iteration = iter,
            residual = r_norm,
            violation,
            accepted,
            "optimizer step"
        );

        if !accepted {
            return Ok(SolveReport {
                x,
                residual_norm: r_norm,
                iterations: iter + 1,
                evaluations,
                outcome: SolveOutcome::Stagnated,
            });
        }
    }

    Ok(SolveReport {
        x,
        residual_norm: r_norm,
        iterations: config.max_iterations,
        evaluations,
        outcome: SolveOutcome::IterationBudget,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    type NoConstraint = fn(&DVector<f64>) -> SolverResult<DVector<f64>>;

    #[test]
    fn unconstrained_root() {
        // Same quadratic the Newton path solves
        let residual = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_element(1, x[0] * x[0] - 4.0))
        };

        let report = optimize_solve(
            DVector::from_element(1, 3.0),
            residual,
            None::<NoConstraint>,
            None,
            &OptimizeConfig::default(),
        )
        .unwrap();

        assert!(report.converged());
        assert!((report.x[0] - 2.0).abs() < 1e-5);
    }

    #[test]
    fn bounds_are_respected() {
        // Root at x = 2 but the box stops at 1.5; the solve must stay inside
        let residual = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_element(1, x[0] * x[0] - 4.0))
        };
        let bounds = Bounds::new(
            DVector::from_element(1, 0.0),
            DVector::from_element(1, 1.5),
        )
        .unwrap();

        let report = optimize_solve(
            DVector::from_element(1, 1.0),
            residual,
            None::<NoConstraint>,
            Some(&bounds),
            &OptimizeConfig {
                max_iterations: 50,
                ..OptimizeConfig::default()
            },
        )
        .unwrap();

        assert!(report.x[0] <= 1.5 + 1e-12);
        assert!(!report.converged());
    }

    #[test]
    fn inequality_constraint_shifts_solution() {
        // Minimize (x-3)² with x ≤ 1 expressed as g(x) = x - 1 ≤ 0
        let residual = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_element(1, x[0] - 3.0))
        };
        let inequality = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_element(1, x[0] - 1.0))
        };

        let report = optimize_solve(
            DVector::from_element(1, 0.0),
            residual,
            Some(inequality),
            None,
            &OptimizeConfig {
                max_iterations: 300,
                ..OptimizeConfig::default()
            },
        )
        .unwrap();

        // Penalty holds the solution near the constraint boundary
        assert!(report.x[0] < 1.01, "x = {}", report.x[0]);
    }

    #[test]
    fn bad_bounds_rejected() {
        let err = Bounds::new(
            DVector::from_element(2, 1.0),
            DVector::from_element(2, 0.0),
        )
        .unwrap_err();
        assert!(matches!(err, SolverError::ProblemSetup { .. }));
    }
}
