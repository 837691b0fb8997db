//! Damped Newton root finder with an evaluation budget.

use crate::error::SolverResult;
use crate::jacobian::finite_difference_jacobian;
use nalgebra::DVector;
use tracing::debug;

/// Newton solver configuration.
#[derive(Clone, Debug)]
pub struct NewtonConfig {
    /// Maximum Newton iterations
    pub max_iterations: usize,
    /// Maximum residual-function evaluations (Jacobian columns included)
    pub max_evaluations: usize,
    /// Absolute tolerance on the residual norm
    pub abs_tol: f64,
    /// Relative tolerance on the residual norm
    pub rel_tol: f64,
    /// Finite difference step size
    pub fd_step: f64,
    /// Line search backtracking factor
    pub line_search_beta: f64,
    /// Maximum line search iterations
    pub max_line_search_iters: usize,
}

impl Default for NewtonConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            max_evaluations: 10_000,
            abs_tol: 1e-8,
            rel_tol: 1e-8,
            fd_step: 1e-8,
            line_search_beta: 0.5,
            max_line_search_iters: 20,
        }
    }
}

/// Why the solve stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolveOutcome {
    /// Residual norm fell below tolerance
    Converged,
    /// Iteration count exhausted
    IterationBudget,
    /// Function evaluation budget exhausted
    EvaluationBudget,
    /// Line search stalled without residual reduction
    Stagnated,
    /// Jacobian factorization failed
    SingularJacobian,
}

impl SolveOutcome {
    pub fn converged(self) -> bool {
        self == SolveOutcome::Converged
    }
}

/// Structured solve result. Non-convergence is data, not an error: the
/// caller keeps `x` (the last evaluated point) and records the outcome.
#[derive(Clone, Debug)]
pub struct SolveReport {
    /// Solution (or last evaluated) vector
    pub x: DVector<f64>,
    /// Final residual norm
    pub residual_norm: f64,
    /// Newton iterations taken
    pub iterations: usize,
    /// Residual function evaluations consumed
    pub evaluations: usize,
    /// Why the solve stopped
    pub outcome: SolveOutcome,
}

impl SolveReport {
    pub fn converged(&self) -> bool {
        self.outcome.converged()
    }
}

/// Damped Newton iteration over a residual closure.
///
/// The closure is invoked for both line-search probes and finite-difference
/// Jacobian columns, all of which count against `max_evaluations`. Errors
/// from the closure abort the solve and propagate.
pub fn newton_solve<F>(
    x0: DVector<f64>,
    mut residual_fn: F,
    config: &NewtonConfig,
) -> SolverResult<SolveReport>
where
    F: FnMut(&DVector<f64>) -> SolverResult<DVector<f64>>,
{
    let mut evaluations = 0usize;
    let mut eval = |x: &DVector<f64>, count: &mut usize| -> SolverResult<DVector<f64>> {
        *count += 1;
        residual_fn(x)
    };

    let mut x = x0;
    let mut r = eval(&x, &mut evaluations)?;
    let mut r_norm = r.norm();
    let r0_norm = r_norm;

    for iter in 0..config.max_iterations {
        if r_norm < config.abs_tol || r_norm < config.rel_tol * r0_norm {
            debug!(iterations = iter, residual = r_norm, "newton converged");
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
            &r,
            &mut |p| eval(p, &mut evaluations),
            config.fd_step,
        )?;

        // Solve J * dx = -r
        let dx = match jac.lu().solve(&(-r.clone())) {
            Some(dx) => dx,
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

        // Backtracking line search on the residual norm
        let mut alpha = 1.0;
        let mut x_new = &x + alpha * &dx;
        let mut r_new = eval(&x_new, &mut evaluations)?;
        let mut r_new_norm = r_new.norm();

        for _ in 0..config.max_line_search_iters {
            if r_new_norm < r_norm {
                break;
            }
            alpha *= config.line_search_beta;
            x_new = &x + alpha * &dx;
            r_new = eval(&x_new, &mut evaluations)?;
            r_new_norm = r_new.norm();
        }

        x = x_new;
        r = r_new;
        r_norm = r_new_norm;

        debug!(
            iteration = iter,
            residual = r_norm,
            step_scale = alpha,
            "newton step"
        );

        if alpha < 1e-10 {
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

    #[test]
    fn simple_quadratic() {
        // Solve x^2 - 4 = 0 from x0 = 3
        let residual = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_element(1, x[0] * x[0] - 4.0))
        };

        let x0 = DVector::from_element(1, 3.0);
        let report = newton_solve(x0, residual, &NewtonConfig::default()).unwrap();

        assert!(report.converged());
        assert!((report.x[0] - 2.0).abs() < 1e-6);
    }

    #[test]
    fn coupled_system() {
        // x + y = 3, x*y = 2 → (1, 2) or (2, 1)
        let residual = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_vec(vec![
                x[0] + x[1] - 3.0,
                x[0] * x[1] - 2.0,
            ]))
        };

        let x0 = DVector::from_vec(vec![0.5, 2.5]);
        let report = newton_solve(x0, residual, &NewtonConfig::default()).unwrap();

        assert!(report.converged());
        assert!((report.x[0] * report.x[1] - 2.0).abs() < 1e-8);
        assert!((report.x[0] + report.x[1] - 3.0).abs() < 1e-8);
    }

    #[test]
    fn unsolvable_system_reports_budget_not_error() {
        // x^2 + 1 = 0 has no real root
        let residual = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_element(1, x[0] * x[0] + 1.0))
        };

        let config = NewtonConfig {
            max_iterations: 20,
            ..NewtonConfig::default()
        };
        let report = newton_solve(DVector::from_element(1, 1.0), residual, &config).unwrap();

        assert!(!report.converged());
        assert!(matches!(
            report.outcome,
            SolveOutcome::IterationBudget | SolveOutcome::Stagnated | SolveOutcome::SingularJacobian
        ));
    }

    #[test]
    fn evaluation_budget_is_respected() {
        let residual = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_element(1, (x[0] - 10.0).powi(3)))
        };

        let config = NewtonConfig {
            max_evaluations: 5,
            ..NewtonConfig::default()
        };
        let report = newton_solve(DVector::from_element(1, 0.0), residual, &config).unwrap();

        assert!(report.evaluations <= 6);
        if !report.converged() {
            assert_eq!(report.outcome, SolveOutcome::EvaluationBudget);
        }
    }

    #[test]
    fn residual_error_propagates() {
        let residual = |_x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Err(crate::SolverError::Residual {
                message: "physics blew up".into(),
            })
        };

        let err = newton_solve(
            DVector::from_element(1, 1.0),
            residual,
            &NewtonConfig::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("physics blew up"));
    }
}
