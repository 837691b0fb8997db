//! Per-segment solve driver: packs unknowns, drives the iterate pipeline
//! through a nonlinear solver, and records the outcome.

use crate::error::{MissionError, MissionResult};
use crate::segment::{Segment, SegmentPhase};
use crate::state::paths;
use am_solver::{
    newton_solve, optimize_solve, Bounds, NewtonConfig, OptimizeConfig, SolveReport, SolverError,
    SolverResult,
};
use nalgebra::DVector;
use std::cell::RefCell;
use tracing::{info, warn};

/// Which nonlinear strategy converges a segment.
///
/// The concrete algorithm is pluggable behind this one seam: segments with
/// pure equality residuals default to the Newton root finder; segments with
/// inequality constraints or bounds select the constrained optimizer. The
/// numerics block's tolerance, evaluation budget, and step size override
/// the corresponding config fields either way.
#[derive(Clone, Debug)]
pub enum SolverStrategy {
    RootFinder(NewtonConfig),
    Optimize(OptimizeSettings),
}

impl Default for SolverStrategy {
    fn default() -> Self {
        SolverStrategy::RootFinder(NewtonConfig::default())
    }
}

/// Constrained-mode settings: box bounds per control family plus the
/// problem-specific inequality constraints.
#[derive(Clone, Debug)]
pub struct OptimizeSettings {
    pub config: OptimizeConfig,
    /// Throttle bounds (transient margin above 1 allowed)
    pub throttle_limits: (f64, f64),
    /// Attitude angle bounds [rad]
    pub angle_limits_rad: (f64, f64),
    pub velocity_limits_mps: (f64, f64),
    pub altitude_limits_m: (f64, f64),
    /// Structural lift-coefficient ceiling, enforced as CL − limit ≤ 0
    pub lift_coefficient_limit: Option<f64>,
}

impl Default for OptimizeSettings {
    fn default() -> Self {
        Self {
            config: OptimizeConfig::default(),
            throttle_limits: (0.0, 1.2),
            angle_limits_rad: (-0.6, 0.6),
            velocity_limits_mps: (1.0, 500.0),
            altitude_limits_m: (0.0, 25_000.0),
            lift_coefficient_limit: None,
        }
    }
}

/// One residual evaluation: unpack the candidate vector, run the iterate
/// pipeline, pack the residuals. Mission errors surface as solver errors
/// and abort the solve (they are configuration/physics faults, not
/// non-convergence).
fn residual_eval(segment: &mut Segment, x: &DVector<f64>) -> SolverResult<DVector<f64>> {
    segment
        .state
        .unknowns
        .unpack(x)
        .map_err(|e| SolverError::Residual {
            message: e.to_string(),
        })?;
    segment.run_iterate().map_err(|e| SolverError::Residual {
        message: e.to_string(),
    })?;
    Ok(segment.state.residuals.pack())
}

/// Inequality constraints evaluated at the current state: positive entries
/// are violations. Covers the lift ceiling and monotonic forward time.
fn inequality_eval(
    segment: &Segment,
    settings: &OptimizeSettings,
) -> SolverResult<DVector<f64>> {
    let mut g = Vec::new();

    if let Some(limit) = settings.lift_coefficient_limit {
        let cl = segment
            .state
            .conditions
            .column(paths::LIFT_COEFFICIENT, 0)
            .map_err(|e| SolverError::Residual {
                message: e.to_string(),
            })?;
        for value in cl {
            g.push(value - limit);
        }
    }

    let time = segment
        .state
        .conditions
        .column(paths::TIME, 0)
        .map_err(|e| SolverError::Residual {
            message: e.to_string(),
        })?;
    for pair in time.windows(2) {
        g.push(pair[0] - pair[1]);
    }

    Ok(DVector::from_vec(g))
}

/// Box bounds matching the unknown vector's pack layout, assigned by
/// control family.
fn build_bounds(segment: &Segment, settings: &OptimizeSettings) -> MissionResult<Bounds> {
    let mut lower = Vec::new();
    let mut upper = Vec::new();

    for (name, rows, cols) in segment.state.unknowns.leaves() {
        let (lo, hi) = if name.starts_with("throttle") {
            settings.throttle_limits
        } else if name == "body_angle" || name == "bank_angle" || name == "wind_angle" {
            settings.angle_limits_rad
        } else if name == "velocity" {
            settings.velocity_limits_mps
        } else if name == "altitude" {
            settings.altitude_limits_m
        } else {
            (f64::NEG_INFINITY, f64::INFINITY)
        };
        for _ in 0..rows * cols {
            lower.push(lo);
            upper.push(hi);
        }
    }

    Bounds::new(DVector::from_vec(lower), DVector::from_vec(upper))
        .map_err(MissionError::Solver)
}

fn converge_root(segment: &mut Segment, base: &NewtonConfig) -> MissionResult<SolveReport> {
    let config = NewtonConfig {
        abs_tol: segment.state.numerics.tolerance_solution,
        max_evaluations: segment.state.numerics.max_evaluations,
        fd_step: segment.state.numerics.step_size,
        ..base.clone()
    };
    let x0 = segment.state.unknowns.pack();
    let report = newton_solve(x0, |x| residual_eval(segment, x), &config)?;
    Ok(report)
}

fn converge_optimize(
    segment: &mut Segment,
    settings: &OptimizeSettings,
) -> MissionResult<SolveReport> {
    let config = OptimizeConfig {
        tolerance: segment.state.numerics.tolerance_solution,
        max_evaluations: segment.state.numerics.max_evaluations,
        fd_step: segment.state.numerics.step_size,
        ..settings.config.clone()
    };
    let bounds = build_bounds(segment, settings)?;
    let x0 = segment.state.unknowns.pack();

    // Both closures need the segment; the solver calls them strictly in
    // sequence, so a RefCell hands the borrow back and forth.
    let cell = RefCell::new(segment);
    let report = optimize_solve(
        x0,
        |x| residual_eval(&mut **cell.borrow_mut(), x),
        Some(|_x: &DVector<f64>| inequality_eval(&**cell.borrow(), settings)),
        Some(&bounds),
        &config,
    )?;
    Ok(report)
}

/// The converge stage: drive the residuals to zero with the segment's
/// selected strategy, leave the state at the last evaluated point, and
/// record the outcome. Budget exhaustion is a flagged result, never an
/// error; downstream segments still run.
pub fn converge(segment: &mut Segment) -> MissionResult<()> {
    if segment.state.unknowns.element_count() == 0 {
        // nothing to solve; a single pass establishes the conditions
        segment.run_iterate()?;
        segment.state.numerics.converged = Some(true);
        segment.converged = true;
        segment.phase = SegmentPhase::Converged;
        return Ok(());
    }

    let strategy = segment.solver.clone();
    let report = match strategy {
        SolverStrategy::RootFinder(base) => converge_root(segment, &base)?,
        SolverStrategy::Optimize(settings) => converge_optimize(segment, &settings)?,
    };

    // leave the state exactly at the reported point
    segment.state.unknowns.unpack(&report.x)?;
    segment.run_iterate()?;

    let converged = report.converged();
    segment.state.numerics.converged = Some(converged);
    segment.converged = converged;
    segment.residual_norm = Some(report.residual_norm);
    segment.phase = if converged {
        SegmentPhase::Converged
    } else {
        SegmentPhase::Failed
    };

    if converged {
        info!(
            segment = %segment.tag,
            iterations = report.iterations,
            evaluations = report.evaluations,
            residual = report.residual_norm,
            "segment converged"
        );
    } else {
        warn!(
            segment = %segment.tag,
            outcome = ?report.outcome,
            iterations = report.iterations,
            evaluations = report.evaluations,
            residual = report.residual_norm,
            "segment did not converge"
        );
    }
    Ok(())
}
