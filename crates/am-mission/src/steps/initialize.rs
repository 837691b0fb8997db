//! Initialize-stage steps, run once per segment before the solve.

use crate::controls::register_residuals;
use crate::driver::SolverStrategy;
use crate::error::{MissionError, MissionResult};
use crate::segment::Segment;

/// Expand every state array to the configured control point count.
pub fn expand_state(segment: &mut Segment) -> MissionResult<()> {
    let n = segment.state.numerics.number_of_control_points;
    if n < 2 {
        return Err(MissionError::config(format!(
            "segment '{}': needs at least 2 control points, got {n}",
            segment.tag
        )));
    }
    segment.state.expand_rows(n);
    Ok(())
}

/// Build the dimensionless pseudospectral operators.
pub fn differentials(segment: &mut Segment) -> MissionResult<()> {
    segment.state.numerics.build()
}

/// Register solver unknowns and residual equations from the segment's
/// control variables and flight-dynamics flags, and check the system is
/// square for root finding.
pub fn solver_surface(segment: &mut Segment) -> MissionResult<()> {
    let n = segment.state.numerics.number_of_control_points;
    let controls = segment.controls.clone();
    controls.register_unknowns(n, &mut segment.state.unknowns)?;
    register_residuals(&segment.flight_dynamics, n, &mut segment.state.residuals)?;

    let unknowns = segment.state.unknowns.element_count();
    let residuals = segment.state.residuals.element_count();
    if unknowns > 0
        && matches!(segment.solver, SolverStrategy::RootFinder(_))
        && unknowns != residuals
    {
        return Err(MissionError::config(format!(
            "segment '{}': {unknowns} unknowns vs {residuals} residual equations",
            segment.tag
        )));
    }
    Ok(())
}
