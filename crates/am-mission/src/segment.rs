//! Mission segment: one phase of flight.

use crate::controls::{AssignedControlVariables, FlightDynamics};
use crate::driver::{self, SolverStrategy};
use crate::error::{MissionError, MissionResult};
use crate::process::{Process, StageList, Step};
use crate::state::State;
use crate::steps;
use am_atmosphere::AtmosphereModel;
use am_physics::{AeroModel, EnergyStorage, PropulsionModel};
use am_vehicle::Vehicle;
use std::sync::Arc;
use tracing::info;

/// Evaluator handles a segment consumes through narrow interfaces.
///
/// The vehicle is read-shared across every segment of a mission; each
/// segment's state is exclusively its own.
#[derive(Clone)]
pub struct Analyses {
    pub vehicle: Arc<Vehicle>,
    pub atmosphere: Arc<dyn AtmosphereModel>,
    pub aerodynamics: Arc<dyn AeroModel>,
    pub propulsion: Arc<dyn PropulsionModel>,
    pub energy_storage: Arc<dyn EnergyStorage>,
}

/// Segment lifecycle.
///
/// `Finalized` is the successful terminal state; `Failed` (solver budget
/// exhausted) is terminal for the solve but still post-processed so partial
/// results stay inspectable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SegmentPhase {
    Created,
    Initialized,
    Iterating,
    Converged,
    Failed,
    Finalized,
}

/// One phase of flight with its own boundary conditions and unknowns.
pub struct Segment {
    pub tag: String,
    pub analyses: Analyses,
    pub state: State,
    pub process: Process,
    pub phase: SegmentPhase,
    pub converged: bool,
    /// Final residual norm from the last solve, if one ran
    pub residual_norm: Option<f64>,

    pub flight_dynamics: FlightDynamics,
    pub controls: AssignedControlVariables,
    pub solver: SolverStrategy,

    // Boundary conditions. `None` inherits from the predecessor segment's
    // final state; a missing value with no predecessor is a configuration
    // error raised at initialize time. SI base units throughout.
    pub altitude_m: Option<f64>,
    pub altitude_start_m: Option<f64>,
    pub altitude_end_m: Option<f64>,
    pub air_speed_mps: Option<f64>,
    pub air_speed_end_mps: Option<f64>,
    pub distance_m: Option<f64>,
    pub acceleration_mps2: Option<f64>,
    pub climb_rate_mps: Option<f64>,
    pub climb_angle_rad: Option<f64>,
    pub descent_rate_mps: Option<f64>,

    pub temperature_deviation_k: f64,
    pub sideslip_angle_rad: f64,
    pub initial_battery_state_of_charge: f64,
}

impl Segment {
    /// Base evaluate-style segment with the shared pipeline installed.
    ///
    /// Segment-type constructors replace `initialize.conditions` with their
    /// own boundary-condition physics and activate the controls relevant to
    /// them; everything else is common machinery.
    pub fn new(tag: impl Into<String>, analyses: Analyses) -> MissionResult<Self> {
        let state = State::new(analyses.vehicle.as_ref())?;

        let mut initialize = StageList::new();
        initialize.append("expand_state", Arc::new(steps::initialize::expand_state) as Step);
        initialize.append(
            "differentials",
            Arc::new(steps::initialize::differentials) as Step,
        );
        initialize.append(
            "solver_surface",
            Arc::new(steps::initialize::solver_surface) as Step,
        );
        // segment types install their boundary conditions under this name
        initialize.append("conditions", Arc::new(|_: &mut Segment| Ok(())) as Step);

        let mut iterate = StageList::new();
        iterate.append("initials", Arc::new(steps::iterate::initials) as Step);
        iterate.append("unknowns", Arc::new(steps::iterate::unpack_unknowns) as Step);
        iterate.append(
            "differentials",
            Arc::new(steps::iterate::update_differentials_time) as Step,
        );
        iterate.append("atmosphere", Arc::new(steps::iterate::update_atmosphere) as Step);
        iterate.append("freestream", Arc::new(steps::iterate::update_freestream) as Step);
        iterate.append(
            "orientations",
            Arc::new(steps::iterate::update_orientations) as Step,
        );
        iterate.append(
            "aerodynamics",
            Arc::new(steps::iterate::update_aerodynamics) as Step,
        );
        iterate.append("energy", Arc::new(steps::iterate::update_energy) as Step);
        iterate.append("weights", Arc::new(steps::iterate::update_weights) as Step);
        iterate.append("forces", Arc::new(steps::iterate::update_forces) as Step);
        iterate.append("moments", Arc::new(steps::iterate::update_moments) as Step);
        iterate.append(
            "acceleration",
            Arc::new(steps::iterate::update_acceleration) as Step,
        );
        iterate.append("residuals", Arc::new(steps::iterate::update_residuals) as Step);

        let mut post_process = StageList::new();
        post_process.append(
            "inertial_position",
            Arc::new(steps::post::integrate_inertial_position) as Step,
        );
        post_process.append("energy_totals", Arc::new(steps::post::energy_totals) as Step);

        Ok(Self {
            tag: tag.into(),
            analyses,
            state,
            process: Process {
                initialize,
                converge: Arc::new(driver::converge) as Step,
                iterate,
                post_process,
            },
            phase: SegmentPhase::Created,
            converged: false,
            residual_norm: None,
            flight_dynamics: FlightDynamics::default(),
            controls: AssignedControlVariables::default(),
            solver: SolverStrategy::default(),
            altitude_m: None,
            altitude_start_m: None,
            altitude_end_m: None,
            air_speed_mps: None,
            air_speed_end_mps: None,
            distance_m: None,
            acceleration_mps2: None,
            climb_rate_mps: None,
            climb_angle_rad: None,
            descent_rate_mps: None,
            temperature_deviation_k: 0.0,
            sideslip_angle_rad: 0.0,
            initial_battery_state_of_charge: 1.0,
        })
    }

    /// Number of control points N.
    pub fn control_points(&self) -> usize {
        self.state.numerics.number_of_control_points
    }

    /// Run one named stage list against this segment.
    fn run_stages(&mut self, steps: Vec<Step>) -> MissionResult<()> {
        for step in steps {
            step(self)?;
        }
        Ok(())
    }

    /// Run the iterate pipeline once (one residual evaluation).
    pub fn run_iterate(&mut self) -> MissionResult<()> {
        let steps = self.process.iterate.snapshot();
        self.run_stages(steps)
    }

    /// Full pipeline: initialize once, converge, post-process.
    ///
    /// Solver failure is recorded on the segment (phase `Failed`,
    /// `converged == false`) and is not an error; post-processing still
    /// runs so the last evaluated state remains inspectable.
    pub fn evaluate(&mut self) -> MissionResult<()> {
        if self.phase == SegmentPhase::Created {
            let steps = self.process.initialize.snapshot();
            self.run_stages(steps)?;
            self.phase = SegmentPhase::Initialized;
        }

        info!(segment = %self.tag, n = self.control_points(), "segment solve start");
        self.phase = SegmentPhase::Iterating;
        let converge = self.process.converge.clone();
        converge(self)?;

        let steps = self.process.post_process.snapshot();
        self.run_stages(steps)?;

        if self.converged {
            self.phase = SegmentPhase::Finalized;
        }
        info!(
            segment = %self.tag,
            converged = self.converged,
            "segment solve finished"
        );
        Ok(())
    }

    /// Resolve an optional boundary value against the predecessor's final
    /// state; fail fast when neither is available.
    pub fn inherit_or(
        &self,
        own: Option<f64>,
        from_initials: impl Fn(&State) -> MissionResult<f64>,
        what: &str,
    ) -> MissionResult<f64> {
        if let Some(value) = own {
            return Ok(value);
        }
        match self.state.initials.as_deref() {
            Some(initials) => from_initials(initials),
            None => Err(MissionError::config(format!(
                "segment '{}': {} not set and no predecessor to inherit from",
                self.tag, what
            ))),
        }
    }
}

impl std::fmt::Debug for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Segment")
            .field("tag", &self.tag)
            .field("phase", &self.phase)
            .field("converged", &self.converged)
            .finish()
    }
}
