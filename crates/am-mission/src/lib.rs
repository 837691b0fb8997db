//! am-mission: the mission segment evaluation engine.
//!
//! Given a designed vehicle and an ordered sequence of flight segments,
//! this crate finds the self-consistent flight state at each discretized
//! control point by driving nonlinear residual equations (force and moment
//! balance) to zero against the vehicle's aerodynamic, propulsion, and
//! energy models.
//!
//! # Architecture
//!
//! - `conditions`/`state`: named N-row state containers with pack/unpack
//! - `numerics`: Chebyshev pseudospectral differentiate/integrate operators
//! - `process`/`steps`: per-segment pipelines of swappable named steps
//! - `driver`: packs unknowns and drives the iterate pipeline through a
//!   Newton root finder or a bounded constrained optimizer
//! - `segments`: concrete cruise/climb/descent segment types
//! - `sequencer`: chains segments, final state of one seeding the next
//!
//! Physics lives behind the evaluator traits in `am-physics`; this crate
//! never computes a lift coefficient itself.

pub mod conditions;
pub mod controls;
pub mod driver;
pub mod error;
pub mod numerics;
pub mod process;
pub mod results;
pub mod segment;
pub mod segments;
pub mod sequencer;
pub mod state;
pub mod steps;

pub use conditions::{Conditions, Node};
pub use controls::{AssignedControlVariables, FlightDynamics, ScalarControl, ThrottleControl};
pub use driver::{OptimizeSettings, SolverStrategy};
pub use error::{MissionError, MissionResult};
pub use numerics::{chebyshev_data, Numerics, Operators};
pub use process::{Process, StageList, Step};
pub use results::{MissionResults, SegmentOutcome};
pub use segment::{Analyses, Segment, SegmentPhase};
pub use sequencer::Mission;
pub use state::{build_base_conditions, paths, State};
