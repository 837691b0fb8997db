//! Nonlinear solver machinery for mission segment convergence.
//!
//! This crate is domain-independent: it sees flat unknown vectors and a
//! residual closure, nothing else. The mission engine packs segment state
//! into the vector, hands the closure over, and unpacks the result.
//!
//! Two strategies share that plumbing:
//! - `newton_solve`: damped Newton with a finite-difference Jacobian and
//!   backtracking line search, for pure root-finding problems
//! - `optimize_solve`: bounded, penalized Gauss-Newton for problems with
//!   box bounds and inequality constraints (e.g. a lift-coefficient
//!   ceiling), standing in for an SQP-class constrained optimizer
//!
//! Budget exhaustion is a structured, non-converged result rather than an
//! error: the caller records the flag and keeps the last evaluated point.

pub mod error;
pub mod jacobian;
pub mod newton;
pub mod optimize;

pub use error::{SolverError, SolverResult};
pub use jacobian::{central_difference_jacobian, finite_difference_jacobian};
pub use newton::{newton_solve, NewtonConfig, SolveOutcome, SolveReport};
pub use optimize::{optimize_solve, Bounds, OptimizeConfig};
