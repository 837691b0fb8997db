//! Integration test: non-convergence is reported, never silent, and never
//! fatal to the rest of the mission.

mod common;

use am_core::units::{m, mps};
use am_mission::{segments, Mission, SegmentPhase};

/// Segment 1 flies an airframe whose propulsors produce no thrust, so the
/// force balance is unsatisfiable; segment 2 is well-posed. The mission
/// must finish with a full result set and a per-segment convergence record.
#[test]
fn failed_segment_is_flagged_and_mission_continues() {
    let mut dead_stick = segments::cruise::constant_speed_constant_altitude(
        "dead_stick",
        common::analyses_for(common::powerless_testbed()),
        Some(m(1500.0)),
        Some(mps(40.0)),
        m(2000.0),
    )
    .unwrap();
    dead_stick.state.numerics.number_of_control_points = 8;
    // keep the doomed solve short
    dead_stick.state.numerics.max_evaluations = 600;

    let mut recovery = segments::cruise::constant_speed_constant_altitude(
        "recovery_cruise",
        common::testbed_analyses(),
        Some(m(1500.0)),
        Some(mps(40.0)),
        m(2000.0),
    )
    .unwrap();
    recovery.state.numerics.number_of_control_points = 8;

    let mut mission = Mission::new("partial_failure");
    mission.append_segment(dead_stick);
    mission.append_segment(recovery);

    let results = mission.evaluate().unwrap();

    assert_eq!(results.segments.len(), 2, "every segment must be reported");
    assert!(!results.all_converged());

    let failed = results.segment("dead_stick").unwrap();
    assert!(!failed.converged);
    assert_eq!(failed.phase, SegmentPhase::Failed);
    let residual = failed.residual_norm.unwrap();
    assert!(residual > 1e-6, "failure must leave a nonzero residual");

    let recovered = results.segment("recovery_cruise").unwrap();
    assert!(recovered.converged, "downstream segment must still solve");
    assert_eq!(recovered.phase, SegmentPhase::Finalized);
}

/// The failed segment's state stays at its last evaluated point so partial
/// results remain inspectable.
#[test]
fn failed_segment_state_remains_inspectable() {
    let mut dead_stick = segments::cruise::constant_speed_constant_altitude(
        "dead_stick",
        common::analyses_for(common::powerless_testbed()),
        Some(m(1500.0)),
        Some(mps(40.0)),
        m(2000.0),
    )
    .unwrap();
    dead_stick.state.numerics.number_of_control_points = 8;
    dead_stick.state.numerics.max_evaluations = 600;

    let mut mission = Mission::new("inspectable_failure");
    mission.append_segment(dead_stick);
    let results = mission.evaluate().unwrap();

    let outcome = results.segment("dead_stick").unwrap();
    assert!(!outcome.converged);
    let drag = outcome
        .conditions
        .column(am_mission::paths::DRAG_COEFFICIENT, 0)
        .unwrap();
    for cd in drag {
        assert!(cd.is_finite() && cd > 0.0);
    }
    let thrust = outcome
        .conditions
        .column(am_mission::paths::THRUST_FORCE, 0)
        .unwrap();
    for t in thrust {
        assert_eq!(t, 0.0, "dead propulsors cannot produce thrust");
    }
}
