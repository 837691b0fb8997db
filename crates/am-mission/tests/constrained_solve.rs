//! Integration test: constrained-optimizer strategy on a cruise segment.

mod common;

use am_core::units::{m, mps};
use am_mission::{paths, segments, Mission, OptimizeSettings, SolverStrategy};

fn cruise_with_strategy(strategy: SolverStrategy) -> Mission {
    let mut segment = segments::cruise::constant_speed_constant_altitude(
        "cruise",
        common::testbed_analyses(),
        Some(m(1500.0)),
        Some(mps(40.0)),
        m(2000.0),
    )
    .unwrap();
    segment.state.numerics.number_of_control_points = 8;
    segment.solver = strategy;

    let mut mission = Mission::new("constrained_cruise");
    mission.append_segment(segment);
    mission
}

/// With slack constraints the optimizer finds the same trim point the root
/// finder does.
#[test]
fn optimizer_matches_root_finder_when_unconstrained() {
    let mut root_mission = cruise_with_strategy(SolverStrategy::default());
    let root_results = root_mission.evaluate().unwrap();
    assert!(root_results.all_converged());

    let mut opt_mission = cruise_with_strategy(SolverStrategy::Optimize(OptimizeSettings {
        lift_coefficient_limit: Some(1.4),
        ..OptimizeSettings::default()
    }));
    let opt_results = opt_mission.evaluate().unwrap();
    assert!(opt_results.all_converged(), "optimizer must converge");

    let root_throttle = root_mission.segments[0]
        .state
        .unknowns
        .column(&["throttle_0"], 0)
        .unwrap();
    let opt_throttle = opt_mission.segments[0]
        .state
        .unknowns
        .column(&["throttle_0"], 0)
        .unwrap();
    for i in 0..root_throttle.len() {
        assert!(
            (root_throttle[i] - opt_throttle[i]).abs() < 1e-3,
            "point {i}: {} vs {}",
            root_throttle[i],
            opt_throttle[i]
        );
    }
}

/// An active lift ceiling below the trim lift coefficient makes the
/// problem infeasible: the optimizer must hold the constraint (approximately,
/// through the penalty) and report non-convergence rather than return a
/// silently unbalanced answer.
#[test]
fn active_lift_ceiling_is_enforced_and_flagged() {
    // trim needs CL ≈ 0.5 at this weight and speed; cap it well below that
    let limit = 0.30;
    let mut settings = OptimizeSettings {
        lift_coefficient_limit: Some(limit),
        ..OptimizeSettings::default()
    };
    // stiff penalty so the compromise point sits close to the ceiling
    settings.config.penalty_weight = 1e4;
    let mut mission = cruise_with_strategy(SolverStrategy::Optimize(settings));
    let results = mission.evaluate().unwrap();

    let outcome = results.segment("cruise").unwrap();
    assert!(!outcome.converged, "infeasible trim must be flagged");

    let cl = outcome
        .conditions
        .column(paths::LIFT_COEFFICIENT, 0)
        .unwrap();
    for (i, value) in cl.iter().enumerate() {
        assert!(
            *value < limit + 0.05,
            "point {i}: CL {value} far above the ceiling {limit}"
        );
    }
}

/// Box bounds on the unknowns hold even when the solution wants more.
#[test]
fn throttle_bounds_are_respected() {
    let mut mission = cruise_with_strategy(SolverStrategy::Optimize(OptimizeSettings {
        throttle_limits: (0.0, 0.25),
        ..OptimizeSettings::default()
    }));
    let results = mission.evaluate().unwrap();

    let throttle = mission.segments[0]
        .state
        .unknowns
        .column(&["throttle_0"], 0)
        .unwrap();
    for (i, value) in throttle.iter().enumerate() {
        assert!(
            *value <= 0.25 + 1e-12,
            "point {i}: throttle {value} violates the bound"
        );
    }
    // whether this converges depends on how much thrust 25% throttle buys;
    // either way the bound must hold and the outcome must be recorded
    let outcome = results.segment("cruise").unwrap();
    assert!(outcome.residual_norm.is_some());
}
