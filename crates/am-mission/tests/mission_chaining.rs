//! Integration test: multi-segment state continuity.
//!
//! Two stacked climb segments followed by a cruise that inherits its
//! altitude and airspeed. The first row of each segment's conditions must
//! continue exactly from the previous segment's last row.

mod common;

use am_core::units::{m, mps};
use am_mission::{paths, segments, Mission};

fn three_segment_mission() -> Mission {
    let analyses = common::testbed_analyses();

    let mut climb_1 = segments::climb::constant_speed_constant_rate(
        "climb_1",
        analyses.clone(),
        Some(m(0.0)),
        m(800.0),
        mps(2.0),
        Some(mps(35.0)),
    )
    .unwrap();
    climb_1.state.numerics.number_of_control_points = 8;

    // same law and speed, so the velocity vector continues exactly
    let mut climb_2 = segments::climb::constant_speed_constant_rate(
        "climb_2",
        analyses.clone(),
        None,
        m(1524.0),
        mps(2.0),
        None,
    )
    .unwrap();
    climb_2.state.numerics.number_of_control_points = 8;

    // inherits altitude and airspeed from the climb
    let mut cruise = segments::cruise::constant_speed_constant_altitude(
        "cruise",
        analyses,
        None,
        None,
        m(3000.0),
    )
    .unwrap();
    cruise.state.numerics.number_of_control_points = 8;

    let mut mission = Mission::new("climb_climb_cruise");
    mission.append_segment(climb_1);
    mission.append_segment(climb_2);
    mission.append_segment(cruise);
    mission
}

#[test]
fn all_segments_converge() {
    let mut mission = three_segment_mission();
    let results = mission.evaluate().unwrap();
    for outcome in &results.segments {
        assert!(outcome.converged, "segment '{}' did not converge", outcome.tag);
    }
}

#[test]
fn velocity_and_position_chain_exactly() {
    let mut mission = three_segment_mission();
    let results = mission.evaluate().unwrap();

    let first = results.segment("climb_1").unwrap();
    let second = results.segment("climb_2").unwrap();

    // identical climb laws: the full velocity vector continues row-to-row
    for axis in 0..3 {
        let v_end = first.conditions.column(paths::VELOCITY, axis).unwrap();
        let v_start = second.conditions.column(paths::VELOCITY, axis).unwrap();
        assert!(
            (v_end[v_end.len() - 1] - v_start[0]).abs() < 1e-9,
            "velocity axis {axis} discontinuous"
        );
    }

    let alt_end = first.conditions.column(paths::ALTITUDE, 0).unwrap();
    let alt_start = second.conditions.column(paths::ALTITUDE, 0).unwrap();
    assert!((alt_end[alt_end.len() - 1] - alt_start[0]).abs() < 1e-9);

    let x_end = first.conditions.column(paths::POSITION, 0).unwrap();
    let x_start = second.conditions.column(paths::POSITION, 0).unwrap();
    assert!((x_end[x_end.len() - 1] - x_start[0]).abs() < 1e-9);
}

#[test]
fn time_mass_and_charge_chain_across_all_segments() {
    let mut mission = three_segment_mission();
    let results = mission.evaluate().unwrap();

    let soc_path = ["energy", "dc_bus", "pack", "state_of_charge"];
    for pair in results.segments.windows(2) {
        let prev = &pair[0];
        let next = &pair[1];

        let t_prev = prev.conditions.column(paths::TIME, 0).unwrap();
        let t_next = next.conditions.column(paths::TIME, 0).unwrap();
        assert!(
            (t_prev[t_prev.len() - 1] - t_next[0]).abs() < 1e-9,
            "time discontinuous between '{}' and '{}'",
            prev.tag,
            next.tag
        );

        let m_prev = prev.conditions.column(paths::TOTAL_MASS, 0).unwrap();
        let m_next = next.conditions.column(paths::TOTAL_MASS, 0).unwrap();
        assert!((m_prev[m_prev.len() - 1] - m_next[0]).abs() < 1e-9);

        let soc_prev = prev.conditions.column(&soc_path, 0).unwrap();
        let soc_next = next.conditions.column(&soc_path, 0).unwrap();
        assert!(
            (soc_prev[soc_prev.len() - 1] - soc_next[0]).abs() < 1e-12,
            "state of charge discontinuous between '{}' and '{}'",
            prev.tag,
            next.tag
        );
    }
}

#[test]
fn cruise_inherits_climb_altitude_and_speed() {
    let mut mission = three_segment_mission();
    let results = mission.evaluate().unwrap();
    let cruise = results.segment("cruise").unwrap();

    let altitude = cruise.conditions.column(paths::ALTITUDE, 0).unwrap();
    for alt in &altitude {
        assert!((alt - 1524.0).abs() < 1e-9);
    }
    let speed = cruise
        .conditions
        .column(paths::FREESTREAM_VELOCITY, 0)
        .unwrap();
    for v in &speed {
        assert!((v - 35.0).abs() < 1e-9);
    }
}

#[test]
fn merged_columns_span_the_whole_mission() {
    let mut mission = three_segment_mission();
    let results = mission.evaluate().unwrap();

    let time = results.merged_column(paths::TIME, 0).unwrap();
    assert_eq!(time.len(), 24);
    // monotonic across segment boundaries
    for pair in time.windows(2) {
        assert!(pair[1] >= pair[0] - 1e-9, "time went backwards: {pair:?}");
    }
}
