//! Integration test: store round trip for a synthetic mission result.

use am_mission::{Conditions, MissionResults, SegmentOutcome, SegmentPhase};
use am_results::hash::RunFingerprint;
use am_results::{
    compute_run_id, conditions_from_json, RunManifest, RunStore, SegmentRecord,
};
use nalgebra::DMatrix;

fn synthetic_results() -> MissionResults {
    let mut conditions = Conditions::new();
    conditions
        .set_field(
            &["frames", "inertial", "time"],
            DMatrix::from_fn(4, 1, |i, _| i as f64 * 10.0),
        )
        .unwrap();
    conditions
        .set_field(
            &["energy", "dc_bus", "pack", "state_of_charge"],
            DMatrix::from_fn(4, 1, |i, _| 1.0 - 0.01 * i as f64),
        )
        .unwrap();

    MissionResults {
        tag: "synthetic".into(),
        segments: vec![
            SegmentOutcome {
                tag: "climb".into(),
                converged: true,
                phase: SegmentPhase::Finalized,
                residual_norm: Some(3.2e-10),
                conditions: conditions.clone(),
            },
            SegmentOutcome {
                tag: "cruise".into(),
                converged: false,
                phase: SegmentPhase::Failed,
                residual_norm: Some(0.4),
                conditions,
            },
        ],
    }
}

#[test]
fn save_and_load_round_trip() {
    let dir = std::env::temp_dir().join(format!("am_results_test_{}", std::process::id()));
    let store = RunStore::new(dir.clone()).unwrap();

    let results = synthetic_results();
    let fingerprint = RunFingerprint {
        mission_tag: results.tag.clone(),
        vehicle_tag: "testbed".into(),
        segments: vec![("climb".into(), 4), ("cruise".into(), 4)],
    };
    let run_id = compute_run_id(&fingerprint, "0.1.0");

    let manifest = RunManifest::new(run_id.clone(), &results.tag, "testbed", "0.1.0", &results);
    let records: Vec<SegmentRecord> = results
        .segments
        .iter()
        .map(SegmentRecord::from_outcome)
        .collect();

    store.save_run(&manifest, &records).unwrap();
    assert!(store.has_run(&run_id));

    let loaded_manifest = store.load_manifest(&run_id).unwrap();
    assert_eq!(loaded_manifest.mission_tag, "synthetic");
    assert_eq!(loaded_manifest.segments.len(), 2);
    assert!(!loaded_manifest.all_converged());
    assert_eq!(loaded_manifest.segments[1].residual_norm, Some(0.4));

    let loaded_records = store.load_segments(&run_id).unwrap();
    assert_eq!(loaded_records.len(), 2);
    let rebuilt = conditions_from_json(&loaded_records[0].conditions).unwrap();
    assert_eq!(rebuilt, results.segments[0].conditions);

    let listed = store.list_runs("synthetic").unwrap();
    assert_eq!(listed.len(), 1);
    assert!(store.list_runs("unrelated").unwrap().is_empty());

    store.delete_run(&run_id).unwrap();
    assert!(!store.has_run(&run_id));
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn loading_a_missing_run_fails() {
    let dir = std::env::temp_dir().join(format!("am_results_missing_{}", std::process::id()));
    let store = RunStore::new(dir.clone()).unwrap();
    assert!(store.load_manifest("does_not_exist").is_err());
    let _ = std::fs::remove_dir_all(dir);
}
