//! Content-based hashing for run IDs.

use serde::Serialize;
use sha2::{Digest, Sha256};

/// The mission-definition fingerprint that identifies a run.
///
/// Two runs with the same vehicle, segment stack, and solver version get
/// the same ID; changing any of them produces a new one.
#[derive(Debug, Clone, Serialize)]
pub struct RunFingerprint {
    pub mission_tag: String,
    pub vehicle_tag: String,
    /// (segment tag, control point count) in mission order
    pub segments: Vec<(String, usize)>,
}

pub fn compute_run_id(fingerprint: &RunFingerprint, solver_version: &str) -> String {
    let mut hasher = Sha256::new();

    let fingerprint_json = serde_json::to_string(fingerprint).unwrap_or_default();
    hasher.update(fingerprint_json.as_bytes());
    hasher.update(solver_version.as_bytes());

    let result = hasher.finalize();
    format!("{:x}", result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fingerprint(tag: &str) -> RunFingerprint {
        RunFingerprint {
            mission_tag: tag.to_string(),
            vehicle_tag: "testbed".to_string(),
            segments: vec![("climb".to_string(), 16), ("cruise".to_string(), 16)],
        }
    }

    #[test]
    fn hash_stability() {
        let a = compute_run_id(&fingerprint("study"), "0.1.0");
        let b = compute_run_id(&fingerprint("study"), "0.1.0");
        assert_eq!(a, b);
    }

    #[test]
    fn hash_differs_for_different_inputs() {
        let base = compute_run_id(&fingerprint("study"), "0.1.0");
        assert_ne!(base, compute_run_id(&fingerprint("other"), "0.1.0"));
        assert_ne!(base, compute_run_id(&fingerprint("study"), "0.2.0"));

        let mut more_points = fingerprint("study");
        more_points.segments[0].1 = 32;
        assert_ne!(base, compute_run_id(&more_points, "0.1.0"));
    }
}
