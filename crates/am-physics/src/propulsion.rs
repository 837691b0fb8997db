//! Electric rotor/ducted-fan propulsor performance.

use crate::cache::PerformanceCache;
use crate::error::{PhysicsError, PhysicsResult};
use crate::traits::{PropulsionModel, PropulsorOperatingState, PropulsorPerformance};
use am_vehicle::Propulsor;

/// Actuator-disc electric propulsor model.
///
/// Shaft power follows throttle against the rated power; thrust comes from
/// propulsive efficiency over an effective inflow velocity that blends the
/// freestream with the static induced velocity, so the model stays finite
/// through the low-speed end of a climb or transition segment.
#[derive(Clone, Debug, Default)]
pub struct ElectricRotor;

impl ElectricRotor {
    pub fn new() -> Self {
        Self
    }

    fn evaluate_point(
        propulsor: &Propulsor,
        bus_efficiency: f64,
        throttle: f64,
        density: f64,
        velocity: f64,
    ) -> PhysicsResult<([f64; 3], f64, f64)> {
        if !throttle.is_finite() || !velocity.is_finite() {
            return Err(PhysicsError::NonPhysical {
                what: "propulsor operating state",
            });
        }

        // Negative throttle never produces reverse thrust here; clamp at
        // zero and let the solver's residual drive it back into range.
        let setting = throttle.max(0.0);
        let shaft_power = setting * propulsor.rated_power.value;

        // Static induced velocity from momentum theory sets the low-speed
        // scale of the effective inflow.
        let disc_area = propulsor.disc_area_m2();
        let v_static = (shaft_power.max(1.0) / (2.0 * density * disc_area)).cbrt();
        let v_eff = (velocity * velocity + v_static * v_static).sqrt();

        let thrust = propulsor.propulsive_efficiency * shaft_power / v_eff;

        let (sin_cant, cos_cant) = propulsor.thrust_angle.sin_cos();
        let thrust_vec = [thrust * cos_cant, 0.0, -thrust * sin_cant];

        let electrical_power =
            shaft_power / (propulsor.motor_efficiency * bus_efficiency).max(1e-6);

        Ok((thrust_vec, shaft_power, electrical_power))
    }
}

impl PropulsionModel for ElectricRotor {
    fn name(&self) -> &str {
        "electric rotor"
    }

    fn compute_performance(
        &self,
        propulsor: &Propulsor,
        bus_efficiency: f64,
        state: &PropulsorOperatingState<'_>,
        cache: &mut PerformanceCache,
    ) -> PhysicsResult<(PropulsorPerformance, bool, Option<String>)> {
        let n = state.throttle.len();
        if state.density.len() != n || state.velocity.len() != n {
            return Err(PhysicsError::LengthMismatch {
                what: "propulsor operating state",
                expected: n,
                got: state.density.len().min(state.velocity.len()),
            });
        }

        // Identical-propulsor reuse: one evaluation per identity group.
        if let Some(tag) = propulsor.identity_tag.as_deref() {
            if let Some(stored) = cache.get(tag) {
                return Ok((stored, true, Some(tag.to_string())));
            }
        }

        let mut performance = PropulsorPerformance {
            thrust_n: Vec::with_capacity(n),
            moment_nm: Vec::with_capacity(n),
            mechanical_power_w: Vec::with_capacity(n),
            electrical_power_w: Vec::with_capacity(n),
        };

        for i in 0..n {
            let (thrust_vec, shaft, electrical) = Self::evaluate_point(
                propulsor,
                bus_efficiency,
                state.throttle[i],
                state.density[i],
                state.velocity[i],
            )?;
            performance.thrust_n.push(thrust_vec);
            // Thrust line through the reference point: no propulsive moment.
            performance.moment_nm.push([0.0, 0.0, 0.0]);
            performance.mechanical_power_w.push(shaft);
            performance.electrical_power_w.push(electrical);
        }

        if let Some(tag) = propulsor.identity_tag.clone() {
            cache.insert(tag.clone(), performance.clone());
            return Ok((performance, false, Some(tag)));
        }

        Ok((performance, false, None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use am_core::units::{m, w};

    fn test_propulsor(identity: Option<&str>) -> Propulsor {
        let mut p = Propulsor::new("prop", m(1.2), w(60e3));
        p.identity_tag = identity.map(String::from);
        p
    }

    fn cruise_state<'a>(
        throttle: &'a [f64],
        density: &'a [f64],
        velocity: &'a [f64],
    ) -> PropulsorOperatingState<'a> {
        PropulsorOperatingState {
            throttle,
            density,
            velocity,
        }
    }

    #[test]
    fn more_throttle_more_thrust() {
        let model = ElectricRotor::new();
        let mut cache = PerformanceCache::new();
        let propulsor = test_propulsor(None);

        let throttle = [0.3, 0.6, 0.9];
        let density = [1.0556; 3];
        let velocity = [40.0; 3];
        let (perf, reused, tag) = model
            .compute_performance(&propulsor, 0.98, &cruise_state(&throttle, &density, &velocity), &mut cache)
            .unwrap();

        assert!(!reused);
        assert!(tag.is_none());
        assert!(perf.thrust_n[1][0] > perf.thrust_n[0][0]);
        assert!(perf.thrust_n[2][0] > perf.thrust_n[1][0]);
        // electrical power exceeds shaft power through the efficiency chain
        assert!(perf.electrical_power_w[2] > perf.mechanical_power_w[2]);
    }

    #[test]
    fn identical_propulsors_reuse_stored_results() {
        let model = ElectricRotor::new();
        let mut cache = PerformanceCache::new();
        let first = test_propulsor(Some("lift_rotor"));
        let second = test_propulsor(Some("lift_rotor"));

        let throttle = [0.8];
        let density = [1.225];
        let velocity = [30.0];
        let state = cruise_state(&throttle, &density, &velocity);

        let (perf_a, reused_a, _) = model
            .compute_performance(&first, 0.98, &state, &mut cache)
            .unwrap();
        let (perf_b, reused_b, tag_b) = model
            .compute_performance(&second, 0.98, &state, &mut cache)
            .unwrap();

        assert!(!reused_a);
        assert!(reused_b);
        assert_eq!(tag_b.as_deref(), Some("lift_rotor"));
        assert_eq!(perf_a.thrust_n[0][0], perf_b.thrust_n[0][0]);
        assert_eq!(cache.stats(), (1, 1));
    }

    #[test]
    fn static_thrust_is_finite() {
        let model = ElectricRotor::new();
        let mut cache = PerformanceCache::new();
        let propulsor = test_propulsor(None);

        let throttle = [1.0];
        let density = [1.225];
        let velocity = [0.0];
        let (perf, _, _) = model
            .compute_performance(&propulsor, 0.98, &cruise_state(&throttle, &density, &velocity), &mut cache)
            .unwrap();

        assert!(perf.thrust_n[0][0].is_finite());
        assert!(perf.thrust_n[0][0] > 0.0);
    }
}
