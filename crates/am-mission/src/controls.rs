//! Flight-dynamics flags and assigned control variables.
//!
//! A control variable is a segment quantity handed to the solver: when
//! active it registers an N-row unknown column with an initial guess, and
//! the `unknowns` iterate step maps the solved values back into conditions.
//! Everything is an explicit optional/default field: a control that is not
//! active simply contributes nothing.

use crate::conditions::Conditions;
use crate::error::{MissionError, MissionResult};
use nalgebra::DMatrix;

/// Which rigid-body balance equations contribute residuals.
#[derive(Clone, Copy, Debug, Default)]
pub struct FlightDynamics {
    pub force_x: bool,
    pub force_y: bool,
    pub force_z: bool,
    pub moment_x: bool,
    pub moment_y: bool,
    pub moment_z: bool,
}

impl FlightDynamics {
    /// Residual field names in registration order.
    pub fn active_residuals(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.force_x {
            names.push("force_x");
        }
        if self.force_y {
            names.push("force_y");
        }
        if self.force_z {
            names.push("force_z");
        }
        if self.moment_x {
            names.push("moment_x");
        }
        if self.moment_y {
            names.push("moment_y");
        }
        if self.moment_z {
            names.push("moment_z");
        }
        names
    }
}

/// A scalar-per-control-point control variable.
#[derive(Clone, Debug, Default)]
pub struct ScalarControl {
    pub active: bool,
    /// Initial guess, broadcast over all control points
    pub initial_guess: f64,
}

impl ScalarControl {
    pub fn activate(guess: f64) -> Self {
        Self {
            active: true,
            initial_guess: guess,
        }
    }
}

/// Throttle control over one or more propulsor groups.
///
/// Each group shares a single throttle column; every propulsor tag in the
/// group receives the same solved setting.
#[derive(Clone, Debug, Default)]
pub struct ThrottleControl {
    pub active: bool,
    /// Propulsor tags per group, evaluated in declaration order
    pub assigned_propulsors: Vec<Vec<String>>,
    /// Initial guess per group
    pub initial_guess_values: Vec<f64>,
}

/// The control variables a segment may assign to the solver.
#[derive(Clone, Debug, Default)]
pub struct AssignedControlVariables {
    pub throttle: ThrottleControl,
    pub body_angle: ScalarControl,
    pub bank_angle: ScalarControl,
    pub wind_angle: ScalarControl,
    pub velocity: ScalarControl,
    pub altitude: ScalarControl,
}

impl AssignedControlVariables {
    /// Register one unknown column per active control, in a fixed order.
    ///
    /// The order established here is the pack order for the whole solve;
    /// it must not change between registration and unpacking.
    pub fn register_unknowns(&self, n: usize, unknowns: &mut Conditions) -> MissionResult<()> {
        if self.throttle.active {
            if self.throttle.assigned_propulsors.is_empty() {
                return Err(MissionError::config(
                    "throttle control active with no assigned propulsors",
                ));
            }
            if self.throttle.initial_guess_values.len() != self.throttle.assigned_propulsors.len() {
                return Err(MissionError::config(
                    "throttle initial guesses do not match propulsor groups",
                ));
            }
            for (group, &guess) in self.throttle.initial_guess_values.iter().enumerate() {
                let name = format!("throttle_{group}");
                unknowns.set_field(&[name.as_str()], DMatrix::from_element(n, 1, guess))?;
            }
        }
        for (name, control) in [
            ("body_angle", &self.body_angle),
            ("bank_angle", &self.bank_angle),
            ("wind_angle", &self.wind_angle),
            ("velocity", &self.velocity),
            ("altitude", &self.altitude),
        ] {
            if control.active {
                unknowns.set_field(&[name], DMatrix::from_element(n, 1, control.initial_guess))?;
            }
        }
        Ok(())
    }
}

/// Register one residual column per active balance equation.
pub fn register_residuals(
    flight_dynamics: &FlightDynamics,
    n: usize,
    residuals: &mut Conditions,
) -> MissionResult<()> {
    for name in flight_dynamics.active_residuals() {
        residuals.ensure_field(&[name], n, 1)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_order_is_deterministic() {
        let mut controls = AssignedControlVariables::default();
        controls.throttle = ThrottleControl {
            active: true,
            assigned_propulsors: vec![vec!["a".into()], vec!["b".into()]],
            initial_guess_values: vec![0.5, 0.7],
        };
        controls.body_angle = ScalarControl::activate(0.03);

        let mut unknowns = Conditions::new();
        controls.register_unknowns(4, &mut unknowns).unwrap();

        let leaves = unknowns.leaves();
        assert_eq!(
            leaves.iter().map(|(name, _, _)| name.as_str()).collect::<Vec<_>>(),
            vec!["throttle_0", "throttle_1", "body_angle"]
        );
        assert_eq!(unknowns.element_count(), 12);
        assert_eq!(unknowns.field(&["throttle_1"]).unwrap()[(0, 0)], 0.7);
    }

    #[test]
    fn throttle_without_groups_is_a_config_error() {
        let mut controls = AssignedControlVariables::default();
        controls.throttle.active = true;
        let mut unknowns = Conditions::new();
        let err = controls.register_unknowns(4, &mut unknowns).unwrap_err();
        assert!(matches!(err, MissionError::Config { .. }));
    }

    #[test]
    fn residual_registration_follows_flags() {
        let flight_dynamics = FlightDynamics {
            force_x: true,
            force_z: true,
            ..FlightDynamics::default()
        };
        let mut residuals = Conditions::new();
        register_residuals(&flight_dynamics, 8, &mut residuals).unwrap();
        assert_eq!(residuals.element_count(), 16);
        assert!(residuals.field(&["force_x"]).is_ok());
        assert!(residuals.field(&["force_y"]).is_err());
    }
}
