//! Post-process steps, run once after the solve (converged or not).

use crate::error::MissionResult;
use crate::segment::Segment;
use crate::state::paths;
use nalgebra::DVector;

/// Integrate inertial velocity into the horizontal position columns.
///
/// The z column (altitude) is a boundary condition owned by the segment
/// type; only x and y are integrated here.
pub fn integrate_inertial_position(segment: &mut Segment) -> MissionResult<()> {
    let velocity = segment.state.conditions.field(paths::VELOCITY)?.clone();
    let integrate = segment.state.numerics.time.integrate.clone();

    let position = segment.state.conditions.field_mut(paths::POSITION)?;
    for axis in [0usize, 1] {
        let v_axis = DVector::from_fn(velocity.nrows(), |i, _| velocity[(i, axis)]);
        let displacement = &integrate * v_axis;
        let start = position[(0, axis)];
        for i in 0..position.nrows() {
            position[(i, axis)] = start + displacement[i];
        }
    }
    Ok(())
}

/// Cumulative electrical energy drawn from each bus over the segment.
pub fn energy_totals(segment: &mut Segment) -> MissionResult<()> {
    let vehicle = segment.analyses.vehicle.clone();
    let integrate = segment.state.numerics.time.integrate.clone();

    for network in &vehicle.networks {
        for bus in &network.busses {
            let bus_tag = bus.tag.as_str();
            let power = segment
                .state
                .conditions
                .column(&["energy", bus_tag, "power_draw"], 0)?;
            let energy = &integrate * DVector::from_vec(power);
            let energy_used: Vec<f64> = energy.iter().copied().collect();
            segment.state.conditions.set_field(
                &["energy", bus_tag, "energy_used"],
                nalgebra::DMatrix::from_vec(energy_used.len(), 1, energy_used),
            )?;
        }
    }
    Ok(())
}
