use super::{
    calibration::CalibrationModel,
    compare::{compare, CompareResult, GotoPlan},
    events::EventSubscriptions,
};
use crate::{
    catalog::Target,
    devices::{camera::FrameSource, motor_link::{Axis, Direction, MotorLink}},
    errors::{Error, Result},
    plate_solve::{PlateSolverIface, SolveHint},
    sky_math::math::SkyCoord,
};

pub enum GotoOutcome {
    /// Both axes moved and were confirmed; the residual comes from a
    /// fresh capture+solve+compare cycle.
    Completed {
        image_coord: SkyCoord,
        residual:    CompareResult,
    },
    /// The link stopped answering mid-move. The mount may or may not
    /// have moved; its position is unknown until the next solve.
    Unconfirmed {
        axis: Axis,
    },
}

fn move_axis(
    link:   &mut dyn MotorLink,
    axis:   Axis,
    steps:  i32,
    events: &EventSubscriptions,
) -> Result<()> {
    if steps == 0 {
        return Ok(());
    }
    let dir = if steps < 0 { Direction::Negative } else { Direction::Positive };
    events.status(format!(
        "Moving {} by {}{} steps", axis.to_str(), dir.to_str(), steps.unsigned_abs()
    ));
    link.move_steps(axis, dir, steps.unsigned_abs())
}

/// Consumes a go-to plan: moves each axis in turn, then re-captures,
/// re-solves and re-compares so the operator sees the residual error.
/// Does not loop; re-invoking on the residual is an operator decision.
pub fn run(
    link:   &mut dyn MotorLink,
    camera: &dyn FrameSource,
    solver: &dyn PlateSolverIface,
    plan:   &GotoPlan,
    target: &Target,
    model:  &CalibrationModel,
    steps_per_pulse_block: u32,
    events: &EventSubscriptions,
) -> Result<GotoOutcome> {
    for (axis, steps) in [
        (Axis::Azimuth,  plan.az_steps),
        (Axis::Altitude, plan.alt_steps),
    ] {
        match move_axis(link, axis, steps, events) {
            Ok(()) => {}
            Err(Error::LinkTimeout(waiting_for)) => {
                log::warn!(
                    "Move on {} axis unconfirmed (no answer while waiting for {})",
                    axis.to_str(), waiting_for
                );
                return Ok(GotoOutcome::Unconfirmed { axis });
            }
            Err(err) => return Err(err),
        }
    }

    events.status("Go-to done, checking residual error");
    let image = camera.capture()?;
    let hint = SolveHint {
        ra_hours: target.ra_hours,
        spd:      target.spd,
    };
    let image_coord = solver.solve(&image, &hint)?;
    let residual = compare(&target.coord, &image_coord, model, steps_per_pulse_block)?;
    Ok(GotoOutcome::Completed { image_coord, residual })
}
