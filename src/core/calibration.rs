use itertools::Itertools;

use super::events::{Event, EventSubscriptions, Progress};
use crate::{
    catalog::Target,
    devices::{camera::FrameSource, motor_link::{Axis, Direction, MotorLink}},
    errors::{Error, Result},
    plate_solve::{PlateSolverIface, SolveHint},
    sky_math::math::{radian_to_degree, RotMatrix, SkyCoord},
};

/// Sampled pulses per direction block. With one extra anti-backlash
/// pulse before each block the whole run is 4 * (1 + 4) pulses.
const SAMPLES_PER_BLOCK: usize = 4;

/// Pulse order of the calibration run. Each same-axis pair of blocks
/// feeds one delta set, so reversing direction halfway cancels a
/// constant drift in the means.
const BLOCKS: [(Axis, Direction); 4] = [
    (Axis::Azimuth,  Direction::Negative),
    (Axis::Altitude, Direction::Negative),
    (Axis::Altitude, Direction::Positive),
    (Axis::Azimuth,  Direction::Positive),
];

/// Sky-frame effect of one pulse block, magnitudes only. The pulses of
/// a block are assumed monotonic in one direction; a pulse too weak to
/// overcome friction would fold into the mean unnoticed.
#[derive(Debug, Clone, Copy)]
pub struct AxisDelta {
    pub d_ra:  f64,
    pub d_dec: f64,
}

/// Fitted relationship between the sky frame and the mount axes:
/// one rotation angle and the mount-frame degrees one pulse block
/// moves each axis. Valid until the next calibration run.
#[derive(Debug, Clone, Copy)]
pub struct CalibrationModel {
    pub angle:     f64, // in radians
    pub az_scale:  f64, // in degrees per pulse block
    pub alt_scale: f64,
}

pub struct CalibrationOutcome {
    pub model:       CalibrationModel,
    pub image_coord: SkyCoord, // where the last sample left the telescope
}

/// Consecutive unsigned finite differences of one sample block.
pub fn block_deltas(samples: &[SkyCoord]) -> Vec<AxisDelta> {
    samples.iter()
        .tuple_windows()
        .map(|(s1, s2)| AxisDelta {
            d_ra:  f64::abs(s2.ra - s1.ra),
            d_dec: f64::abs(s2.dec - s1.dec),
        })
        .collect()
}

/// Estimates the calibration model from the collected per-axis delta
/// sets. Pure so it can be checked against synthetic samples.
pub fn fit_model(az_deltas: &[AxisDelta], alt_deltas: &[AxisDelta]) -> Result<CalibrationModel> {
    if az_deltas.is_empty() || alt_deltas.is_empty() {
        return Err(Error::Aborted("No calibration samples collected".to_string()));
    }

    let mean = |deltas: &[AxisDelta]| -> (f64, f64) {
        let count = deltas.len() as f64;
        (deltas.iter().map(|d| d.d_ra).sum::<f64>() / count,
         deltas.iter().map(|d| d.d_dec).sum::<f64>() / count)
    };
    let (az_d_ra, az_d_dec) = mean(az_deltas);
    let (alt_d_ra, alt_d_dec) = mean(alt_deltas);

    // each axis gives its own estimate of the frame rotation
    let az_angle = f64::atan2(az_d_ra, az_d_dec);
    let alt_angle = f64::atan2(alt_d_ra, alt_d_dec);
    let angle = (az_angle + alt_angle) / 2.0;

    // rotating a mean delta into the mount frame puts the axis's whole
    // displacement onto the first component; the second component is
    // cross-axis leakage and is not modeled
    let rot = RotMatrix::new(angle);
    let (az_scale, _) = rot.rotate(az_d_ra, az_d_dec);
    let (alt_scale, _) = rot.rotate(alt_d_ra, alt_d_dec);

    Ok(CalibrationModel { angle, az_scale, alt_scale })
}

/// Runs the full calibration sequence: for every block one discarded
/// anti-backlash pulse, then four sampled pulses with a capture+solve
/// after each. Any capture or solve failure aborts the whole run; a
/// model is never fitted from an incomplete sample set.
pub fn run(
    link:   &mut dyn MotorLink,
    camera: &dyn FrameSource,
    solver: &dyn PlateSolverIface,
    target: &Target,
    events: &EventSubscriptions,
) -> Result<CalibrationOutcome> {
    let hint = SolveHint {
        ra_hours: target.ra_hours,
        spd:      target.spd,
    };

    let mut az_deltas = Vec::new();
    let mut alt_deltas = Vec::new();
    let mut last_coord = None;
    let total = BLOCKS.len() * SAMPLES_PER_BLOCK;
    let mut done = 0;

    for (axis, dir) in BLOCKS {
        events.status(format!(
            "One {}{} pulse for backlash", axis.to_str(), dir.to_str()
        ));
        link.pulse_block(axis, dir)?;

        let mut samples = Vec::with_capacity(SAMPLES_PER_BLOCK);
        for _ in 0..SAMPLES_PER_BLOCK {
            link.pulse_block(axis, dir)?;
            let image = camera.capture()?;
            let coord = solver.solve(&image, &hint)?;
            log::debug!(
                "calibration sample {}{}: ra={:.4} dec={:.4}",
                axis.to_str(), dir.to_str(), coord.ra, coord.dec
            );
            samples.push(coord);
            last_coord = Some(coord);
            done += 1;
            events.notify(Event::Progress(Progress { cur: done, total }));
        }

        let deltas = match axis {
            Axis::Azimuth  => &mut az_deltas,
            Axis::Altitude => &mut alt_deltas,
        };
        deltas.extend(block_deltas(&samples));
    }

    let image_coord = last_coord
        .ok_or_else(|| Error::Aborted("No calibration samples collected".to_string()))?;
    let model = fit_model(&az_deltas, &alt_deltas)?;
    events.status(format!(
        "Calibration done: angle={:.1} deg, az={:.2} deg/block, alt={:.2} deg/block",
        radian_to_degree(model.angle), model.az_scale, model.alt_scale
    ));

    Ok(CalibrationOutcome { model, image_coord })
}
