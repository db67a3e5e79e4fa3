use super::calibration::CalibrationModel;
use crate::{
    errors::{Error, Result},
    sky_math::math::{MountCoord, RotMatrix, SkyCoord},
};

/// Signed motor steps that would close the gap between image and
/// target, one count per axis. Stale after any motor motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GotoPlan {
    pub az_steps:  i32,
    pub alt_steps: i32,
}

impl GotoPlan {
    pub fn is_zero(&self) -> bool {
        self.az_steps == 0 && self.alt_steps == 0
    }
}

/// Everything Compare derives, kept together for the status display.
#[derive(Debug, Clone, Copy)]
pub struct CompareResult {
    pub target_mount: MountCoord,
    pub image_mount:  MountCoord,
    pub diff_ra:      f64, // image - target, sky frame
    pub diff_dec:     f64,
    pub diff_az:      f64, // image - target, mount frame
    pub diff_alt:     f64,
    pub plan:         GotoPlan,
}

/// Projects target and image into the mount frame and derives the go-to
/// step counts. Pure computation, no motion, safe to repeat.
pub fn compare(
    target: &SkyCoord,
    image:  &SkyCoord,
    model:  &CalibrationModel,
    steps_per_pulse_block: u32,
) -> Result<CompareResult> {
    if model.az_scale == 0.0 || model.alt_scale == 0.0 {
        return Err(Error::Aborted(
            "Calibration model has a zero axis scale".to_string()
        ));
    }

    let rot = RotMatrix::new(model.angle);
    let target_mount = rot.to_mount(target);
    let image_mount = rot.to_mount(image);

    let diff_az = image_mount.az - target_mount.az;
    let diff_alt = image_mount.alt - target_mount.alt;

    // one pulse block moves `scale` mount-frame degrees and costs
    // `steps_per_pulse_block` micro-steps; negated because the motors
    // must move against the difference
    let steps = f64::from(steps_per_pulse_block);
    let plan = GotoPlan {
        az_steps:  (-diff_az / model.az_scale * steps).round() as i32,
        alt_steps: (-diff_alt / model.alt_scale * steps).round() as i32,
    };

    Ok(CompareResult {
        target_mount,
        image_mount,
        diff_ra: image.ra - target.ra,
        diff_dec: image.dec - target.dec,
        diff_az,
        diff_alt,
        plan,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity_model() -> CalibrationModel {
        CalibrationModel { angle: 0.0, az_scale: 1.0, alt_scale: 1.0 }
    }

    #[test]
    fn test_steps_oppose_difference() {
        let target = SkyCoord { ra: 50.0, dec: 20.0 };
        let image = SkyCoord { ra: 52.0, dec: 19.0 };
        let result = compare(&target, &image, &identity_model(), 3200).unwrap();
        assert!(result.diff_ra == 2.0);
        assert!(result.diff_dec == -1.0);
        assert_eq!(result.plan.az_steps, -6400);
        assert_eq!(result.plan.alt_steps, 3200);
    }

    #[test]
    fn test_on_target_is_zero_plan() {
        let coord = SkyCoord { ra: 56.85, dec: 24.1 };
        let result = compare(&coord, &coord, &identity_model(), 3200).unwrap();
        assert!(result.plan.is_zero());
        assert!(result.diff_az == 0.0);
        assert!(result.diff_alt == 0.0);
    }

    #[test]
    fn test_scale_divides_steps() {
        let target = SkyCoord { ra: 50.0, dec: 20.0 };
        let image = SkyCoord { ra: 50.5, dec: 20.0 };
        let model = CalibrationModel { angle: 0.0, az_scale: 0.25, alt_scale: 1.0 };
        let result = compare(&target, &image, &model, 3200).unwrap();
        assert_eq!(result.plan.az_steps, -6400);
        assert_eq!(result.plan.alt_steps, 0);
    }

    #[test]
    fn test_zero_scale_is_rejected() {
        let coord = SkyCoord { ra: 50.0, dec: 20.0 };
        let model = CalibrationModel { angle: 0.0, az_scale: 0.0, alt_scale: 1.0 };
        assert!(compare(&coord, &coord, &model, 3200).is_err());
    }
}
