use super::{
    calibration::{self, CalibrationModel},
    compare::{compare, CompareResult},
    events::EventSubscriptions,
    goto::{self, GotoOutcome},
};
use crate::{
    catalog::{Catalog, CatalogId, Target},
    devices::{camera::FrameSource, motor_link::MotorLink},
    errors::{Error, Result},
    plate_solve::PlateSolverIface,
    sky_math::math::SkyCoord,
};

/// Workflow stage of the go-to session. Stages only advance through the
/// guarded methods below, mirroring the order the operator must follow:
/// resolve a target, calibrate, compare, go to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    TargetResolved,
    Calibrated,
    Compared,
    GotoInFlight,
}

impl Stage {
    pub fn to_str(self) -> &'static str {
        match self {
            Self::Idle           => "idle",
            Self::TargetResolved => "target resolved",
            Self::Calibrated     => "calibrated",
            Self::Compared       => "compared",
            Self::GotoInFlight   => "go-to in flight",
        }
    }
}

/// All state of the calibrate-and-go-to workflow. One instance per
/// process; the console drives it strictly sequentially, so no two
/// multi-step procedures can ever overlap.
pub struct Session {
    stage:       Stage,
    target:      Option<Target>,
    model:       Option<CalibrationModel>,
    image_coord: Option<SkyCoord>,
    compared:    Option<CompareResult>,
    unconfirmed: bool, // motion happened without a confirming solve
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            stage:       Stage::Idle,
            target:      None,
            model:       None,
            image_coord: None,
            compared:    None,
            unconfirmed: false,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn target(&self) -> Option<&Target> {
        self.target.as_ref()
    }

    pub fn model(&self) -> Option<&CalibrationModel> {
        self.model.as_ref()
    }

    pub fn image_coord(&self) -> Option<&SkyCoord> {
        self.image_coord.as_ref()
    }

    pub fn compared(&self) -> Option<&CompareResult> {
        self.compared.as_ref()
    }

    pub fn position_unknown(&self) -> bool {
        self.unconfirmed
    }

    /// Resolves a catalog target. An existing calibration stays valid,
    /// but any computed plan refers to the old target and is dropped.
    pub fn resolve_target(&mut self, catalog: &Catalog, id: &CatalogId) -> Result<Target> {
        let target = catalog.lookup(id)?;
        log::info!(
            "Target {}: ra={:.2} dec={:.2}",
            target.id, target.coord.ra, target.coord.dec
        );
        self.target = Some(target.clone());
        self.compared = None;
        self.stage = if self.model.is_some() {
            Stage::Calibrated
        } else {
            Stage::TargetResolved
        };
        Ok(target)
    }

    /// Stores a solved image position taken outside calibration/go-to.
    pub fn set_image_coord(&mut self, coord: SkyCoord) {
        self.image_coord = Some(coord);
        self.unconfirmed = false;
        // a position from before the solve no longer matches the plan
        if self.stage == Stage::Compared {
            self.compared = None;
            self.stage = Stage::Calibrated;
        }
    }

    /// Any manual motor motion makes the last compare stale.
    pub fn notify_manual_motion(&mut self) {
        self.image_coord = None;
        if self.stage == Stage::Compared {
            self.compared = None;
            self.stage = Stage::Calibrated;
        }
    }

    pub fn calibrate(
        &mut self,
        link:   &mut dyn MotorLink,
        camera: &dyn FrameSource,
        solver: &dyn PlateSolverIface,
        events: &EventSubscriptions,
    ) -> Result<CalibrationModel> {
        let Some(target) = &self.target else {
            return Err(Error::Aborted("Resolve a target before calibrating".to_string()));
        };
        let outcome = match calibration::run(link, camera, solver, target, events) {
            Ok(outcome) => outcome,
            Err(err) => {
                // pulses were already issued when the run failed, any
                // earlier solved position no longer holds
                self.image_coord = None;
                self.compared = None;
                self.unconfirmed = true;
                self.stage = if self.model.is_some() {
                    Stage::Calibrated
                } else {
                    Stage::TargetResolved
                };
                return Err(err);
            }
        };
        self.model = Some(outcome.model);
        self.image_coord = Some(outcome.image_coord);
        self.compared = None;
        self.unconfirmed = false;
        self.stage = Stage::Calibrated;
        Ok(outcome.model)
    }

    pub fn compare(&mut self, steps_per_pulse_block: u32) -> Result<CompareResult> {
        if !matches!(self.stage, Stage::Calibrated | Stage::Compared) {
            return Err(Error::Aborted(
                format!("Compare requires a calibrated session (now: {})", self.stage.to_str())
            ));
        }
        let (Some(target), Some(model), Some(image)) =
            (&self.target, &self.model, &self.image_coord) else
        {
            return Err(Error::Aborted("No solved image position to compare".to_string()));
        };
        let result = compare(&target.coord, image, model, steps_per_pulse_block)?;
        self.compared = Some(result);
        self.stage = Stage::Compared;
        Ok(result)
    }

    /// Consumes the current plan; it is gone whatever the outcome, a
    /// new compare is needed for another attempt.
    pub fn goto(
        &mut self,
        link:   &mut dyn MotorLink,
        camera: &dyn FrameSource,
        solver: &dyn PlateSolverIface,
        steps_per_pulse_block: u32,
        events: &EventSubscriptions,
    ) -> Result<GotoOutcome> {
        if self.stage != Stage::Compared {
            return Err(Error::Aborted(
                format!("Go-to requires a compared session (now: {})", self.stage.to_str())
            ));
        }
        let Some(compared) = self.compared.take() else {
            return Err(Error::Aborted("No go-to plan".to_string()));
        };
        let (Some(target), Some(model)) = (&self.target, &self.model) else {
            return Err(Error::Aborted("No target or calibration model".to_string()));
        };

        self.stage = Stage::GotoInFlight;
        let outcome = goto::run(
            link, camera, solver,
            &compared.plan, target, model,
            steps_per_pulse_block, events,
        );
        match &outcome {
            Ok(GotoOutcome::Completed { image_coord, residual }) => {
                self.image_coord = Some(*image_coord);
                self.compared = Some(*residual);
                self.unconfirmed = false;
                self.stage = Stage::Compared;
            }
            Ok(GotoOutcome::Unconfirmed { .. }) => {
                // moved but unconfirmed: position unknown until the
                // operator solves or recalibrates
                self.image_coord = None;
                self.unconfirmed = true;
                self.stage = Stage::Calibrated;
            }
            Err(_) => {
                // an axis may already have moved, the pre-move position
                // cannot be trusted
                self.image_coord = None;
                self.unconfirmed = true;
                self.stage = Stage::Calibrated;
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::*;
    use crate::catalog::CatalogFamily;
    use crate::core::compare::GotoPlan;
    use crate::devices::motor_link::{Axis, Direction, SpeedTier};
    use crate::plate_solve::SolveHint;
    use crate::sky_math::math::MountCoord;

    struct RecordingLink {
        moves: Vec<(Axis, Direction, u32)>,
    }

    impl MotorLink for RecordingLink {
        fn jog(&mut self, _axis: Axis, _dir: Direction, _tier: SpeedTier) -> Result<()> {
            Ok(())
        }

        fn move_steps(&mut self, axis: Axis, dir: Direction, steps: u32) -> Result<()> {
            self.moves.push((axis, dir, steps));
            Ok(())
        }

        fn focus(&mut self, _dir: Direction, _tier: SpeedTier) -> Result<()> {
            Ok(())
        }

        fn query_sensors(&mut self) -> Result<String> {
            Ok(String::new())
        }
    }

    struct StubCamera;

    impl FrameSource for StubCamera {
        fn capture(&self) -> Result<PathBuf> {
            Ok(PathBuf::from("frame.png"))
        }
    }

    struct FailingCamera;

    impl FrameSource for FailingCamera {
        fn capture(&self) -> Result<PathBuf> {
            Err(Error::Aborted("image capture failed".to_string()))
        }
    }

    struct FailingSolver;

    impl PlateSolverIface for FailingSolver {
        fn solve(&self, _image: &Path, _hint: &SolveHint) -> Result<SkyCoord> {
            Err(Error::SolveFailed("no solution".to_string()))
        }
    }

    fn target() -> Target {
        Target {
            id: CatalogId { family: CatalogFamily::Messier, reference: 45 },
            coord: SkyCoord { ra: 56.85, dec: 24.1 },
            ra_hours: 3.0,
            spd: 114.0,
        }
    }

    fn calibrated_session() -> Session {
        let mut session = Session::new();
        session.target = Some(target());
        session.model = Some(CalibrationModel {
            angle: 0.0, az_scale: 1.0, alt_scale: 1.0,
        });
        session.image_coord = Some(SkyCoord { ra: 56.85, dec: 24.1 });
        session.stage = Stage::Calibrated;
        session
    }

    #[test]
    fn test_compare_needs_calibration() {
        let mut session = Session::new();
        assert!(matches!(session.compare(3200), Err(Error::Aborted(_))));
        session.target = Some(target());
        session.stage = Stage::TargetResolved;
        assert!(matches!(session.compare(3200), Err(Error::Aborted(_))));
    }

    #[test]
    fn test_compare_on_target_gives_zero_plan() {
        let mut session = calibrated_session();
        let result = session.compare(3200).unwrap();
        assert!(result.plan.is_zero());
        assert_eq!(session.stage(), Stage::Compared);
    }

    #[test]
    fn test_manual_motion_invalidates_plan() {
        let mut session = calibrated_session();
        session.compare(3200).unwrap();
        session.notify_manual_motion();
        assert_eq!(session.stage(), Stage::Calibrated);
        assert!(session.compared().is_none());
        // and compare is now impossible until a new solve
        assert!(session.compare(3200).is_err());
    }

    #[test]
    fn test_new_image_coord_drops_stale_plan() {
        let mut session = calibrated_session();
        session.compare(3200).unwrap();
        session.set_image_coord(SkyCoord { ra: 57.0, dec: 24.0 });
        assert_eq!(session.stage(), Stage::Calibrated);
        assert!(session.compared().is_none());
        let result = session.compare(3200).unwrap();
        assert_eq!(result.plan, GotoPlan { az_steps: -480, alt_steps: 320 });
    }

    #[test]
    fn test_resolve_keeps_model_drops_plan() {
        let mut session = calibrated_session();
        session.compare(3200).unwrap();
        // direct field update, resolve_target itself needs a catalog file
        session.target = Some(target());
        session.compared = None;
        session.stage = if session.model.is_some() {
            Stage::Calibrated
        } else {
            Stage::TargetResolved
        };
        assert!(session.model().is_some());
        assert!(session.compared().is_none());
    }

    #[test]
    fn test_default_session_is_idle() {
        let session = Session::default();
        assert_eq!(session.stage(), Stage::Idle);
        assert!(session.target().is_none());
        assert!(!session.position_unknown());
    }

    #[test]
    fn test_goto_residual_failure_drops_position() {
        let mut session = calibrated_session();
        session.set_image_coord(SkyCoord { ra: 57.0, dec: 24.0 });
        session.compare(3200).unwrap();

        let mut link = RecordingLink { moves: Vec::new() };
        let events = EventSubscriptions::new();
        let result = session.goto(&mut link, &FailingCamera, &FailingSolver, 3200, &events);
        assert!(matches!(result, Err(Error::Aborted(_))));

        // both axes moved before the residual capture failed, so the
        // pre-move position must be gone and flagged as unknown
        assert_eq!(link.moves.len(), 2);
        assert_eq!(session.stage(), Stage::Calibrated);
        assert!(session.image_coord().is_none());
        assert!(session.position_unknown());
        assert!(session.compare(3200).is_err());
    }

    #[test]
    fn test_calibration_failure_drops_position() {
        let mut session = calibrated_session();
        session.compare(3200).unwrap();

        let mut link = RecordingLink { moves: Vec::new() };
        let events = EventSubscriptions::new();
        let result = session.calibrate(&mut link, &StubCamera, &FailingSolver, &events);
        assert!(matches!(result, Err(Error::SolveFailed(_))));

        // pulses were already issued, the old solved position and plan
        // are stale; the previous model stays in effect
        assert_eq!(session.stage(), Stage::Calibrated);
        assert!(session.model().is_some());
        assert!(session.image_coord().is_none());
        assert!(session.compared().is_none());
        assert!(session.position_unknown());
        assert!(session.compare(3200).is_err());
    }

    #[test]
    fn test_compared_result_fields() {
        let mut session = calibrated_session();
        session.set_image_coord(SkyCoord { ra: 58.85, dec: 23.1 });
        let result = session.compare(3200).unwrap();
        assert_eq!(result.target_mount, MountCoord { az: 56.85, alt: 24.1 });
        assert!(f64::abs(result.diff_ra - 2.0) < 1e-12);
        assert!(f64::abs(result.diff_dec - -1.0) < 1e-12);
        assert_eq!(result.plan.az_steps, -6400);
        assert_eq!(result.plan.alt_steps, 3200);
    }
}
