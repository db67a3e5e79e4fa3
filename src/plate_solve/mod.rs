use std::path::Path;

use astap::*;

use crate::{
    errors::Result,
    options::{PlateSolverOptions, PlateSolverType},
    sky_math::math::SkyCoord,
};

mod astap;

/// Expected position handed to the solver to narrow its search:
/// RA in whole hours and declination as south-pole distance in degrees.
#[derive(Debug, Clone, Copy)]
pub struct SolveHint {
    pub ra_hours: f64,
    pub spd:      f64,
}

pub struct PlateSolver {
    solver: Box<dyn PlateSolverIface + Sync + Send + 'static>,
}

impl PlateSolver {
    pub fn new(options: &PlateSolverOptions) -> Self {
        let solver = match options.solver {
            PlateSolverType::AstapCli =>
                Box::new(AstapPlateSolver::new(options)),
        };
        Self { solver }
    }
}

impl PlateSolverIface for PlateSolver {
    fn solve(&self, image: &Path, hint: &SolveHint) -> Result<SkyCoord> {
        log::debug!(
            "Solving {} with hint ra={}h spd={}deg",
            image.display(), hint.ra_hours, hint.spd
        );
        let coord = self.solver.solve(image, hint)?;
        log::debug!("Solution: ra={:.4} dec={:.4}", coord.ra, coord.dec);
        Ok(coord)
    }
}

pub trait PlateSolverIface {
    fn solve(&self, image: &Path, hint: &SolveHint) -> Result<SkyCoord>;
}
