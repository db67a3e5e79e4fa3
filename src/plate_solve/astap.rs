use std::{path::Path, process::Command};

use once_cell::sync::OnceCell;
use regex::Regex;

use super::{PlateSolverIface, SolveHint};
use crate::{
    errors::{Error, Result},
    options::PlateSolverOptions,
    sky_math::{math::SkyCoord, sexagesimal::hms_dms_to_degrees},
};

pub struct AstapPlateSolver {
    options: PlateSolverOptions,
}

impl AstapPlateSolver {
    pub fn new(options: &PlateSolverOptions) -> Self {
        Self { options: options.clone() }
    }
}

impl PlateSolverIface for AstapPlateSolver {
    fn solve(&self, image: &Path, hint: &SolveHint) -> Result<SkyCoord> {
        let output = Command::new(&self.options.exe)
            .arg("-f").arg(image)
            .arg("-ra").arg(hint.ra_hours.to_string())
            .arg("-spd").arg(hint.spd.to_string())
            .arg("-r").arg(self.options.search_radius.to_string())
            .arg("-d").arg(&self.options.data_dir)
            .arg("-fov").arg(self.options.fov.to_string())
            .output()?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_solution(&stdout)
    }
}

/// Finds the single `Solution found` line in the solver output and
/// converts its RA/DEC pair to degrees. A solution line looks like
/// `Solution found: 00: 42  49.4 +41d 19  13`; every other line is
/// diagnostic noise.
fn parse_solution(output: &str) -> Result<SkyCoord> {
    static SOLUTION_RE: OnceCell<Regex> = OnceCell::new();
    let solution_re = SOLUTION_RE.get_or_init(|| {
        Regex::new(r"Solution found:?(.*)").unwrap()
    });
    let Some(caps) = output.lines().find_map(|line| solution_re.captures(line)) else {
        return Err(Error::SolveFailed("no solution in solver output".to_string()));
    };

    // normalize the mixed colon/letter delimiters into plain spaces
    let cleaned: String = caps[1].chars()
        .map(|chr| if chr == ':' || chr == 'd' { ' ' } else { chr })
        .collect();
    let fields: Vec<_> = cleaned.split_whitespace().collect();
    if fields.len() != 6 {
        return Err(Error::SolveFailed(
            format!("unexpected solution line `{}`", caps[1].trim())
        ));
    }

    let ra_txt = fields[..3].join(" ");
    let dec_txt = fields[3..].join(" ");
    let (ra, dec) = hms_dms_to_degrees(&ra_txt, &dec_txt)
        .map_err(|_| Error::SolveFailed(
            format!("can't parse solution `{}`", caps[1].trim())
        ))?;
    Ok(SkyCoord { ra, dec })
}
