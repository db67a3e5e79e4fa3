use std::path::PathBuf;

use serde::{Serialize, Deserialize};

#[derive(Serialize, Deserialize, Default, Debug, Clone, Copy, PartialEq)]
pub enum PlateSolverType {
    #[default]
    AstapCli,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct PlateSolverOptions {
    pub solver:        PlateSolverType,
    pub exe:           String,
    pub data_dir:      PathBuf, // star database directory
    pub search_radius: f64,     // in degrees
    pub fov:           f64,     // in degrees
}

impl Default for PlateSolverOptions {
    fn default() -> Self {
        Self {
            solver:        PlateSolverType::default(),
            exe:           "astap_cli".to_string(),
            data_dir:      PathBuf::from("/opt/astap"),
            search_radius: 15.0,
            fov:           0.5,
        }
    }
}

impl PlateSolverOptions {
    pub fn check(&self) -> anyhow::Result<()> {
        if self.exe.is_empty() {
            anyhow::bail!("Plate solver executable is empty");
        }
        if !(self.search_radius > 0.0 && self.search_radius <= 180.0) {
            anyhow::bail!("Plate solver search radius must be between 0 and 180 degrees");
        }
        if !(self.fov > 0.0) {
            anyhow::bail!("Plate solver field of view must be positive");
        }
        Ok(())
    }
}
