pub mod link;
pub use link::*;

pub mod camera;
pub use camera::*;

pub mod plate_solver;
pub use plate_solver::*;

pub mod catalog;
pub use catalog::*;

pub mod mount;
pub use mount::*;

use serde::{Serialize, Deserialize};

#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(default)]
pub struct Options {
    pub link:         LinkOptions,
    pub cam:          CamOptions,
    pub plate_solver: PlateSolverOptions,
    pub catalog:      CatalogOptions,
    pub mount:        MountOptions,
}

impl Options {
    pub fn check(&self) -> anyhow::Result<()> {
        self.link.check()?;
        self.plate_solver.check()?;
        self.mount.check()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_round_trip() {
        let options = Options::default();
        let json = serde_json::to_string_pretty(&options).unwrap();
        let restored: Options = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.link.device, options.link.device);
        assert_eq!(restored.link.baud_rate, options.link.baud_rate);
        assert_eq!(restored.mount.steps_per_pulse_block, options.mount.steps_per_pulse_block);
        assert!(restored.plate_solver.search_radius == options.plate_solver.search_radius);
    }

    #[test]
    fn test_missing_fields_get_defaults() {
        let restored: Options = serde_json::from_str("{}").unwrap();
        assert_eq!(restored.link.baud_rate, 9600);
        assert_eq!(restored.mount.steps_per_pulse_block, 3200);
    }

    #[test]
    fn test_default_options_pass_check() {
        assert!(Options::default().check().is_ok());
    }
}
