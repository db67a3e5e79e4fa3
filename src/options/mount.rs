use serde::{Serialize, Deserialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct MountOptions {
    // motor micro-steps in one fast-tier pulse block, must match the
    // step-per-pulse convention of the stepper firmware
    pub steps_per_pulse_block: u32,
}

impl Default for MountOptions {
    fn default() -> Self {
        Self {
            steps_per_pulse_block: 3200,
        }
    }
}

impl MountOptions {
    pub fn check(&self) -> anyhow::Result<()> {
        if self.steps_per_pulse_block == 0 {
            anyhow::bail!("Steps per pulse block must not be 0");
        }
        Ok(())
    }
}
