use serde::{Serialize, Deserialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct LinkOptions {
    pub device:      String,
    pub baud_rate:   u32,
    pub ack_timeout: u32, // in seconds
}

impl Default for LinkOptions {
    fn default() -> Self {
        Self {
            device:      "/dev/ttyACM0".to_string(),
            baud_rate:   9600,
            ack_timeout: 30,
        }
    }
}

impl LinkOptions {
    pub fn check(&self) -> anyhow::Result<()> {
        if self.device.is_empty() {
            anyhow::bail!("Motor link device is empty");
        }
        if self.baud_rate == 0 {
            anyhow::bail!("Motor link baud rate must not be 0");
        }
        if !(1..=600).contains(&self.ack_timeout) {
            anyhow::bail!("Motor link ack timeout must be between 1 and 600 seconds");
        }
        Ok(())
    }
}
