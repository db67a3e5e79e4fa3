use serde::Deserialize;

use super::motor_link::MotorLink;
use crate::errors::Result;

pub const HUMIDITY_WARN:  f64 = 80.0; // in percents
pub const HUMIDITY_ALERT: f64 = 90.0;

/// Environmental readings of the mount electronics: stepper driver
/// temperature (LM35) plus intake/outflow/equatorial-table DHT22 pairs.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
pub struct SensorReadings {
    pub temp:       f64,
    pub t_intake:   f64,
    pub t_outflow:  f64,
    pub h_intake:   f64,
    pub h_outflow:  f64,
    pub t_eq_table: f64,
    pub h_eq_table: f64,
}

impl SensorReadings {
    /// The firmware answers bare `"name":value` pairs without enclosing
    /// braces; wrap them and decode as JSON.
    pub fn decode(line: &str) -> Result<Self> {
        let json = format!("{{{}}}", line.trim());
        Ok(serde_json::from_str(&json)?)
    }
}

pub fn read_sensors(link: &mut dyn MotorLink) -> Result<SensorReadings> {
    let line = link.query_sensors()?;
    SensorReadings::decode(&line)
}
