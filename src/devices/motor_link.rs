use std::{
    io::{Read, Write},
    thread,
    time::{Duration, Instant},
};

use crate::{
    errors::{Error, Result},
    options::LinkOptions,
};

/// Line the firmware echoes after a completed fast-tier pulse block.
pub const DONE_SENTINEL: &str = "ARDUINO-DONE";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Azimuth,
    Altitude,
}

impl Axis {
    pub fn to_str(self) -> &'static str {
        match self {
            Self::Azimuth  => "azimuth",
            Self::Altitude => "altitude",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Positive,
    Negative,
}

impl Direction {
    pub fn to_str(self) -> &'static str {
        match self {
            Self::Positive => "+",
            Self::Negative => "-",
        }
    }
}

/// Fixed speed tiers of the stepper firmware. Only `Fast` pulses (the
/// "pulse block" used by calibration and go-to) are acknowledged with
/// the done sentinel; the slower tiers are fire-and-forget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedTier {
    Slow,
    Medium,
    Fast,
}

pub fn jog_command(axis: Axis, dir: Direction, tier: SpeedTier) -> u8 {
    use {Axis::*, Direction::*, SpeedTier::*};
    match (axis, dir, tier) {
        (Azimuth,  Positive, Slow)   => b'S',
        (Azimuth,  Positive, Medium) => b'Z',
        (Azimuth,  Positive, Fast)   => b'V',
        (Azimuth,  Negative, Slow)   => b'X',
        (Azimuth,  Negative, Medium) => b'A',
        (Azimuth,  Negative, Fast)   => b'C',
        (Altitude, Positive, Slow)   => b'I',
        (Altitude, Positive, Medium) => b'D',
        (Altitude, Positive, Fast)   => b'U',
        (Altitude, Negative, Slow)   => b'H',
        (Altitude, Negative, Medium) => b'E',
        (Altitude, Negative, Fast)   => b'J',
    }
}

/// Command byte initiating a parameterized move; the firmware then
/// expects the step count as an ASCII decimal string.
pub fn move_command(axis: Axis, dir: Direction) -> u8 {
    use {Axis::*, Direction::*};
    match (axis, dir) {
        (Azimuth,  Positive) => b'O',
        (Azimuth,  Negative) => b'P',
        (Altitude, Positive) => b'K',
        (Altitude, Negative) => b'L',
    }
}

pub fn focus_command(dir: Direction, tier: SpeedTier) -> u8 {
    use {Direction::*, SpeedTier::*};
    match (dir, tier) {
        (Positive, Slow)   => b'N',
        (Positive, Medium) => b'F',
        (Positive, Fast)   => b'R',
        (Negative, Slow)   => b'B',
        (Negative, Medium) => b'G',
        (Negative, Fast)   => b'T',
    }
}

pub trait MotorLink {
    /// One fixed-duration pulse on an axis. Fast-tier pulses block until
    /// the firmware confirms completion.
    fn jog(&mut self, axis: Axis, dir: Direction, tier: SpeedTier) -> Result<()>;

    /// The calibration unit of motion: one fast-tier pulse, confirmed.
    fn pulse_block(&mut self, axis: Axis, dir: Direction) -> Result<()> {
        self.jog(axis, dir, SpeedTier::Fast)
    }

    /// Parameterized move by `steps` motor micro-steps. The firmware
    /// confirms twice: motion started, then motion finished.
    fn move_steps(&mut self, axis: Axis, dir: Direction, steps: u32) -> Result<()>;

    fn focus(&mut self, dir: Direction, tier: SpeedTier) -> Result<()>;

    /// Requests one raw line of sensor readings.
    fn query_sensors(&mut self) -> Result<String>;
}

pub struct SerialLink {
    port:        Box<dyn serialport::SerialPort>,
    ack_timeout: Duration,
}

impl SerialLink {
    pub fn open(options: &LinkOptions) -> Result<Self> {
        log::info!(
            "Opening motor link at {} ({} baud)",
            options.device, options.baud_rate
        );
        let port = serialport::new(&options.device, options.baud_rate)
            .timeout(Duration::from_millis(100))
            .open()?;
        Ok(Self {
            port,
            ack_timeout: Duration::from_secs(u64::from(options.ack_timeout)),
        })
    }

    fn send_byte(&mut self, cmd: u8) -> Result<()> {
        log::debug!("motor link <- '{}'", cmd as char);
        self.port.write_all(&[cmd])?;
        Ok(())
    }

    /// Reads one non-empty text line, polling within the ack timeout.
    fn read_ack_line(&mut self, waiting_for: &str) -> Result<String> {
        let start = Instant::now();
        let mut line = Vec::new();
        let mut byte = [0u8; 1];
        loop {
            match self.port.read(&mut byte) {
                Ok(0) => {}
                Ok(_) => {
                    if byte[0] == b'\n' {
                        let text = String::from_utf8_lossy(&line).trim().to_string();
                        if !text.is_empty() {
                            log::debug!("motor link -> {}", text);
                            return Ok(text);
                        }
                        line.clear();
                    } else {
                        line.push(byte[0]);
                    }
                }
                Err(ref err) if err.kind() == std::io::ErrorKind::TimedOut => {}
                Err(err) => return Err(Error::Io(err)),
            }
            if start.elapsed() > self.ack_timeout {
                return Err(Error::LinkTimeout(waiting_for.to_string()));
            }
        }
    }
}

impl MotorLink for SerialLink {
    fn jog(&mut self, axis: Axis, dir: Direction, tier: SpeedTier) -> Result<()> {
        self.send_byte(jog_command(axis, dir, tier))?;
        if tier == SpeedTier::Fast {
            thread::sleep(Duration::from_millis(500));
            let waiting_for = format!("{}{} pulse block", axis.to_str(), dir.to_str());
            let line = self.read_ack_line(&waiting_for)?;
            if line == DONE_SENTINEL {
                // let the tube stop swinging before the next capture
                thread::sleep(Duration::from_secs(1));
            } else {
                log::warn!("Unexpected pulse block answer: {}", line);
            }
        }
        Ok(())
    }

    fn move_steps(&mut self, axis: Axis, dir: Direction, steps: u32) -> Result<()> {
        log::info!("Moving {}{} by {} steps", axis.to_str(), dir.to_str(), steps);
        self.send_byte(move_command(axis, dir))?;
        thread::sleep(Duration::from_millis(100));
        self.port.write_all(steps.to_string().as_bytes())?;
        thread::sleep(Duration::from_millis(1300));
        for phase in ["start", "finish"] {
            let waiting_for = format!("{} move {}", axis.to_str(), phase);
            let line = self.read_ack_line(&waiting_for)?;
            // the confirmation normally repeats the step count; anything
            // else still counts as an answer, the content is not guaranteed
            let confirms_steps = line.chars().last()
                .map(|chr| chr.is_ascii_digit())
                .unwrap_or(false);
            if !confirms_steps {
                log::warn!("Unexpected move answer: {}", line);
            }
        }
        Ok(())
    }

    fn focus(&mut self, dir: Direction, tier: SpeedTier) -> Result<()> {
        self.send_byte(focus_command(dir, tier))
    }

    fn query_sensors(&mut self) -> Result<String> {
        self.send_byte(b'Y')?;
        self.read_ack_line("sensor readings")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jog_command_bytes() {
        assert_eq!(jog_command(Axis::Azimuth, Direction::Positive, SpeedTier::Slow), b'S');
        assert_eq!(jog_command(Axis::Azimuth, Direction::Positive, SpeedTier::Fast), b'V');
        assert_eq!(jog_command(Axis::Azimuth, Direction::Negative, SpeedTier::Fast), b'C');
        assert_eq!(jog_command(Axis::Altitude, Direction::Positive, SpeedTier::Fast), b'U');
        assert_eq!(jog_command(Axis::Altitude, Direction::Negative, SpeedTier::Fast), b'J');
    }

    #[test]
    fn test_move_command_bytes() {
        assert_eq!(move_command(Axis::Azimuth, Direction::Negative), b'P');
        assert_eq!(move_command(Axis::Azimuth, Direction::Positive), b'O');
        assert_eq!(move_command(Axis::Altitude, Direction::Negative), b'L');
        assert_eq!(move_command(Axis::Altitude, Direction::Positive), b'K');
    }

    #[test]
    fn test_focus_command_bytes() {
        assert_eq!(focus_command(Direction::Positive, SpeedTier::Slow), b'N');
        assert_eq!(focus_command(Direction::Negative, SpeedTier::Fast), b'T');
    }
}
