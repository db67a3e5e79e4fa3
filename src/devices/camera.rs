use std::{path::PathBuf, process::Command};

use crate::{
    errors::{Error, Result},
    options::CamOptions,
};

/// Source of freshly captured frames for the solver.
pub trait FrameSource {
    /// Captures one image and returns its path.
    fn capture(&self) -> Result<PathBuf>;
}

/// External capture service: a command that gets the camera configuration
/// file and the output path and writes one image there. A separate detect
/// command reports whether a camera is attached at all.
pub struct CameraService {
    options: CamOptions,
}

impl CameraService {
    pub fn new(options: &CamOptions) -> Self {
        Self { options: options.clone() }
    }

    pub fn is_connected(&self) -> bool {
        match Command::new(&self.options.detect_cmd).output() {
            Ok(output) => !output.stdout.is_empty(),
            Err(err) => {
                log::warn!("Camera detect command failed: {}", err);
                false
            }
        }
    }
}

impl FrameSource for CameraService {
    fn capture(&self) -> Result<PathBuf> {
        log::debug!("Capturing image into {}", self.options.image_file.display());
        let status = Command::new(&self.options.capture_cmd)
            .arg(&self.options.conf_file)
            .arg(&self.options.image_file)
            .status()?;
        if !status.success() {
            return Err(Error::Aborted(
                format!("Image capture failed ({})", status)
            ));
        }
        if !self.options.image_file.is_file() {
            return Err(Error::Aborted(
                format!("Capture produced no file at {}", self.options.image_file.display())
            ));
        }
        Ok(self.options.image_file.clone())
    }
}
