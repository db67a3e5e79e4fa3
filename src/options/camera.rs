use std::path::PathBuf;

use serde::{Serialize, Deserialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct CamOptions {
    pub capture_cmd: String,  // gets the camera config file and the output image as arguments
    pub detect_cmd:  String,  // camera is considered present when its stdout is not empty
    pub conf_file:   PathBuf,
    pub image_file:  PathBuf, // where captured images are written
}

impl Default for CamOptions {
    fn default() -> Self {
        Self {
            capture_cmd: "zwo-asi-capture".to_string(),
            detect_cmd:  "zwo-asi-print".to_string(),
            conf_file:   PathBuf::from("zwo_asi.toml"),
            image_file:  PathBuf::from("calibration_image.png"),
        }
    }
}
