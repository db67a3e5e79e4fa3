use std::path::PathBuf;

use serde::{Serialize, Deserialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct CatalogOptions {
    pub file: PathBuf,
}

impl Default for CatalogOptions {
    fn default() -> Self {
        Self {
            file: PathBuf::from("sac72/Sac72.txt"),
        }
    }
}
