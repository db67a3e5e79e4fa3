#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Can't parse coordinate `{0}`")]
    Parse(String),

    #[error("Object `{0}` not found in catalog")]
    NotFound(String),

    #[error("Plate solving failed: {0}")]
    SolveFailed(String),

    #[error("No answer from motor link while waiting for {0}")]
    LinkTimeout(String),

    #[error("{0}")]
    Aborted(String),

    #[error("IO error: `{0}`")]
    Io(#[from] std::io::Error),

    #[error("JSON error: `{0}`")]
    Json(#[from] serde_json::Error),

    #[error("Catalog error: `{0}`")]
    Csv(#[from] csv::Error),

    #[error("Serial port error: `{0}`")]
    Serial(#[from] serialport::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
