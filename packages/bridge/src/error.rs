use thiserror::Error;

/// Failures talking to the conversion runtime
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Runtime failed to start: {0}")]
    Startup(String),

    #[error("Conversion failed: {0}")]
    Conversion(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type BridgeResult<T> = Result<T, BridgeError>;
