use thiserror::Error;

/// Failures of a persisted state store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid key '{0}'")]
    InvalidKey(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
