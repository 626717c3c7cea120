//! Error types for the editor

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Parse error: {0}")]
    Parse(#[from] schemaforge_parser::ParseError),

    #[error("Mutation error: {0}")]
    Mutation(#[from] crate::mutations::MutationError),

    #[error("Storage error: {0}")]
    Store(#[from] schemaforge_common::StoreError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Cannot close the last remaining tab")]
    LastTab,

    #[error("Tab index {index} out of range ({len} open)")]
    TabOutOfRange { index: usize, len: usize },
}
