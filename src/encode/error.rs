//! Encode error types.

use super::data::MappingError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop an encode run.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Bad or missing invocation arguments. Raised before any filesystem access.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error on `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Failed to update global data")]
    Mapping(#[from] MappingError),
}
