//! Per-descriptor error types.
//!
//! None of these stop a compile run: the pipeline logs them and moves on to
//! the next descriptor.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("Cannot stat `{0}`")]
    Stat(PathBuf, #[source] std::io::Error),

    #[error("Cannot read `{0}`")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("Cannot parse `{0}`")]
    Parse(PathBuf, #[source] serde_yaml::Error),

    /// The generator has not produced markup for this descriptor.
    #[error("Missing generated markup `{0}`")]
    MissingArtifact(PathBuf, #[source] std::io::Error),
}
