//! Error types for transforms, pipelines and artifacts.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for transform operations.
pub type TransformResult<T> = Result<T, TransformError>;

/// Errors raised while building, running or persisting transforms.
#[derive(Debug, Error)]
pub enum TransformError {
    /// An image operation or parameter check failed.
    #[error(transparent)]
    Core(#[from] visaug_core::Error),

    /// I/O error reading or writing configs and artifacts.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (artifact body) error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML config error.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Artifact header is malformed.
    #[error("invalid artifact: {0}")]
    Artifact(String),

    /// Config or artifact file does not exist.
    #[error("file not found: {path}")]
    NotFound {
        /// Path that was looked up.
        path: PathBuf,
    },
}

impl TransformError {
    /// The core error behind this one, for matching on the taxonomy.
    pub fn kind(&self) -> Option<&visaug_core::Error> {
        match self {
            Self::Core(e) => Some(e),
            _ => None,
        }
    }
}

/// Shorthand for an [`visaug_core::Error::InvalidArgument`] wrapped as a transform error.
pub(crate) fn invalid(msg: impl Into<String>) -> TransformError {
    TransformError::Core(visaug_core::Error::InvalidArgument(msg.into()))
}
