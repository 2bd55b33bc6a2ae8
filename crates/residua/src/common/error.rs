//! Common error types for residua.

use std::path::PathBuf;

use residua_transformers::{ArchitectureError, EncoderConfigError};
use thiserror::Error;

/// Errors that can occur while loading a checkpoint or embedding sequences.
#[derive(Debug, Error)]
pub enum ResiduaError {
    /// Checkpoint could not be read or parsed.
    #[error("Failed to load checkpoint {path:?}: {source}")]
    CheckpointLoad {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    /// The checkpoint's shape could not be recovered.
    #[error("Architecture inference failed: {0}")]
    ArchitectureInference(#[from] ArchitectureError),

    /// The inferred shape does not make a valid encoder.
    #[error("Encoder construction failed: {0}")]
    EncoderConstruction(#[from] EncoderConfigError),

    /// Tokenization or the forward pass failed.
    #[error("Inference failed: {0}")]
    Inference(#[from] anyhow::Error),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for residua operations.
pub type ResiduaResult<T> = Result<T, ResiduaError>;

impl ResiduaError {
    pub(crate) fn checkpoint(path: impl Into<PathBuf>, source: anyhow::Error) -> Self {
        ResiduaError::CheckpointLoad {
            path: path.into(),
            source,
        }
    }
}
