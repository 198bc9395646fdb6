use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by the detection pipeline.
///
/// An empty result is not an error: a call that finds nothing returns empty
/// output sequences.
#[derive(Debug, Error)]
pub enum DetectError {
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Invalid tile configuration: {0}")]
    InvalidTileConfig(String),

    #[error("Malformed model output: {0}")]
    ModelOutputShape(String),

    #[error("Invalid detector configuration: {0}")]
    InvalidConfig(String),

    #[error("Image resize failed: {0}")]
    Resize(String),

    #[error("Model inference failed: {0}")]
    Model(#[from] anyhow::Error),

    #[error("Detection worker is not running")]
    WorkerDisconnected,

    #[error("Detection timed out after {0:?}")]
    Timeout(Duration),
}
