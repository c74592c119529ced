use std::io;

use thiserror::Error;

/// Error type for pipeline configuration, IO, and invariant failures.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("input source '{path}' is unreadable: {reason}")]
    SourceUnreadable { path: String, reason: String },
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("instance invariant violated: {0}")]
    Invariant(String),
}
