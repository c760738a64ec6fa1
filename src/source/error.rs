//! Source fetch error types.

use std::io;

use thiserror::Error;

/// Error raised while fetching raw key/value pairs from a source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read config file: {0}")]
    Io(#[from] io::Error),
    #[error("failed to parse yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("failed to parse json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported value at `{key}`: {reason}")]
    Format { key: String, reason: String },
    #[error("provider unavailable: {0}")]
    Unavailable(String),
}

impl SourceError {
    /// Whether a later attempt could succeed without changing the data.
    pub fn is_transient(&self) -> bool {
        match self {
            SourceError::Unavailable(_) => true,
            SourceError::Io(e) => matches!(
                e.kind(),
                io::ErrorKind::Interrupted
                    | io::ErrorKind::TimedOut
                    | io::ErrorKind::WouldBlock
                    | io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
            ),
            SourceError::Yaml(_) | SourceError::Json(_) | SourceError::Format { .. } => false,
        }
    }
}
