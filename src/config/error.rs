//! Configuration error types.

use thiserror::Error;

use crate::source::SourceError;

/// Configuration loading error.
///
/// Everything except [`ConfigError::UnknownProvider`] is raised by `load`
/// and is meant to abort startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required field `{0}`")]
    MissingField(String),
    #[error("invalid value for `{field}`: {reason}")]
    InvalidValue { field: String, reason: String },
    #[error("no deployment profile selected: {0}")]
    NoProfileSelected(String),
    #[error("unknown credential provider `{0}`")]
    UnknownProvider(String),
    #[error("unresolved secret reference in `{field}`: {reason}")]
    UnresolvedSecret { field: String, reason: String },
    #[error("config source `{source_name}` failed after {attempts} attempt(s): {error}")]
    Source {
        source_name: String,
        attempts: u32,
        #[source]
        error: SourceError,
    },
}

impl ConfigError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Name of the field the error is about, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            ConfigError::MissingField(field)
            | ConfigError::InvalidValue { field, .. }
            | ConfigError::UnresolvedSecret { field, .. } => Some(field),
            _ => None,
        }
    }
}

/// Error rendering a configuration export.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to render yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("failed to render json: {0}")]
    Json(#[from] serde_json::Error),
}
