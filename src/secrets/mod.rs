//! Secret references in configuration values.
//!
//! A value that is exactly `$ENV{NAME}` or `$FILE{/run/secrets/name}` is
//! replaced by the referenced text before the configuration is parsed, so
//! persisted sources never need to hold the secret itself.

mod env_provider;
mod file_provider;
mod resolver;

pub use env_provider::EnvSecretProvider;
pub use file_provider::FileSecretProvider;
pub use resolver::SecretResolver;

use std::fmt;

use tracing::warn;

use crate::source::Pairs;

/// The kind of secret reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SecretRefKind {
    /// `$ENV{VAR_NAME}`
    Env,
    /// `$FILE{path}`
    File,
}

impl SecretRefKind {
    fn marker(self) -> &'static str {
        match self {
            SecretRefKind::Env => "$ENV{",
            SecretRefKind::File => "$FILE{",
        }
    }
}

impl fmt::Display for SecretRefKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecretRefKind::Env => write!(f, "env"),
            SecretRefKind::File => write!(f, "file"),
        }
    }
}

/// A parsed reference to an external secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretRef {
    pub kind: SecretRefKind,
    /// Variable name or file path.
    pub key: String,
}

impl SecretRef {
    /// Parses a whole value as a reference. Anything that is not exactly one
    /// reference is a literal and yields `None`.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        [SecretRefKind::Env, SecretRefKind::File]
            .into_iter()
            .find_map(|kind| {
                let key = value.strip_prefix(kind.marker())?.strip_suffix('}')?.trim();
                if key.is_empty() || key.contains('}') {
                    return None;
                }
                Some(SecretRef {
                    kind,
                    key: key.to_string(),
                })
            })
    }
}

impl fmt::Display for SecretRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}}}", self.kind.marker(), self.key)
    }
}

/// Result of resolving a single secret reference.
#[derive(Debug, Clone)]
pub enum SecretResolution {
    Resolved(String),
    Failed(String),
    NotFound(String),
}

impl SecretResolution {
    pub fn is_resolved(&self) -> bool {
        matches!(self, SecretResolution::Resolved(_))
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            SecretResolution::Failed(msg) | SecretResolution::NotFound(msg) => Some(msg),
            SecretResolution::Resolved(_) => None,
        }
    }
}

/// Resolves references of one kind.
pub trait SecretProvider: Send + Sync {
    fn kind(&self) -> SecretRefKind;

    /// Display name for logging.
    fn name(&self) -> &str;

    fn resolve(&self, key: &str) -> SecretResolution;
}

/// Whether values under `key` are secrets.
pub fn is_secret_key(key: &str) -> bool {
    matches!(key, "openai_api_key" | "azure_api_key") || key.starts_with("credentials.")
}

/// Masks a secret for display, keeping two characters at each end of
/// longer values.
pub fn redact_secret(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 6 {
        return "***".to_string();
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{head}…{tail}")
}

/// Logs a warning for every secret field holding literal text.
pub(crate) fn warn_plaintext_secrets(source: &str, pairs: &Pairs) {
    for (key, value) in pairs {
        if is_secret_key(key) && !value.trim().is_empty() && SecretRef::parse(value).is_none() {
            warn!(
                source,
                field = %key,
                "secret stored as plaintext; use $ENV{{..}} or $FILE{{..}} instead"
            );
        }
    }
}
