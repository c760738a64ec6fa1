//! File-mounted secret provider (`$FILE{/run/secrets/name}`).

use std::fs;
use std::io;

use super::{SecretProvider, SecretRefKind, SecretResolution};

/// Reads a secret from a file, dropping one trailing newline.
#[derive(Debug, Default)]
pub struct FileSecretProvider;

impl FileSecretProvider {
    pub fn new() -> Self {
        Self
    }
}

impl SecretProvider for FileSecretProvider {
    fn kind(&self) -> SecretRefKind {
        SecretRefKind::File
    }

    fn name(&self) -> &str {
        "file"
    }

    fn resolve(&self, key: &str) -> SecretResolution {
        match fs::read_to_string(key) {
            Ok(content) => {
                let value = content
                    .strip_suffix("\r\n")
                    .or_else(|| content.strip_suffix('\n'))
                    .unwrap_or(&content);
                if value.is_empty() {
                    SecretResolution::NotFound(format!("secret file '{key}' is empty"))
                } else {
                    SecretResolution::Resolved(value.to_string())
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                SecretResolution::NotFound(format!("secret file '{key}' does not exist"))
            }
            Err(e) => SecretResolution::Failed(format!("failed to read secret file '{key}': {e}")),
        }
    }
}
