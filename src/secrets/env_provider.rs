//! Environment variable secret provider.
//!
//! Resolves `$ENV{VAR_NAME}` references by reading from the process environment.

use std::env;

use super::{SecretProvider, SecretRefKind, SecretResolution};

/// Resolves secrets from environment variables.
#[derive(Debug, Default)]
pub struct EnvSecretProvider;

impl EnvSecretProvider {
    pub fn new() -> Self {
        Self
    }
}

impl SecretProvider for EnvSecretProvider {
    fn kind(&self) -> SecretRefKind {
        SecretRefKind::Env
    }

    fn name(&self) -> &str {
        "env"
    }

    fn resolve(&self, key: &str) -> SecretResolution {
        match env::var(key) {
            Ok(value) if !value.is_empty() => SecretResolution::Resolved(value),
            Ok(_) => SecretResolution::NotFound(format!(
                "environment variable '{key}' is set but empty"
            )),
            Err(env::VarError::NotPresent) => {
                SecretResolution::NotFound(format!("environment variable '{key}' is not set"))
            }
            Err(env::VarError::NotUnicode(_)) => SecretResolution::Failed(format!(
                "environment variable '{key}' is not valid unicode"
            )),
        }
    }
}
