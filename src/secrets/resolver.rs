//! Rewrites secret references in fetched pairs.

use tracing::{debug, info};

use super::{
    EnvSecretProvider, FileSecretProvider, SecretProvider, SecretRef, SecretResolution,
};
use crate::config::ConfigError;
use crate::source::Pairs;

/// Dispatches references to the provider registered for their kind.
pub struct SecretResolver {
    providers: Vec<Box<dyn SecretProvider>>,
}

impl SecretResolver {
    /// A resolver with no providers; every reference fails.
    pub fn empty() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Registers a provider. A later provider for the same kind replaces
    /// the earlier one.
    pub fn with_provider(mut self, provider: impl SecretProvider + 'static) -> Self {
        self.providers.retain(|p| p.kind() != provider.kind());
        self.providers.push(Box::new(provider));
        self
    }

    /// Replaces every reference in `pairs` with its resolved value.
    ///
    /// Returns the number of references resolved.
    pub fn resolve_pairs(&self, pairs: &mut Pairs) -> Result<usize, ConfigError> {
        let resolved = self.resolve_matching(pairs, |_| true)?;
        if resolved > 0 {
            info!(resolved, "secret references resolved");
        }
        Ok(resolved)
    }

    /// Replaces references only in keys accepted by `wanted`; references in
    /// other keys are left as written.
    pub fn resolve_matching(
        &self,
        pairs: &mut Pairs,
        wanted: impl Fn(&str) -> bool,
    ) -> Result<usize, ConfigError> {
        let mut resolved = 0;
        for (field, value) in pairs.iter_mut() {
            let Some(secret_ref) = SecretRef::parse(value) else {
                continue;
            };
            if !wanted(field) {
                debug!(field = %field, "secret reference on unused key left unresolved");
                continue;
            }

            let provider = self
                .providers
                .iter()
                .find(|p| p.kind() == secret_ref.kind)
                .ok_or_else(|| ConfigError::UnresolvedSecret {
                    field: field.clone(),
                    reason: format!("no provider registered for {} references", secret_ref.kind),
                })?;

            match provider.resolve(&secret_ref.key) {
                SecretResolution::Resolved(secret) => {
                    debug!(field = %field, provider = provider.name(), "secret reference resolved");
                    *value = secret;
                    resolved += 1;
                }
                failed => {
                    return Err(ConfigError::UnresolvedSecret {
                        field: field.clone(),
                        reason: failed.error_message().unwrap_or("unresolved").to_string(),
                    });
                }
            }
        }
        Ok(resolved)
    }
}

impl Default for SecretResolver {
    fn default() -> Self {
        Self::empty()
            .with_provider(EnvSecretProvider::new())
            .with_provider(FileSecretProvider::new())
    }
}
