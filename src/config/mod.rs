//! Configuration loading and validation for the conversation server.
//!
//! A [`Config`] is built once at startup from a [`ConfigSource`], after
//! secret references are resolved, and is read-only afterwards. Required
//! keys depend on the provider branch chosen by `use_azure_provider` and on
//! the active deployment profile.

mod credentials;
mod defaults;
mod error;
mod export;
mod fields;
mod flags;
mod profile;
mod provider;

pub use credentials::{Credentials, KNOWN_PROVIDERS};
pub use defaults::{DEFAULT_SERVER_PORT, builtin_profile};
pub use error::{ConfigError, ExportError};
pub use export::{ExportFormat, Summary};
pub use flags::DevFlags;
pub use profile::{DeploymentProfile, Environment, normalize_path_prefix};
pub use provider::{AzureConfig, AzureDeployments, ModelProvider, ModelTier};

use tracing::{debug, info, warn};

use crate::secrets::SecretResolver;
use crate::source::{ConfigSource, Pairs, RetryPolicy, fetch_with_retry};
use fields::Fields;

/// Root configuration of the server.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    model_provider: ModelProvider,
    telemetry_spreadsheet_id: Option<String>,
    dev: DevFlags,
    credentials: Credentials,
    environment: Option<Environment>,
    profile: DeploymentProfile,
}

impl Config {
    /// Load configuration from `source` with the default retry policy and
    /// secret providers.
    pub fn load(source: &dyn ConfigSource) -> Result<Self, ConfigError> {
        ConfigLoader::new(source).load()
    }

    /// Build a configuration from already-resolved pairs.
    ///
    /// Secret references are not resolved here; use [`ConfigLoader`] for that.
    pub fn from_pairs(pairs: &Pairs) -> Result<Self, ConfigError> {
        let fields = Fields::new(pairs);

        let model_provider = ModelProvider::from_fields(&fields)?;
        let dev = DevFlags::from_fields(&fields)?;
        let credentials = Credentials::from_pairs(pairs)?;
        let (environment, profile) = profile::select_active(pairs)?;

        Ok(Self {
            model_provider,
            telemetry_spreadsheet_id: fields.optional_str("telemetry_spreadsheet_id"),
            dev,
            credentials,
            environment,
            profile,
        })
    }

    /// The selected deployment profile.
    ///
    /// Zero or several active profiles are rejected while loading, so a
    /// loaded configuration always has exactly one.
    pub fn active_profile(&self) -> &DeploymentProfile {
        &self.profile
    }

    /// Environment that selected the active profile; `None` for an inline profile.
    pub fn environment(&self) -> Option<Environment> {
        self.environment
    }

    /// Secret for a third-party provider.
    pub fn credential_for(&self, provider: &str) -> Result<&str, ConfigError> {
        self.credentials.get(provider)
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn model_provider(&self) -> &ModelProvider {
        &self.model_provider
    }

    pub fn use_azure_provider(&self) -> bool {
        self.model_provider.is_azure()
    }

    pub fn telemetry_spreadsheet_id(&self) -> Option<&str> {
        self.telemetry_spreadsheet_id.as_deref()
    }

    pub fn dev_flags(&self) -> DevFlags {
        self.dev
    }
}

/// Builder for a single configuration load.
///
/// Consumed by [`ConfigLoader::load`]; a loader cannot be reused.
pub struct ConfigLoader<'a> {
    source: &'a dyn ConfigSource,
    retry: RetryPolicy,
    resolver: SecretResolver,
    overrides: Pairs,
}

impl<'a> ConfigLoader<'a> {
    pub fn new(source: &'a dyn ConfigSource) -> Self {
        Self {
            source,
            retry: RetryPolicy::default(),
            resolver: SecretResolver::default(),
            overrides: Pairs::new(),
        }
    }

    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    pub fn secrets(mut self, resolver: SecretResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Overrides a key after fetching, before secrets are resolved.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides.insert(key.into(), value.into());
        self
    }

    pub fn load(self) -> Result<Config, ConfigError> {
        let source_name = self.source.name().to_string();
        let mut pairs = fetch_with_retry(self.source, &self.retry).map_err(|(error, attempts)| {
            ConfigError::Source {
                source_name: source_name.clone(),
                attempts,
                error,
            }
        })?;
        pairs.extend(self.overrides);

        let resolved = resolve_read_keys(&self.resolver, &mut pairs)?;
        if resolved > 0 {
            info!(resolved, "secret references resolved");
        }
        let config = Config::from_pairs(&pairs)?;

        let profile = config.active_profile();
        info!(
            source = %source_name,
            environment = config.environment.map_or("inline", Environment::as_str),
            server_port = profile.server_port,
            path_prefix = %profile.path_prefix,
            model_provider = config.model_provider.label(),
            credentials = config.credentials.len(),
            "configuration loaded"
        );

        if config.dev.any() {
            warn!(
                clear_state_on_start = config.dev.clear_state_on_start,
                clear_cache_on_start = config.dev.clear_cache_on_start,
                bypass_auth = config.dev.bypass_auth,
                "developer flags enabled"
            );
        }

        let missing = config.credentials.missing_known();
        if !missing.is_empty() {
            debug!(missing = ?missing, "well-known credentials not configured");
        }

        Ok(config)
    }
}

/// Resolves secret references in the keys `Config::from_pairs` will read.
///
/// Keys that pick the provider branch and the profile are resolved first.
/// The unused provider branch and inactive profiles keep their references
/// unresolved, so a dangling reference there cannot fail the load.
fn resolve_read_keys(
    resolver: &SecretResolver,
    pairs: &mut Pairs,
) -> Result<usize, ConfigError> {
    let mut resolved = resolver.resolve_matching(pairs, is_selector_key)?;

    let azure = Fields::new(pairs).raw("use_azure_provider").and_then(fields::parse_bool);
    // Errors here resurface from `from_pairs`, which runs the same selection
    let selection = profile::choose(pairs).ok();

    resolved += resolver.resolve_matching(pairs, |key| {
        if is_selector_key(key) {
            return false;
        }
        if key.starts_with("profiles.") || profile::is_inline_key(key) {
            return selection.is_some_and(|s| s.reads(key));
        }
        match (provider::branch_of(key), azure) {
            (Some(branch), Some(azure)) => branch == azure,
            _ => true,
        }
    })?;
    Ok(resolved)
}

fn is_selector_key(key: &str) -> bool {
    matches!(key, "environment" | "use_azure_provider")
        || key
            .strip_prefix("profiles.")
            .is_some_and(|rest| rest.ends_with(".active"))
}
