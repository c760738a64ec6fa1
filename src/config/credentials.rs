//! Third-party API credentials.

use std::collections::BTreeMap;
use std::fmt;

use secrecy::{ExposeSecret, SecretString};

use super::ConfigError;
use crate::source::Pairs;

/// Providers the server is known to call.
pub const KNOWN_PROVIDERS: [&str; 4] = ["cloud_project_id", "maps_key", "search_key", "compute_key"];

/// Provider name to secret, read from `credentials.<provider>` keys.
#[derive(Clone, Default)]
pub struct Credentials {
    entries: BTreeMap<String, SecretString>,
}

impl Credentials {
    pub(crate) fn from_pairs(pairs: &Pairs) -> Result<Self, ConfigError> {
        let mut entries = BTreeMap::new();
        let mut spellings: BTreeMap<String, &str> = BTreeMap::new();
        for (key, value) in pairs {
            let Some(provider) = key.strip_prefix("credentials.") else {
                continue;
            };
            if provider.is_empty() || provider.contains('.') {
                return Err(ConfigError::invalid(
                    key.as_str(),
                    "credential keys must be `credentials.<provider>`",
                ));
            }
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            let name = normalize_provider(provider);
            if let Some(first) = spellings.insert(name.clone(), key.as_str()) {
                return Err(ConfigError::invalid(
                    key.as_str(),
                    format!("names the same provider as `{first}`"),
                ));
            }
            entries.insert(name, SecretString::from(value.to_string()));
        }
        Ok(Self { entries })
    }

    /// Looks up a provider's secret; `maps-key` and `Maps_Key` match `maps_key`.
    pub fn get(&self, provider: &str) -> Result<&str, ConfigError> {
        self.entries
            .get(&normalize_provider(provider))
            .map(|s| s.expose_secret())
            .ok_or_else(|| ConfigError::UnknownProvider(provider.to_string()))
    }

    pub fn contains(&self, provider: &str) -> bool {
        self.entries.contains_key(&normalize_provider(provider))
    }

    pub fn providers(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Well-known providers that are not configured.
    pub fn missing_known(&self) -> Vec<&'static str> {
        KNOWN_PROVIDERS
            .into_iter()
            .filter(|p| !self.entries.contains_key(*p))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&str, &SecretString)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

fn normalize_provider(provider: &str) -> String {
    provider.trim().to_ascii_lowercase().replace('-', "_")
}

impl PartialEq for Credentials {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .zip(&other.entries)
                .all(|((ka, va), (kb, vb))| ka == kb && va.expose_secret() == vb.expose_secret())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.keys().map(|k| (k, "[REDACTED]")))
            .finish()
    }
}
