//! Environment variable source.

use std::env;

use super::{ConfigSource, Pairs, SourceError};

/// Reads pairs from environment variables sharing a prefix.
///
/// `CONVOSCOPE_SERVER_PORT` maps to `server_port` and a double underscore
/// separates nesting levels, so `CONVOSCOPE_CREDENTIALS__MAPS_KEY` maps to
/// `credentials.maps_key`.
#[derive(Debug, Clone)]
pub struct EnvSource {
    name: String,
    prefix: String,
    vars: Option<Vec<(String, String)>>,
}

impl EnvSource {
    /// Default variable prefix.
    pub const DEFAULT_PREFIX: &'static str = "CONVOSCOPE_";

    /// Reads the process environment on every fetch.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            name: "env".to_string(),
            prefix: prefix.into(),
            vars: None,
        }
    }

    /// Uses an explicit variable list instead of the process environment.
    pub fn from_vars<I, K, V>(prefix: impl Into<String>, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            name: "env".to_string(),
            prefix: prefix.into(),
            vars: Some(
                vars.into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Validates a user-supplied prefix. An empty prefix would turn every
    /// process variable into a configuration key.
    pub fn parse_prefix(raw: &str) -> Result<String, String> {
        let prefix = raw.trim();
        if prefix.is_empty() {
            return Err("environment variable prefix must not be empty".to_string());
        }
        if prefix.contains('=') || prefix.chars().any(char::is_whitespace) {
            return Err(format!("invalid environment variable prefix `{raw}`"));
        }
        Ok(prefix.to_string())
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Converts a variable name to a dotted key, or `None` if the prefix
    /// does not match.
    pub fn key_for(&self, var: &str) -> Option<String> {
        let rest = var.strip_prefix(&self.prefix)?;
        if rest.is_empty() {
            return None;
        }
        Some(rest.split("__").collect::<Vec<_>>().join(".").to_lowercase())
    }

    /// Converts a dotted key back to its variable name.
    pub fn var_for(&self, key: &str) -> String {
        format!(
            "{}{}",
            self.prefix,
            key.split('.').collect::<Vec<_>>().join("__").to_uppercase()
        )
    }
}

impl Default for EnvSource {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PREFIX)
    }
}

impl ConfigSource for EnvSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> Result<Pairs, SourceError> {
        let vars: Vec<(String, String)> = match &self.vars {
            Some(vars) => vars.clone(),
            // Non-unicode variables cannot carry configuration, skip them
            None => env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
                .collect(),
        };

        Ok(vars
            .into_iter()
            .filter_map(|(var, value)| self.key_for(&var).map(|key| (key, value)))
            .collect())
    }
}
