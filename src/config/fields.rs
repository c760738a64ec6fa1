//! Typed reads from raw pairs.

use url::Url;

use super::ConfigError;
use crate::source::Pairs;

/// Reads typed values from pairs, optionally below a dotted prefix.
///
/// Blank values count as absent.
pub(crate) struct Fields<'a> {
    pairs: &'a Pairs,
    prefix: String,
}

impl<'a> Fields<'a> {
    pub(crate) fn new(pairs: &'a Pairs) -> Self {
        Self {
            pairs,
            prefix: String::new(),
        }
    }

    pub(crate) fn scoped(pairs: &'a Pairs, prefix: &str) -> Self {
        Self {
            pairs,
            prefix: format!("{prefix}."),
        }
    }

    pub(crate) fn key(&self, name: &str) -> String {
        format!("{}{}", self.prefix, name)
    }

    pub(crate) fn raw(&self, name: &str) -> Option<&'a str> {
        self.pairs
            .get(&self.key(name))
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.raw(name).is_some()
    }

    pub(crate) fn required_str(&self, name: &str) -> Result<String, ConfigError> {
        self.raw(name)
            .map(str::to_string)
            .ok_or_else(|| ConfigError::MissingField(self.key(name)))
    }

    pub(crate) fn optional_str(&self, name: &str) -> Option<String> {
        self.raw(name).map(str::to_string)
    }

    pub(crate) fn required_bool(&self, name: &str) -> Result<bool, ConfigError> {
        match self.raw(name) {
            Some(raw) => self.to_bool(name, raw),
            None => Err(ConfigError::MissingField(self.key(name))),
        }
    }

    pub(crate) fn bool_or(&self, name: &str, default: bool) -> Result<bool, ConfigError> {
        match self.raw(name) {
            Some(raw) => self.to_bool(name, raw),
            None => Ok(default),
        }
    }

    pub(crate) fn required_port(&self, name: &str) -> Result<u16, ConfigError> {
        let raw = self
            .raw(name)
            .ok_or_else(|| ConfigError::MissingField(self.key(name)))?;
        parse_port(raw).map_err(|reason| ConfigError::invalid(self.key(name), reason))
    }

    /// An absolute `http` or `https` URL.
    pub(crate) fn required_http_url(&self, name: &str) -> Result<Url, ConfigError> {
        let raw = self
            .raw(name)
            .ok_or_else(|| ConfigError::MissingField(self.key(name)))?;
        let url = Url::parse(raw).map_err(|e| ConfigError::invalid(self.key(name), e.to_string()))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ConfigError::invalid(
                self.key(name),
                format!("unsupported scheme `{other}`, expected http or https"),
            )),
        }
    }

    fn to_bool(&self, name: &str, raw: &str) -> Result<bool, ConfigError> {
        parse_bool(raw).ok_or_else(|| {
            ConfigError::invalid(self.key(name), format!("expected a boolean, got `{raw}`"))
        })
    }
}

pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

pub(crate) fn parse_port(raw: &str) -> Result<u16, String> {
    let port: i64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("expected an integer port, got `{raw}`"))?;
    if !(1..=65535).contains(&port) {
        return Err(format!("port {port} is outside 1-65535"));
    }
    Ok(port as u16)
}
