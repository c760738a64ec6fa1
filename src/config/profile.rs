//! Deployment profiles and active profile selection.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use url::Url;

use super::fields::Fields;
use super::{ConfigError, defaults};
use crate::source::Pairs;

const INLINE_KEYS: [&str; 3] = ["database_uri", "server_port", "path_prefix"];

/// Named deployment environments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Environment {
    Production,
    Dev,
    Dev2,
    Mit,
    Local,
}

impl Environment {
    pub const ALL: [Environment; 5] = [
        Environment::Production,
        Environment::Dev,
        Environment::Dev2,
        Environment::Mit,
        Environment::Local,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Production => "production",
            Environment::Dev => "dev",
            Environment::Dev2 => "dev2",
            Environment::Mit => "mit",
            Environment::Local => "local",
        }
    }

    /// Key prefix of this environment's declared profile.
    pub fn profile_key(self) -> String {
        format!("profiles.{}", self.as_str())
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Environment::Production),
            "dev" => Ok(Environment::Dev),
            "dev2" => Ok(Environment::Dev2),
            "mit" => Ok(Environment::Mit),
            "local" => Ok(Environment::Local),
            other => Err(format!(
                "unknown environment `{other}`, expected one of production, dev, dev2, mit, local"
            )),
        }
    }
}

/// Environment-specific server settings, selected as a unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentProfile {
    pub database_uri: String,
    pub server_port: u16,
    /// Empty, or a relative path ending in `/`.
    pub path_prefix: String,
}

impl DeploymentProfile {
    pub(crate) fn from_fields(fields: &Fields<'_>) -> Result<Self, ConfigError> {
        let database_uri = fields.required_str("database_uri")?;
        validate_database_uri(&database_uri)
            .map_err(|reason| ConfigError::invalid(fields.key("database_uri"), reason))?;

        let server_port = fields.required_port("server_port")?;

        let path_prefix = match fields.raw("path_prefix") {
            Some(raw) => normalize_path_prefix(raw)
                .map_err(|reason| ConfigError::invalid(fields.key("path_prefix"), reason))?,
            None => String::new(),
        };

        Ok(Self {
            database_uri,
            server_port,
            path_prefix,
        })
    }

    /// Absolute route for `path` under this profile's prefix.
    pub fn route(&self, path: &str) -> String {
        format!("/{}{}", self.path_prefix, path.trim_start_matches('/'))
    }
}

fn validate_database_uri(raw: &str) -> Result<(), String> {
    if !raw.contains("://") {
        return Err(format!("`{raw}` is not an absolute URI"));
    }
    Url::parse(raw).map(|_| ()).map_err(|e| e.to_string())
}

/// Normalizes a route prefix to empty or `seg/seg/`.
///
/// One leading `/` is dropped and a missing trailing `/` is added.
pub fn normalize_path_prefix(raw: &str) -> Result<String, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "/" {
        return Ok(String::new());
    }
    if trimmed.chars().any(char::is_whitespace) {
        return Err("path prefix must not contain whitespace".to_string());
    }

    let inner = trimmed.strip_prefix('/').unwrap_or(trimmed);
    let inner = inner.strip_suffix('/').unwrap_or(inner);
    for segment in inner.split('/') {
        if segment.is_empty() {
            return Err(format!("path prefix `{raw}` has an empty segment"));
        }
        if segment == "." || segment == ".." {
            return Err(format!("path prefix `{raw}` has a relative segment"));
        }
        if segment.contains(['?', '#', '\\']) {
            return Err(format!("path prefix `{raw}` has a reserved character"));
        }
    }
    Ok(format!("{inner}/"))
}

pub(crate) fn is_inline_key(key: &str) -> bool {
    INLINE_KEYS.contains(&key)
}

/// Which profile a source selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Selection {
    /// Top-level `database_uri` / `server_port` / `path_prefix`.
    Inline,
    /// A `profiles.<name>` block declared by the source.
    Declared(Environment),
    /// An environment the source names but does not declare.
    Builtin(Environment),
}

impl Selection {
    pub(crate) fn environment(self) -> Option<Environment> {
        match self {
            Selection::Inline => None,
            Selection::Declared(env) | Selection::Builtin(env) => Some(env),
        }
    }

    /// Whether `key` belongs to the selected profile.
    pub(crate) fn reads(self, key: &str) -> bool {
        match self {
            Selection::Inline => is_inline_key(key),
            Selection::Declared(env) => key
                .strip_prefix(env.profile_key().as_str())
                .is_some_and(|rest| rest.starts_with('.')),
            Selection::Builtin(_) => false,
        }
    }
}

/// Picks the single active profile without parsing it.
///
/// Candidates are the `environment` selector, an inline profile (top-level
/// `database_uri` / `server_port` / `path_prefix`) and declared profiles
/// with `profiles.<name>.active = true`.
pub(crate) fn choose(pairs: &Pairs) -> Result<Selection, ConfigError> {
    let fields = Fields::new(pairs);
    let selector = fields
        .raw("environment")
        .map(|raw| raw.parse::<Environment>())
        .transpose()
        .map_err(|reason| ConfigError::invalid("environment", reason))?;

    let declared = declared_profiles(pairs)?;
    let mut marked = Vec::new();
    for env in &declared {
        if Fields::scoped(pairs, &env.profile_key()).bool_or("active", false)? {
            marked.push(*env);
        }
    }
    let inline = INLINE_KEYS.iter().any(|k| fields.contains(k));

    if let Some(env) = selector {
        if inline {
            return Err(ConfigError::NoProfileSelected(format!(
                "`environment` selects {env} but an inline profile is also set"
            )));
        }
        if let Some(other) = marked.iter().find(|m| **m != env) {
            return Err(ConfigError::NoProfileSelected(format!(
                "`environment` selects {env} but profiles.{other} is marked active"
            )));
        }
        return Ok(if declared.contains(&env) {
            Selection::Declared(env)
        } else {
            Selection::Builtin(env)
        });
    }

    match (inline, marked.as_slice()) {
        (true, []) => Ok(Selection::Inline),
        (false, [env]) => Ok(Selection::Declared(*env)),
        (false, []) => Err(ConfigError::NoProfileSelected(
            "set `environment`, mark one profile active, or provide database_uri and server_port"
                .to_string(),
        )),
        (inline, marked) => {
            let mut names: Vec<String> = marked.iter().map(|e| format!("profiles.{e}")).collect();
            if inline {
                names.insert(0, "inline profile".to_string());
            }
            Err(ConfigError::NoProfileSelected(format!(
                "multiple profiles are active: {}",
                names.join(", ")
            )))
        }
    }
}

/// Picks and parses the single active profile. Only the winner is parsed.
pub(crate) fn select_active(
    pairs: &Pairs,
) -> Result<(Option<Environment>, DeploymentProfile), ConfigError> {
    let selection = choose(pairs)?;
    let profile = match selection {
        Selection::Inline => DeploymentProfile::from_fields(&Fields::new(pairs))?,
        Selection::Declared(env) => {
            DeploymentProfile::from_fields(&Fields::scoped(pairs, &env.profile_key()))?
        }
        Selection::Builtin(env) => defaults::builtin_profile(env),
    };
    Ok((selection.environment(), profile))
}

fn declared_profiles(pairs: &Pairs) -> Result<BTreeSet<Environment>, ConfigError> {
    let mut declared = BTreeSet::new();
    for key in pairs.keys() {
        let Some(rest) = key.strip_prefix("profiles.") else {
            continue;
        };
        let name = rest.split('.').next().unwrap_or_default();
        let env = name
            .parse::<Environment>()
            .map_err(|reason| ConfigError::invalid(format!("profiles.{name}"), reason))?;
        declared.insert(env);
    }
    Ok(declared)
}
