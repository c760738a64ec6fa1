//! Rendering a loaded configuration back to source formats.
//!
//! [`Config::to_pairs`] produces exactly the keys `Config::from_pairs`
//! reads, so an export reloads to an equal configuration.

use std::fmt;
use std::str::FromStr;

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_yaml::{Mapping, Value};

use super::{Config, ExportError, ModelProvider, ModelTier};
use crate::secrets::redact_secret;
use crate::source::{EnvSource, Pairs};

impl Config {
    /// All settings as flat pairs, secrets included.
    pub fn to_pairs(&self) -> Pairs {
        self.pairs_with(|s| s.expose_secret().to_string())
    }

    /// All settings as flat pairs with secrets masked.
    pub fn to_redacted_pairs(&self) -> Pairs {
        self.pairs_with(|s| redact_secret(s.expose_secret()))
    }

    fn pairs_with(&self, secret: impl Fn(&SecretString) -> String) -> Pairs {
        let mut pairs = Pairs::new();

        pairs.insert(
            "use_azure_provider".to_string(),
            self.use_azure_provider().to_string(),
        );
        match &self.model_provider {
            ModelProvider::OpenAi { api_key } => {
                pairs.insert("openai_api_key".to_string(), secret(api_key));
            }
            ModelProvider::Azure(azure) => {
                pairs.insert("azure_api_key".to_string(), secret(&azure.api_key));
                pairs.insert("azure_api_base".to_string(), azure.api_base.to_string());
                for tier in ModelTier::ALL {
                    pairs.insert(tier.deployment_key(), azure.deployment(tier).to_string());
                }
            }
        }

        if let Some(id) = &self.telemetry_spreadsheet_id {
            pairs.insert("telemetry_spreadsheet_id".to_string(), id.clone());
        }

        pairs.insert(
            "clear_state_on_start".to_string(),
            self.dev.clear_state_on_start.to_string(),
        );
        pairs.insert(
            "clear_cache_on_start".to_string(),
            self.dev.clear_cache_on_start.to_string(),
        );
        pairs.insert("bypass_auth".to_string(), self.dev.bypass_auth.to_string());

        for (provider, value) in self.credentials.iter() {
            pairs.insert(format!("credentials.{provider}"), secret(value));
        }

        let prefix = match self.environment {
            Some(env) => {
                pairs.insert("environment".to_string(), env.to_string());
                format!("{}.", env.profile_key())
            }
            None => String::new(),
        };
        pairs.insert(
            format!("{prefix}database_uri"),
            self.profile.database_uri.clone(),
        );
        pairs.insert(
            format!("{prefix}server_port"),
            self.profile.server_port.to_string(),
        );
        pairs.insert(
            format!("{prefix}path_prefix"),
            self.profile.path_prefix.clone(),
        );

        pairs
    }

    /// YAML document loadable by `FileSource`.
    pub fn to_yaml(&self) -> Result<String, ExportError> {
        ExportFormat::Yaml.render(&self.to_pairs(), &EnvSource::default())
    }

    /// JSON document loadable by `FileSource` from a `.json` file.
    pub fn to_json(&self) -> Result<String, ExportError> {
        ExportFormat::Json.render(&self.to_pairs(), &EnvSource::default())
    }

    /// Dotenv lines for an `EnvSource` with the given prefix.
    pub fn to_dotenv(&self, prefix: &str) -> Result<String, ExportError> {
        ExportFormat::Dotenv.render(&self.to_pairs(), &EnvSource::new(prefix))
    }

    /// Log-safe view of the configuration.
    pub fn summary(&self) -> Summary {
        let azure = self.model_provider.azure();
        Summary {
            model_provider: self.model_provider.label(),
            api_key: redact_secret(self.model_provider.api_key().expose_secret()),
            azure_api_base: azure.map(|a| a.api_base.to_string()),
            azure_deployments: azure
                .map(|a| {
                    ModelTier::ALL
                        .into_iter()
                        .map(|t| (t.label(), a.deployment(t).to_string()))
                        .collect()
                })
                .unwrap_or_default(),
            environment: self
                .environment
                .map_or_else(|| "inline".to_string(), |e| e.to_string()),
            database_uri: self.profile.database_uri.clone(),
            server_port: self.profile.server_port,
            path_prefix: self.profile.path_prefix.clone(),
            telemetry_spreadsheet_id: self.telemetry_spreadsheet_id.clone(),
            clear_state_on_start: self.dev.clear_state_on_start,
            clear_cache_on_start: self.dev.clear_cache_on_start,
            bypass_auth: self.dev.bypass_auth,
            credentials: self.credentials.providers().map(str::to_string).collect(),
        }
    }
}

/// Redacted overview of a loaded configuration.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub model_provider: &'static str,
    pub api_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub azure_api_base: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub azure_deployments: Vec<(&'static str, String)>,
    pub environment: String,
    pub database_uri: String,
    pub server_port: u16,
    pub path_prefix: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telemetry_spreadsheet_id: Option<String>,
    pub clear_state_on_start: bool,
    pub clear_cache_on_start: bool,
    pub bypass_auth: bool,
    /// Configured provider names, never their values.
    pub credentials: Vec<String>,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "model provider:   {} (key {})", self.model_provider, self.api_key)?;
        if let Some(base) = &self.azure_api_base {
            writeln!(f, "azure api base:   {base}")?;
        }
        for (tier, deployment) in &self.azure_deployments {
            writeln!(f, "  {tier:<6} -> {deployment}")?;
        }
        writeln!(f, "environment:      {}", self.environment)?;
        writeln!(f, "database uri:     {}", self.database_uri)?;
        writeln!(f, "server port:      {}", self.server_port)?;
        writeln!(f, "path prefix:      {:?}", self.path_prefix)?;
        if let Some(id) = &self.telemetry_spreadsheet_id {
            writeln!(f, "telemetry sheet:  {id}")?;
        }
        writeln!(
            f,
            "dev flags:        clear_state={} clear_cache={} bypass_auth={}",
            self.clear_state_on_start, self.clear_cache_on_start, self.bypass_auth
        )?;
        write!(f, "credentials:      [{}]", self.credentials.join(", "))
    }
}

/// Output format for [`ExportFormat::render`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Yaml,
    Json,
    /// `PREFIX_KEY='value'` lines, read back by `EnvSource` once loaded with dotenvy.
    Dotenv,
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Ok(ExportFormat::Yaml),
            "json" => Ok(ExportFormat::Json),
            "dotenv" | "env" => Ok(ExportFormat::Dotenv),
            other => Err(format!("unknown export format `{other}`, expected yaml, json or dotenv")),
        }
    }
}

impl ExportFormat {
    pub fn render(self, pairs: &Pairs, env: &EnvSource) -> Result<String, ExportError> {
        match self {
            ExportFormat::Yaml => Ok(serde_yaml::to_string(&Value::Mapping(nest(pairs)))?),
            ExportFormat::Json => Ok(serde_json::to_string_pretty(&Value::Mapping(nest(pairs)))?),
            ExportFormat::Dotenv => Ok(pairs
                .iter()
                .map(|(k, v)| format!("{}={}\n", env.var_for(k), quote_dotenv(v)))
                .collect()),
        }
    }
}

/// Turns dotted keys back into nested mappings.
fn nest(pairs: &Pairs) -> Mapping {
    let mut root = Mapping::new();
    for (key, value) in pairs {
        let parts: Vec<&str> = key.split('.').collect();
        insert_path(&mut root, &parts, typed_scalar(value));
    }
    root
}

fn insert_path(map: &mut Mapping, parts: &[&str], value: Value) {
    let Some((head, rest)) = parts.split_first() else {
        return;
    };
    let key = Value::String((*head).to_string());
    if rest.is_empty() {
        map.insert(key, value);
        return;
    }
    if !matches!(map.get(&key), Some(Value::Mapping(_))) {
        map.insert(key.clone(), Value::Mapping(Mapping::new()));
    }
    if let Some(Value::Mapping(child)) = map.get_mut(&key) {
        insert_path(child, rest, value);
    }
}

/// Booleans and plain integers render unquoted; everything else stays a
/// string. Integers with leading zeros stay strings so they reload unchanged.
fn typed_scalar(value: &str) -> Value {
    match value {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        v if is_plain_integer(v) => v
            .parse::<u64>()
            .map(|n| Value::Number(n.into()))
            .unwrap_or_else(|_| Value::String(v.to_string())),
        v => Value::String(v.to_string()),
    }
}

fn is_plain_integer(v: &str) -> bool {
    !v.is_empty() && v.bytes().all(|b| b.is_ascii_digit()) && (v == "0" || !v.starts_with('0'))
}

/// Single quotes keep `$` literal; values containing `'` fall back to
/// escaped double quotes.
fn quote_dotenv(value: &str) -> String {
    if !value.contains(['\'', '\n']) {
        return format!("'{value}'");
    }
    let escaped = value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('$', "\\$")
        .replace('\n', "\\n");
    format!("\"{escaped}\"")
}
