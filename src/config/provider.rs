//! AI model provider configuration.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};
use url::Url;

use super::ConfigError;
use super::fields::Fields;

/// Model capability tiers, one Azure deployment each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ModelTier {
    /// GPT-3.5 class.
    Base,
    /// GPT-4 class.
    Tier2,
    /// GPT-4o class.
    Tier3,
    /// GPT-4o-mini class.
    Tier4,
}

impl ModelTier {
    pub const ALL: [ModelTier; 4] = [
        ModelTier::Base,
        ModelTier::Tier2,
        ModelTier::Tier3,
        ModelTier::Tier4,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ModelTier::Base => "base",
            ModelTier::Tier2 => "tier2",
            ModelTier::Tier3 => "tier3",
            ModelTier::Tier4 => "tier4",
        }
    }

    /// Key holding this tier's deployment name.
    pub fn deployment_key(self) -> String {
        format!("azure_deployment_{}", self.label())
    }
}

impl fmt::Display for ModelTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Azure deployment names per model tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AzureDeployments {
    pub base: String,
    pub tier2: String,
    pub tier3: String,
    pub tier4: String,
}

impl AzureDeployments {
    pub fn get(&self, tier: ModelTier) -> &str {
        match tier {
            ModelTier::Base => &self.base,
            ModelTier::Tier2 => &self.tier2,
            ModelTier::Tier3 => &self.tier3,
            ModelTier::Tier4 => &self.tier4,
        }
    }
}

/// Azure OpenAI settings.
#[derive(Debug, Clone)]
pub struct AzureConfig {
    pub api_key: SecretString,
    pub api_base: Url,
    pub deployments: AzureDeployments,
}

impl AzureConfig {
    pub fn deployment(&self, tier: ModelTier) -> &str {
        self.deployments.get(tier)
    }
}

impl PartialEq for AzureConfig {
    fn eq(&self, other: &Self) -> bool {
        self.api_key.expose_secret() == other.api_key.expose_secret()
            && self.api_base == other.api_base
            && self.deployments == other.deployments
    }
}

/// Which provider branch reads `key`: `Some(true)` for Azure, `Some(false)`
/// for OpenAI, `None` for keys outside both branches.
pub(crate) fn branch_of(key: &str) -> Option<bool> {
    match key {
        "openai_api_key" => Some(false),
        "azure_api_key" | "azure_api_base" => Some(true),
        k if ModelTier::ALL.iter().any(|t| t.deployment_key() == k) => Some(true),
        _ => None,
    }
}

/// The selected AI credential branch. Only the active branch is stored.
#[derive(Debug, Clone)]
pub enum ModelProvider {
    OpenAi { api_key: SecretString },
    Azure(AzureConfig),
}

impl ModelProvider {
    /// Reads the branch chosen by `use_azure_provider`, requiring only that
    /// branch's fields.
    pub(crate) fn from_fields(fields: &Fields<'_>) -> Result<Self, ConfigError> {
        if fields.required_bool("use_azure_provider")? {
            let api_key = SecretString::from(fields.required_str("azure_api_key")?);
            let api_base = fields.required_http_url("azure_api_base")?;
            let deployments = AzureDeployments {
                base: fields.required_str(&ModelTier::Base.deployment_key())?,
                tier2: fields.required_str(&ModelTier::Tier2.deployment_key())?,
                tier3: fields.required_str(&ModelTier::Tier3.deployment_key())?,
                tier4: fields.required_str(&ModelTier::Tier4.deployment_key())?,
            };
            Ok(ModelProvider::Azure(AzureConfig {
                api_key,
                api_base,
                deployments,
            }))
        } else {
            Ok(ModelProvider::OpenAi {
                api_key: SecretString::from(fields.required_str("openai_api_key")?),
            })
        }
    }

    pub fn is_azure(&self) -> bool {
        matches!(self, ModelProvider::Azure(_))
    }

    pub fn api_key(&self) -> &SecretString {
        match self {
            ModelProvider::OpenAi { api_key } => api_key,
            ModelProvider::Azure(azure) => &azure.api_key,
        }
    }

    pub fn azure(&self) -> Option<&AzureConfig> {
        match self {
            ModelProvider::Azure(azure) => Some(azure),
            ModelProvider::OpenAi { .. } => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ModelProvider::OpenAi { .. } => "openai",
            ModelProvider::Azure(_) => "azure",
        }
    }
}

impl PartialEq for ModelProvider {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ModelProvider::OpenAi { api_key: a }, ModelProvider::OpenAi { api_key: b }) => {
                a.expose_secret() == b.expose_secret()
            }
            (ModelProvider::Azure(a), ModelProvider::Azure(b)) => a == b,
            _ => false,
        }
    }
}
