//! Channel Configuration
//!
//! A channel is one configured connection to an upstream provider: base URL,
//! credentials, and provider type. Adaptors are built from a `ChannelConfig`
//! per request and never shared.

use crate::error::RelayError;
use once_cell::sync::Lazy;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Upstream provider type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ChannelType {
    /// Zhipu BigModel open platform (v4 API)
    ZhipuV4,
}

impl ChannelType {
    /// Numeric id used by channel tables in the surrounding gateway.
    pub fn id(self) -> u32 {
        match self {
            ChannelType::ZhipuV4 => 26,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ChannelType::ZhipuV4 => "zhipu_v4",
        }
    }

    pub fn default_base_url(self) -> &'static str {
        DEFAULT_BASE_URLS
            .get(&self)
            .copied()
            .unwrap_or_default()
    }

    /// Environment variable prefix for [`ChannelConfig::from_env`].
    pub fn env_prefix(self) -> &'static str {
        match self {
            ChannelType::ZhipuV4 => "ZHIPU",
        }
    }
}

static DEFAULT_BASE_URLS: Lazy<HashMap<ChannelType, &'static str>> =
    Lazy::new(|| HashMap::from([(ChannelType::ZhipuV4, "https://open.bigmodel.cn")]));

/// Alternate bases for one configured base URL, keyed by protocol family.
///
/// Some plans expose a Claude-compatible surface and an OpenAI-compatible
/// surface at different hosts/paths than the default API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSpecialBase {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claude_base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openai_base_url: Option<String>,
}

impl ChannelSpecialBase {
    pub fn claude(&self) -> Option<&str> {
        self.claude_base_url.as_deref().filter(|s| !s.is_empty())
    }

    pub fn openai(&self) -> Option<&str> {
        self.openai_base_url.as_deref().filter(|s| !s.is_empty())
    }
}

static BUILTIN_SPECIAL_BASES: Lazy<HashMap<&'static str, ChannelSpecialBase>> = Lazy::new(|| {
    HashMap::from([
        (
            "glm-coding-plan",
            ChannelSpecialBase {
                claude_base_url: Some("https://open.bigmodel.cn/api/anthropic".to_string()),
                openai_base_url: Some("https://open.bigmodel.cn/api/coding/paas/v4".to_string()),
            },
        ),
        (
            "glm-coding-plan-international",
            ChannelSpecialBase {
                claude_base_url: Some("https://api.z.ai/api/anthropic".to_string()),
                openai_base_url: Some("https://api.z.ai/api/coding/paas/v4".to_string()),
            },
        ),
    ])
});

fn deserialize_secret<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(SecretString::from(raw))
}

/// Channel configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelConfig {
    pub channel_type: ChannelType,
    #[serde(deserialize_with = "deserialize_secret")]
    api_key: SecretString,
    /// Overrides the channel type's default base URL
    #[serde(default)]
    pub base_url: Option<String>,
    /// Extra headers sent on every upstream request
    #[serde(default)]
    pub http_extra_headers: HashMap<String, String>,
    /// Per-channel special bases; consulted before the built-in table
    #[serde(default)]
    pub special_bases: HashMap<String, ChannelSpecialBase>,
}

impl ChannelConfig {
    pub fn new(channel_type: ChannelType, api_key: impl Into<String>) -> Self {
        Self {
            channel_type,
            api_key: SecretString::from(api_key.into()),
            base_url: None,
            http_extra_headers: HashMap::new(),
            special_bases: HashMap::new(),
        }
    }

    /// Read `<PREFIX>_API_KEY` and optional `<PREFIX>_BASE_URL`.
    pub fn from_env(channel_type: ChannelType) -> Result<Self, RelayError> {
        let prefix = channel_type.env_prefix();
        let key_var = format!("{prefix}_API_KEY");
        let api_key = std::env::var(&key_var).map_err(|_| {
            RelayError::Configuration(format!("{key_var} environment variable not set"))
        })?;
        let mut config = Self::new(channel_type, api_key);
        if let Ok(base) = std::env::var(format!("{prefix}_BASE_URL")) {
            config = config.with_base_url(base);
        }
        config.validate()?;
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.http_extra_headers.insert(name.into(), value.into());
        self
    }

    pub fn with_special_base(mut self, base_url: impl Into<String>, special: ChannelSpecialBase) -> Self {
        self.special_bases.insert(base_url.into(), special);
        self
    }

    pub fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }

    /// Configured base URL (trailing slash trimmed), else the channel default.
    pub fn resolved_base_url(&self) -> String {
        match self.base_url.as_deref().map(str::trim) {
            Some(base) if !base.is_empty() => base.trim_end_matches('/').to_string(),
            _ => self.channel_type.default_base_url().to_string(),
        }
    }

    /// Special bases registered for the resolved base URL, if any.
    pub fn special_base(&self) -> Option<ChannelSpecialBase> {
        let base = self.resolved_base_url();
        self.special_bases
            .get(&base)
            .or_else(|| BUILTIN_SPECIAL_BASES.get(base.as_str()))
            .cloned()
    }

    pub fn validate(&self) -> Result<(), RelayError> {
        if self.api_key.expose_secret().trim().is_empty() {
            return Err(RelayError::Configuration(format!(
                "{} API key cannot be empty",
                self.channel_type.name()
            )));
        }
        if self.resolved_base_url().is_empty() {
            return Err(RelayError::Configuration(format!(
                "{} base URL cannot be empty",
                self.channel_type.name()
            )));
        }
        Ok(())
    }
}
