//! Canonical image output

use serde::{Deserialize, Serialize};

use super::Usage;

/// Output encoding a caller asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageEncoding {
    /// Pass remote URLs through
    Url,
    /// Inline base64 (the default)
    B64Json,
}

impl ImageEncoding {
    /// Only an explicit `"url"` selects URL output; anything else is inline.
    pub fn from_format(format: Option<&str>) -> Self {
        match format {
            Some("url") => Self::Url,
            _ => Self::B64Json,
        }
    }
}

/// OpenAI-shaped image generation response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageResponse {
    pub created: i64,
    #[serde(default)]
    pub data: Vec<ImageData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

/// One generated image: either a remote URL or inline base64.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub b64_json: Option<String>,
}

impl ImageData {
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            b64_json: None,
        }
    }

    pub fn from_b64(b64: impl Into<String>) -> Self {
        Self {
            url: None,
            b64_json: Some(b64.into()),
        }
    }
}
