//! Per-request relay context

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{CanonicalRequest, PriceData};

/// Wire-level request/response shape the caller speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelayFormat {
    #[default]
    OpenAi,
    Claude,
    Gemini,
}

/// Capability being invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelayMode {
    #[default]
    ChatCompletions,
    Embeddings,
    ImagesGenerations,
    AudioSpeech,
    ElementCreate,
    IdentifyFace,
    VideoSubmit,
    VideoFetch,
}

impl RelayMode {
    /// Modes whose upstream body is forwarded to the caller untouched.
    pub fn is_passthrough(self) -> bool {
        matches!(
            self,
            RelayMode::AudioSpeech | RelayMode::ElementCreate | RelayMode::IdentifyFace
        )
    }
}

/// Request-scoped relay information. Built by the orchestrator for one call
/// and dropped afterwards; never shared across concurrent requests.
#[derive(Debug, Clone)]
pub struct RelayInfo {
    pub format: RelayFormat,
    pub mode: RelayMode,
    /// Model name the caller asked for, before channel mapping
    pub origin_model: String,
    pub start_time: DateTime<Utc>,
    /// Prompt-token estimate supplied by the orchestrator
    pub estimated_prompt_tokens: u64,
    pub price_data: PriceData,
    pub request: CanonicalRequest,
}

impl RelayInfo {
    pub fn new(format: RelayFormat, mode: RelayMode, request: CanonicalRequest) -> Self {
        Self {
            format,
            mode,
            origin_model: request.model().to_string(),
            start_time: Utc::now(),
            estimated_prompt_tokens: 0,
            price_data: PriceData::default(),
            request,
        }
    }

    pub fn with_price_data(mut self, price_data: PriceData) -> Self {
        self.price_data = price_data;
        self
    }

    pub fn with_estimated_prompt_tokens(mut self, tokens: u64) -> Self {
        self.estimated_prompt_tokens = tokens;
        self
    }

    pub fn with_start_time(mut self, start_time: DateTime<Utc>) -> Self {
        self.start_time = start_time;
        self
    }
}
