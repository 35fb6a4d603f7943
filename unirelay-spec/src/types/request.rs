//! Canonical request types
//!
//! One enum variant per modality. Each variant is a plain serde struct that an
//! orchestrator can decode straight from its inbound JSON; adaptors translate
//! them into provider wire bodies.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::error::RelayError;

/// Capability modality of a canonical request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modality {
    Chat,
    Image,
    Audio,
    Video,
    Embedding,
    Element,
    IdentifyFace,
}

impl std::fmt::Display for Modality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Modality::Chat => "chat",
            Modality::Image => "image",
            Modality::Audio => "audio",
            Modality::Video => "video",
            Modality::Embedding => "embedding",
            Modality::Element => "element",
            Modality::IdentifyFace => "identify_face",
        };
        f.write_str(s)
    }
}

/// The gateway's unified request. Exactly one modality per value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "modality", content = "request", rename_all = "snake_case")]
pub enum CanonicalRequest {
    Chat(ChatRequest),
    Image(ImageRequest),
    Audio(AudioRequest),
    Video(VideoRequest),
    Embedding(EmbeddingRequest),
    Element(ElementRequest),
    IdentifyFace(IdentifyFaceRequest),
}

impl CanonicalRequest {
    pub fn modality(&self) -> Modality {
        match self {
            Self::Chat(_) => Modality::Chat,
            Self::Image(_) => Modality::Image,
            Self::Audio(_) => Modality::Audio,
            Self::Video(_) => Modality::Video,
            Self::Embedding(_) => Modality::Embedding,
            Self::Element(_) => Modality::Element,
            Self::IdentifyFace(_) => Modality::IdentifyFace,
        }
    }

    pub fn model(&self) -> &str {
        match self {
            Self::Chat(r) => &r.model,
            Self::Image(r) => &r.model,
            Self::Audio(r) => &r.model,
            Self::Video(r) => &r.model,
            Self::Embedding(r) => &r.model,
            Self::Element(r) => &r.model,
            Self::IdentifyFace(r) => &r.model,
        }
    }

    /// Replace the model name (after channel model mapping). Empty names are ignored.
    pub fn set_model(&mut self, model: impl Into<String>) {
        let model = model.into();
        if model.is_empty() {
            return;
        }
        match self {
            Self::Chat(r) => r.model = model,
            Self::Image(r) => r.model = model,
            Self::Audio(r) => r.model = model,
            Self::Video(r) => r.model = model,
            Self::Embedding(r) => r.model = model,
            Self::Element(r) => r.model = model,
            Self::IdentifyFace(r) => r.model = model,
        }
    }

    /// Fail fast on missing required fields.
    ///
    /// Video requests may omit the model; the video adaptor supplies its default.
    pub fn validate(&self) -> Result<(), RelayError> {
        if self.model().trim().is_empty() && self.modality() != Modality::Video {
            return Err(RelayError::RequestValidation(format!(
                "model is required for {} requests",
                self.modality()
            )));
        }
        match self {
            Self::Chat(r) if r.messages.is_empty() => Err(RelayError::RequestValidation(
                "messages must not be empty".to_string(),
            )),
            Self::Image(r) if r.prompt.trim().is_empty() => Err(RelayError::RequestValidation(
                "prompt is required".to_string(),
            )),
            Self::Audio(r) if r.input_text().is_none() => Err(RelayError::RequestValidation(
                "text or input is required".to_string(),
            )),
            Self::Video(r) => r.validate(),
            Self::Embedding(r) if r.input.is_null() => Err(RelayError::RequestValidation(
                "input is required".to_string(),
            )),
            Self::Element(r) if r.element_name.trim().is_empty() => Err(
                RelayError::RequestValidation("element_name is required".to_string()),
            ),
            Self::IdentifyFace(r) if r.video_id.is_none() && r.video_url.is_none() => Err(
                RelayError::RequestValidation("video_id or video_url is required".to_string()),
            ),
            _ => Ok(()),
        }
    }

    pub fn as_image(&self) -> Option<&ImageRequest> {
        match self {
            Self::Image(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_video(&self) -> Option<&VideoRequest> {
        match self {
            Self::Video(r) => Some(r),
            _ => None,
        }
    }
}

/// OpenAI-shaped chat request. Unknown fields are kept in `extra` so a
/// Claude-shaped body survives a passthrough untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub messages: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl ChatRequest {
    pub fn is_stream(&self) -> bool {
        self.stream.unwrap_or(false)
    }
}

/// Image generation request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageRequest {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    /// `url` or `b64_json`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_format: Option<String>,
    /// Raw JSON scalar from the caller; decoded only when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watermark_enabled: Option<Value>,
    /// Raw JSON scalar from the caller; decoded only when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Value>,
    /// Free-form provider fields
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl ImageRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    /// Number of images the caller asked for, if stated.
    pub fn requested_count(&self) -> Option<u32> {
        self.n.filter(|n| *n > 0)
    }
}

/// Text-to-speech request. Carries both provider-native and OpenAI-compatible
/// names for the same concept; adaptors pick per their alias chains.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioRequest {
    #[serde(default)]
    pub model: String,
    /// OpenAI-compatible input text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    /// Provider-native text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_speed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_format: Option<String>,
}

impl AudioRequest {
    /// First non-empty of `text`, `input`.
    pub fn input_text(&self) -> Option<&str> {
        first_non_empty(&[self.text.as_deref(), self.input.as_deref()])
    }
}

/// Asynchronous video job request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoRequest {
    #[serde(default)]
    pub model: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub prompt: String,
    /// Structured multi-part content (text + image parts), passed through as-is
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
    /// Direct image reference(s), passed through as-is
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    /// Seconds; values <= 0 mean "unset"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    /// e.g. "std" / "pro"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fps: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub with_audio: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generate_audio: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watermark_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_optimizer: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fast_pretreatment: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_tier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person_generation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resize_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compression_quality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_frame_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_frame_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_expires_after: Option<i64>,
    /// Fallback source for fields that are otherwise unset
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, Value>,
}

impl VideoRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn with_duration(mut self, seconds: i64) -> Self {
        self.duration = Some(seconds);
        self
    }

    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = Some(mode.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Requested duration if strictly positive, else `default`.
    pub fn duration_or(&self, default: i64) -> i64 {
        self.duration.filter(|d| *d > 0).unwrap_or(default)
    }

    fn validate(&self) -> Result<(), RelayError> {
        let has_input = !self.prompt.trim().is_empty()
            || self.content.is_some()
            || self.image_url.is_some()
            || self.image.as_deref().is_some_and(|s| !s.is_empty())
            || !self.images.is_empty();
        if !has_input {
            return Err(RelayError::RequestValidation(
                "prompt, content or image is required".to_string(),
            ));
        }
        if self.duration.is_some_and(|d| d < 0) {
            return Err(RelayError::RequestValidation(
                "duration must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Embedding request (passed through to OpenAI-compatible surfaces).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingRequest {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub input: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<u32>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Custom element creation (reference subject for later video jobs).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementRequest {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub element_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_frontal_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_refer_list: Option<Value>,
}

/// Face identification on a previously generated or uploaded video.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdentifyFaceRequest {
    #[serde(default)]
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
}

/// First candidate that is present and not blank.
pub fn first_non_empty<'a>(candidates: &[Option<&'a str>]) -> Option<&'a str> {
    candidates
        .iter()
        .flatten()
        .copied()
        .find(|s| !s.trim().is_empty())
}
