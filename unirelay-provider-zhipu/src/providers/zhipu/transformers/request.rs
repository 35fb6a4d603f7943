//! Request conversion per modality
//!
//! Zhipu's chat, embedding, element and identify-face endpoints accept
//! OpenAI-shaped bodies nearly as-is; image and TTS need field mapping.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use unirelay_core::encoding::to_json_bytes;
use unirelay_core::error::RelayError;
use unirelay_core::types::request::first_non_empty;
use unirelay_core::types::{AudioRequest, CanonicalRequest, ChatRequest, ImageRequest, Modality};
use unirelay_core::{RelayFormat, RelayInfo, RelayMode};

/// Upper bound Zhipu accepts for `top_p` (exclusive of 1.0).
pub const MAX_TOP_P: f64 = 0.99;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SequentialImageGenerationOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_images: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watermark: Option<bool>,
}

/// Zhipu image generation body. Fields not declared here never reach upstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZhipuImageRequest {
    pub model: String,
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ratio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watermark_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequential_image_generation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequential_image_generation_options: Option<SequentialImageGenerationOptions>,
}

impl ZhipuImageRequest {
    pub fn from_canonical(req: &ImageRequest) -> Self {
        let base = Self {
            model: req.model.clone(),
            prompt: req.prompt.clone(),
            n: req.n,
            quality: req.quality.clone(),
            size: req.size.clone(),
            watermark_enabled: decode_scalar(req.watermark_enabled.as_ref()),
            user_id: decode_scalar(req.user_id.as_ref()),
            ..Default::default()
        };
        base.merge_extra(&req.extra)
    }

    /// Allow-list merge: each extra entry is applied only if it names a field
    /// of this struct and its value has the right type; anything else is dropped.
    fn merge_extra(self, extra: &HashMap<String, Value>) -> Self {
        let mut keys: Vec<&String> = extra.keys().collect();
        keys.sort();

        let mut merged = self;
        for key in keys {
            let Ok(Value::Object(mut obj)) = serde_json::to_value(&merged) else {
                break;
            };
            obj.insert(key.clone(), extra[key].clone());
            match serde_json::from_value::<Self>(Value::Object(obj)) {
                Ok(next) if next != merged => merged = next,
                Ok(_) => tracing::debug!(field = %key, "extra image field not accepted, dropped"),
                Err(e) => tracing::debug!(field = %key, error = %e, "extra image field has wrong type, dropped"),
            }
        }
        merged
    }
}

/// Decode a tri-state JSON scalar; absent or mistyped values stay `None`.
fn decode_scalar<T: serde::de::DeserializeOwned>(raw: Option<&Value>) -> Option<T> {
    raw.and_then(|v| serde_json::from_value(v.clone()).ok())
}

/// Zhipu TTS body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZhipuTtsRequest {
    pub model: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_speed: Option<f64>,
}

impl ZhipuTtsRequest {
    /// Native names first, OpenAI-compatible aliases second.
    pub fn from_canonical(req: &AudioRequest) -> Self {
        let positive = |v: Option<f64>| v.filter(|s| *s > 0.0);
        Self {
            model: req.model.clone(),
            text: req.input_text().unwrap_or_default().to_string(),
            voice_id: first_non_empty(&[req.voice_id.as_deref(), req.voice.as_deref()])
                .map(str::to_string),
            voice_language: first_non_empty(&[req.voice_language.as_deref()]).map(str::to_string),
            voice_speed: positive(req.voice_speed).or_else(|| positive(req.speed)),
        }
    }
}

fn convert_openai_chat(req: &ChatRequest) -> Result<Bytes, RelayError> {
    let mut req = req.clone();
    if req.top_p.is_some_and(|p| p >= 1.0) {
        req.top_p = Some(MAX_TOP_P);
    }
    to_json_bytes(&req)
}

fn expected_modality(mode: RelayMode) -> Option<Modality> {
    match mode {
        RelayMode::ChatCompletions => Some(Modality::Chat),
        RelayMode::Embeddings => Some(Modality::Embedding),
        RelayMode::ImagesGenerations => Some(Modality::Image),
        RelayMode::AudioSpeech => Some(Modality::Audio),
        RelayMode::ElementCreate => Some(Modality::Element),
        RelayMode::IdentifyFace => Some(Modality::IdentifyFace),
        RelayMode::VideoSubmit | RelayMode::VideoFetch => None,
    }
}

/// Convert the request carried by `info` into the wire body for its endpoint.
pub fn convert_request(info: &RelayInfo) -> Result<Bytes, RelayError> {
    match info.format {
        RelayFormat::Gemini => {
            return Err(RelayError::Conversion(
                "gemini format is not supported by the zhipu channel".to_string(),
            ));
        }
        RelayFormat::Claude => {
            return match &info.request {
                CanonicalRequest::Chat(req) => to_json_bytes(req),
                other => Err(RelayError::Conversion(format!(
                    "claude format only carries chat requests, got {}",
                    other.modality()
                ))),
            };
        }
        RelayFormat::OpenAi => {}
    }

    let modality = info.request.modality();
    match expected_modality(info.mode) {
        Some(expected) if expected == modality => {}
        Some(expected) => {
            return Err(RelayError::RequestValidation(format!(
                "relay mode {:?} expects a {expected} request, got {modality}",
                info.mode
            )));
        }
        None => {
            return Err(RelayError::Conversion(
                "video jobs go through the video task adaptor".to_string(),
            ));
        }
    }

    match &info.request {
        CanonicalRequest::Chat(req) => convert_openai_chat(req),
        CanonicalRequest::Embedding(req) => to_json_bytes(req),
        CanonicalRequest::Image(req) => {
            let body = ZhipuImageRequest::from_canonical(req);
            tracing::debug!(model = %body.model, "zhipu image request converted");
            to_json_bytes(&body)
        }
        CanonicalRequest::Audio(req) => to_json_bytes(&ZhipuTtsRequest::from_canonical(req)),
        CanonicalRequest::Element(req) => to_json_bytes(req),
        CanonicalRequest::IdentifyFace(req) => to_json_bytes(req),
        CanonicalRequest::Video(_) => Err(RelayError::Conversion(
            "video jobs go through the video task adaptor".to_string(),
        )),
    }
}
