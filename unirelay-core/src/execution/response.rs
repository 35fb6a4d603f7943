//! Raw upstream responses and HTTP error classification

use crate::error::RelayError;
use bytes::Bytes;
use reqwest::header::{CONTENT_TYPE, HeaderMap};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Upstream response as received, before any handler interprets it.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }

    pub fn is_event_stream(&self) -> bool {
        self.content_type()
            .is_some_and(|ct| ct.starts_with("text/event-stream"))
    }

    /// Decode the body, wrapping failures with the raw body for diagnostics.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, RelayError> {
        serde_json::from_slice(&self.body).map_err(|e| {
            RelayError::protocol(format!("unmarshal response body failed: {e}"), &self.body)
        })
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

fn value_to_code(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Turn a non-2xx upstream response into a `ProviderReported` error.
///
/// Understands `{"error":{"code","message","type"}}` and flat
/// `{"code","message"}` envelopes; anything else keeps a sample of the raw
/// text as the message.
pub fn error_from_response(provider_id: &str, resp: &RawResponse) -> RelayError {
    let status = resp.status;
    let fallback_code = format!("bad_response_status_code_{status}");

    if let Ok(json) = serde_json::from_slice::<Value>(&resp.body) {
        let envelope = json.get("error").filter(|e| e.is_object()).unwrap_or(&json);
        let message = envelope
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty());
        if let Some(message) = message {
            let code = envelope
                .get("code")
                .and_then(value_to_code)
                .unwrap_or(fallback_code);
            let error_type = envelope
                .get("type")
                .and_then(Value::as_str)
                .map(|t| t.to_string())
                .unwrap_or_else(|| format!("{provider_id}_error"));
            return RelayError::provider_typed(status, code, message, error_type);
        }
    }

    let text = resp.text();
    let sample: String = text.trim().chars().take(200).collect();
    let message = if sample.is_empty() {
        reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("upstream error")
            .to_string()
    } else {
        sample
    };
    RelayError::provider_typed(status, fallback_code, message, format!("{provider_id}_error"))
}
