//! Channel-level tracing helpers
//!
//! Structured `tracing` records for every upstream call, with credentials
//! masked. Every helper here is infallible.

use crate::error::RelayError;
use reqwest::header::HeaderMap;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Shorten a credential to its first and last few characters.
pub fn mask_sensitive_value(value: &str) -> String {
    fn edges(s: &str, head: usize, tail: usize) -> String {
        let chars: Vec<char> = s.chars().collect();
        let start: String = chars[..head].iter().collect();
        let end: String = chars[chars.len() - tail..].iter().collect();
        format!("{start}...{end}")
    }

    if let Some(token) = value.strip_prefix("Bearer ") {
        if token.chars().count() > 8 {
            return format!("Bearer {}", edges(token, 4, 4));
        }
        return "Bearer ***".to_string();
    }
    if value.chars().count() > 16 {
        edges(value, 6, 4)
    } else {
        "***".to_string()
    }
}

/// Render headers as JSON with credential-like values masked.
pub fn format_headers_for_logging(headers: &HeaderMap) -> String {
    let map: BTreeMap<&str, String> = headers
        .iter()
        .map(|(k, v)| {
            let value = v.to_str().unwrap_or("<invalid>");
            let name = k.as_str().to_ascii_lowercase();
            let masked = if name.contains("authorization")
                || name.contains("key")
                || name.contains("token")
            {
                mask_sensitive_value(value)
            } else {
                value.to_string()
            };
            (k.as_str(), masked)
        })
        .collect();
    serde_json::to_string(&map).unwrap_or_else(|_| format!("{map:?}"))
}

/// Body preview for debug logs; long inline payloads (base64) are cut.
pub fn format_body_for_logging(body: &[u8]) -> String {
    const LIMIT: usize = 2048;
    let text = String::from_utf8_lossy(body);
    if text.chars().count() > LIMIT {
        let head: String = text.chars().take(LIMIT).collect();
        format!("{head}...<{} bytes>", body.len())
    } else {
        text.into_owned()
    }
}

/// Per-call tracer bound to one channel and model.
pub struct ChannelTracer {
    channel: String,
    model: Option<String>,
    started: Instant,
}

impl ChannelTracer {
    pub fn new(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            model: None,
            started: Instant::now(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        let model = model.into();
        if !model.is_empty() {
            self.model = Some(model);
        }
        self
    }

    pub fn trace_request_start(&self, method: &str, url: &str) {
        info!(channel = %self.channel, model = ?self.model, method = %method, url = %url, "Upstream request started");
    }

    pub fn trace_request_details(&self, headers: &HeaderMap, body: Option<&[u8]>) {
        debug!(
            channel = %self.channel,
            model = ?self.model,
            request_headers = %format_headers_for_logging(headers),
            request_body = %body.map(format_body_for_logging).unwrap_or_default(),
            "Upstream request details"
        );
    }

    pub fn trace_response(&self, status_code: u16, body: &[u8]) {
        let duration_ms = self.started.elapsed().as_millis();
        debug!(
            channel = %self.channel,
            model = ?self.model,
            status_code,
            duration_ms,
            response_body = %format_body_for_logging(body),
            "Upstream response received"
        );
    }

    pub fn trace_request_error(&self, error: &RelayError) {
        let duration_ms = self.started.elapsed().as_millis();
        warn!(
            channel = %self.channel,
            model = ?self.model,
            error_kind = ?error.kind(),
            retryable = error.is_retryable(),
            error_text = %error,
            duration_ms,
            "Upstream request failed"
        );
    }
}
