//! Response handlers for non-image modes

use serde::Deserialize;
use serde_json::Value;
use unirelay_core::RelayInfo;
use unirelay_core::adaptor::RelayOutput;
use unirelay_core::error::RelayError;
use unirelay_core::execution::RawResponse;
use unirelay_core::types::Usage;

/// `data:` payloads of a buffered server-sent-event body, `[DONE]` excluded.
fn sse_data_events(body: &[u8]) -> impl Iterator<Item = Value> + '_ {
    body.split(|b| *b == b'\n')
        .filter_map(|line| std::str::from_utf8(line).ok())
        .filter_map(|line| line.trim().strip_prefix("data:"))
        .map(str::trim)
        .filter(|data| !data.is_empty() && *data != "[DONE]")
        .filter_map(|data| serde_json::from_str(data).ok())
}

/// TTS, element and identify-face: forward the upstream body and status as
/// they are; usage is the orchestrator's prompt estimate.
pub(crate) fn handle_passthrough(info: &RelayInfo, resp: &RawResponse) -> RelayOutput {
    let mut output = RelayOutput::forwarded(resp, Usage::estimated(info.estimated_prompt_tokens));
    if output.content_type.is_none() {
        output.content_type = Some("application/json".to_string());
    }
    output
}

fn error_object(status: u16, value: &Value) -> Option<RelayError> {
    let err = value.get("error").filter(|e| e.is_object())?;
    let message = err.get("message").and_then(Value::as_str).filter(|m| !m.is_empty())?;
    let code = match err.get("code") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    };
    let error_type = err
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or("upstream_error");
    Some(RelayError::provider_typed(status, code, message, error_type))
}

fn usage_from(value: Option<&Value>) -> Option<Usage> {
    value
        .filter(|u| u.is_object())
        .and_then(|u| Usage::deserialize(u).ok())
        .map(Usage::normalized)
        .filter(|u| u.total_tokens > 0)
}

/// OpenAI-compatible chat / embedding responses.
pub(crate) fn handle_openai(info: &RelayInfo, resp: &RawResponse) -> Result<RelayOutput, RelayError> {
    let fallback = || Usage::estimated(info.estimated_prompt_tokens);

    if resp.is_event_stream() {
        let usage = sse_data_events(&resp.body)
            .filter_map(|chunk| usage_from(chunk.get("usage")))
            .last()
            .unwrap_or_else(fallback);
        return Ok(RelayOutput::forwarded(resp, usage));
    }

    let value: Value = resp.json()?;
    if let Some(err) = error_object(resp.status, &value) {
        return Err(err);
    }
    let usage = usage_from(value.get("usage")).unwrap_or_else(fallback);
    Ok(RelayOutput::forwarded(resp, usage))
}

#[derive(Debug, Default, Deserialize)]
struct ClaudeUsage {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
    #[serde(default)]
    cache_creation_input_tokens: u64,
    #[serde(default)]
    cache_read_input_tokens: u64,
}

impl ClaudeUsage {
    fn prompt(&self) -> u64 {
        self.input_tokens + self.cache_creation_input_tokens + self.cache_read_input_tokens
    }
}

fn claude_usage(value: Option<&Value>) -> Option<ClaudeUsage> {
    value.and_then(|u| ClaudeUsage::deserialize(u).ok())
}

fn claude_error(status: u16, value: &Value) -> Option<RelayError> {
    if value.get("type").and_then(Value::as_str) != Some("error") {
        return None;
    }
    let err = value.get("error")?;
    let message = err.get("message").and_then(Value::as_str).unwrap_or_default();
    let error_type = err.get("type").and_then(Value::as_str).unwrap_or("api_error");
    Some(RelayError::provider_typed(status, error_type, message, error_type))
}

/// Anthropic Messages-shaped responses from the Claude-compatible surface.
pub(crate) fn handle_claude(info: &RelayInfo, resp: &RawResponse) -> Result<RelayOutput, RelayError> {
    let mut prompt = 0u64;
    let mut completion = 0u64;

    if resp.is_event_stream() {
        for event in sse_data_events(&resp.body) {
            if let Some(err) = claude_error(resp.status, &event) {
                return Err(err);
            }
            // message_start carries input counts, message_delta the running output.
            if let Some(u) = claude_usage(event.pointer("/message/usage")) {
                prompt = prompt.max(u.prompt());
                completion = completion.max(u.output_tokens);
            }
            if let Some(u) = claude_usage(event.get("usage")) {
                prompt = prompt.max(u.prompt());
                completion = completion.max(u.output_tokens);
            }
        }
    } else {
        let value: Value = resp.json()?;
        if let Some(err) = claude_error(resp.status, &value) {
            return Err(err);
        }
        if let Some(u) = claude_usage(value.get("usage")) {
            prompt = u.prompt();
            completion = u.output_tokens;
        }
    }

    let usage = if prompt == 0 && completion == 0 {
        Usage::estimated(info.estimated_prompt_tokens)
    } else {
        Usage {
            prompt_tokens: prompt,
            completion_tokens: completion,
            total_tokens: prompt + completion,
            ..Default::default()
        }
    };
    Ok(RelayOutput::forwarded(resp, usage))
}
