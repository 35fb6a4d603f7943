//! Zhipu endpoint table and request headers

use reqwest::header::HeaderMap;
use unirelay_core::channel::ChannelConfig;
use unirelay_core::error::RelayError;
use unirelay_core::execution::HttpHeaderBuilder;
use unirelay_core::{RelayFormat, RelayMode};

pub(crate) const CHAT_PATH: &str = "/api/paas/v4/chat/completions";
pub(crate) const EMBEDDINGS_PATH: &str = "/api/paas/v4/embeddings";
pub(crate) const IMAGES_PATH: &str = "/api/paas/v4/images/generations";
pub(crate) const TTS_PATH: &str = "/api/paas/v4/audio/tts";
pub(crate) const ELEMENTS_PATH: &str = "/api/paas/v4/images/custom-elements";
pub(crate) const IDENTIFY_FACE_PATH: &str = "/api/paas/v4/videos/identify-face";
pub(crate) const CLAUDE_PATH: &str = "/api/anthropic/v1/messages";

/// Resolve the upstream URL for a (format, mode) pair.
///
/// Format wins over mode: a Claude-shaped call always goes to `/messages`.
/// A special base registered for the resolved base URL replaces the prefix
/// for its own protocol family only.
pub(crate) fn request_url(
    config: &ChannelConfig,
    format: RelayFormat,
    mode: RelayMode,
) -> Result<String, RelayError> {
    let base = config.resolved_base_url();
    let special = config.special_base();
    let special_claude = special.as_ref().and_then(|s| s.claude());
    let special_openai = special.as_ref().and_then(|s| s.openai());

    let url = match format {
        RelayFormat::Claude => match special_claude {
            Some(claude) => format!("{}/v1/messages", claude.trim_end_matches('/')),
            None => format!("{base}{CLAUDE_PATH}"),
        },
        RelayFormat::Gemini => {
            return Err(RelayError::Conversion(
                "gemini format is not supported by the zhipu channel".to_string(),
            ));
        }
        RelayFormat::OpenAi => match mode {
            RelayMode::AudioSpeech => format!("{base}{TTS_PATH}"),
            RelayMode::ElementCreate => format!("{base}{ELEMENTS_PATH}"),
            RelayMode::IdentifyFace => format!("{base}{IDENTIFY_FACE_PATH}"),
            RelayMode::ImagesGenerations => format!("{base}{IMAGES_PATH}"),
            RelayMode::Embeddings => match special_openai {
                Some(openai) => format!("{}/embeddings", openai.trim_end_matches('/')),
                None => format!("{base}{EMBEDDINGS_PATH}"),
            },
            _ => match special_openai {
                Some(openai) => format!("{}/chat/completions", openai.trim_end_matches('/')),
                None => format!("{base}{CHAT_PATH}"),
            },
        },
    };
    Ok(url)
}

/// Bearer auth plus JSON content negotiation plus configured extras.
pub(crate) fn build_headers(config: &ChannelConfig) -> Result<HeaderMap, RelayError> {
    let builder = HttpHeaderBuilder::new()
        .with_bearer_auth(config.api_key())?
        .with_json_content_type()
        .with_json_accept()
        .with_custom_headers(&config.http_extra_headers)?;
    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use unirelay_core::channel::{ChannelSpecialBase, ChannelType};

    fn cfg() -> ChannelConfig {
        ChannelConfig::new(ChannelType::ZhipuV4, "key")
    }

    #[test]
    fn mode_table_on_default_base() {
        let c = cfg();
        let url = |mode| request_url(&c, RelayFormat::OpenAi, mode).unwrap();
        assert_eq!(
            url(RelayMode::ChatCompletions),
            "https://open.bigmodel.cn/api/paas/v4/chat/completions"
        );
        assert_eq!(
            url(RelayMode::AudioSpeech),
            "https://open.bigmodel.cn/api/paas/v4/audio/tts"
        );
        assert_eq!(
            url(RelayMode::ElementCreate),
            "https://open.bigmodel.cn/api/paas/v4/images/custom-elements"
        );
        assert_eq!(
            url(RelayMode::IdentifyFace),
            "https://open.bigmodel.cn/api/paas/v4/videos/identify-face"
        );
        assert_eq!(
            url(RelayMode::ImagesGenerations),
            "https://open.bigmodel.cn/api/paas/v4/images/generations"
        );
        assert_eq!(
            url(RelayMode::Embeddings),
            "https://open.bigmodel.cn/api/paas/v4/embeddings"
        );
        // Unmatched modes fall back to chat.
        assert_eq!(url(RelayMode::VideoFetch), url(RelayMode::ChatCompletions));
    }

    #[test]
    fn claude_format_takes_precedence_over_mode() {
        let c = cfg();
        assert_eq!(
            request_url(&c, RelayFormat::Claude, RelayMode::ImagesGenerations).unwrap(),
            "https://open.bigmodel.cn/api/anthropic/v1/messages"
        );
    }

    #[test]
    fn coding_plan_special_bases() {
        let c = cfg().with_base_url("glm-coding-plan-international");
        assert_eq!(
            request_url(&c, RelayFormat::Claude, RelayMode::ChatCompletions).unwrap(),
            "https://api.z.ai/api/anthropic/v1/messages"
        );
        assert_eq!(
            request_url(&c, RelayFormat::OpenAi, RelayMode::ChatCompletions).unwrap(),
            "https://api.z.ai/api/coding/paas/v4/chat/completions"
        );
        assert_eq!(
            request_url(&c, RelayFormat::OpenAi, RelayMode::Embeddings).unwrap(),
            "https://api.z.ai/api/coding/paas/v4/embeddings"
        );
        // Non-chat modes keep the configured base.
        assert_eq!(
            request_url(&c, RelayFormat::OpenAi, RelayMode::AudioSpeech).unwrap(),
            "glm-coding-plan-international/api/paas/v4/audio/tts"
        );
    }

    #[test]
    fn special_base_only_overrides_its_own_family() {
        let c = cfg().with_base_url("https://gw.example.com").with_special_base(
            "https://gw.example.com",
            ChannelSpecialBase {
                claude_base_url: Some("https://claude.example.com/".into()),
                openai_base_url: None,
            },
        );
        assert_eq!(
            request_url(&c, RelayFormat::Claude, RelayMode::ChatCompletions).unwrap(),
            "https://claude.example.com/v1/messages"
        );
        assert_eq!(
            request_url(&c, RelayFormat::OpenAi, RelayMode::ChatCompletions).unwrap(),
            "https://gw.example.com/api/paas/v4/chat/completions"
        );
    }

    #[test]
    fn gemini_format_is_a_conversion_error() {
        let err = request_url(&cfg(), RelayFormat::Gemini, RelayMode::ChatCompletions).unwrap_err();
        assert!(matches!(err, RelayError::Conversion(_)));
    }

    #[test]
    fn headers_carry_bearer_and_extras() {
        let c = cfg().with_header("X-Plan", "coding");
        let headers = build_headers(&c).unwrap();
        assert_eq!(headers.get("authorization").unwrap(), "Bearer key");
        assert_eq!(headers.get("accept").unwrap(), "application/json");
        assert_eq!(headers.get("x-plan").unwrap(), "coding");
    }
}
