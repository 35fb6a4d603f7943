//! Adaptor construction keyed by channel type
//!
//! Adaptors are cheap to build and hold no per-call state, so the gateway
//! asks for a fresh one on every logical request.

use unirelay_core::adaptor::{ChannelAdaptor, TaskAdaptor};
use unirelay_core::channel::{ChannelConfig, ChannelType};
use unirelay_spec::error::RelayError;
use unirelay_provider_zhipu::{ZhipuAdaptor, ZhipuVideoAdaptor};

/// Synchronous adaptor (chat, image, audio, embedding, ...) for `config`.
pub fn adaptor_for(config: ChannelConfig) -> Result<Box<dyn ChannelAdaptor>, RelayError> {
    match config.channel_type {
        ChannelType::ZhipuV4 => Ok(Box::new(ZhipuAdaptor::new(config)?)),
        other => Err(unsupported(other, "synchronous")),
    }
}

/// Asynchronous task adaptor (video jobs) for `config`.
pub fn task_adaptor_for(config: ChannelConfig) -> Result<Box<dyn TaskAdaptor>, RelayError> {
    match config.channel_type {
        ChannelType::ZhipuV4 => Ok(Box::new(ZhipuVideoAdaptor::new(config)?)),
        other => Err(unsupported(other, "task")),
    }
}

fn unsupported(channel_type: ChannelType, kind: &str) -> RelayError {
    RelayError::Configuration(format!(
        "no {kind} adaptor registered for channel type {}",
        channel_type.name()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zhipu_channel_builds_both_adaptors() {
        let cfg = ChannelConfig::new(ChannelType::ZhipuV4, "key");
        let sync = adaptor_for(cfg.clone()).unwrap();
        assert_eq!(sync.channel_name(), "zhipu_4v");
        assert!(sync.model_list().iter().any(|m| m == "cogview-4"));

        let task = task_adaptor_for(cfg).unwrap();
        assert_eq!(task.channel_name(), "zhipu_video");
        assert!(task.model_list().iter().any(|m| m == "cogvideox-3"));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let err = adaptor_for(ChannelConfig::new(ChannelType::ZhipuV4, "")).err().unwrap();
        assert!(matches!(err, RelayError::Configuration(_)));
        let err = task_adaptor_for(ChannelConfig::new(ChannelType::ZhipuV4, " ")).err().unwrap();
        assert_eq!(err.error_code(), "channel_config_invalid");
    }
}
