//! Relay error taxonomy.

use thiserror::Error;

/// Coarse error kind, useful for metrics labels and retry decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Conversion,
    Transport,
    Protocol,
    Provider,
    Configuration,
}

/// Error type returned by every adaptor operation.
///
/// The core never retries. `is_retryable` tells the orchestrator which kinds
/// are worth another attempt, and `UpstreamProtocol` carries the raw body so a
/// caller can log what the provider actually sent.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RelayError {
    /// A required canonical field is missing or the request variant is wrong.
    #[error("Invalid request: {0}")]
    RequestValidation(String),

    /// Canonical -> wire (or wire -> canonical) translation cannot proceed.
    #[error("Conversion error: {0}")]
    Conversion(String),

    /// Network or timeout failure while talking to the provider.
    #[error("Upstream transport error: {0}")]
    UpstreamTransport(String),

    /// The provider answered, but not in the expected shape.
    #[error("Upstream protocol error: {message}")]
    UpstreamProtocol {
        message: String,
        body: Option<String>,
    },

    /// The provider returned an explicit error object.
    #[error("Provider error ({status}) [{code}]: {message}")]
    ProviderReported {
        status: u16,
        code: String,
        message: String,
        error_type: String,
    },

    /// The channel configuration is unusable (empty key, bad header value, ...).
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl RelayError {
    /// Build an `UpstreamProtocol` error that keeps the raw body for diagnostics.
    pub fn protocol(message: impl Into<String>, body: &[u8]) -> Self {
        Self::UpstreamProtocol {
            message: message.into(),
            body: Some(String::from_utf8_lossy(body).into_owned()),
        }
    }

    /// Build a `ProviderReported` error with the provider's code and message verbatim.
    pub fn provider(status: u16, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ProviderReported {
            status,
            code: code.into(),
            message: message.into(),
            error_type: "upstream_error".to_string(),
        }
    }

    /// Same as [`RelayError::provider`] with an explicit error type label.
    pub fn provider_typed(
        status: u16,
        code: impl Into<String>,
        message: impl Into<String>,
        error_type: impl Into<String>,
    ) -> Self {
        Self::ProviderReported {
            status,
            code: code.into(),
            message: message.into(),
            error_type: error_type.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::RequestValidation(_) => ErrorKind::Validation,
            Self::Conversion(_) => ErrorKind::Conversion,
            Self::UpstreamTransport(_) => ErrorKind::Transport,
            Self::UpstreamProtocol { .. } => ErrorKind::Protocol,
            Self::ProviderReported { .. } => ErrorKind::Provider,
            Self::Configuration(_) => ErrorKind::Configuration,
        }
    }

    /// HTTP status an orchestrator should surface to its own caller.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::RequestValidation(_) => 400,
            Self::Conversion(_) => 500,
            Self::UpstreamTransport(_) => 500,
            Self::UpstreamProtocol { .. } => 500,
            Self::ProviderReported { status, .. } => *status,
            Self::Configuration(_) => 500,
        }
    }

    /// Stable snake_case error code. Provider codes are returned verbatim.
    pub fn error_code(&self) -> &str {
        match self {
            Self::RequestValidation(_) => "invalid_request",
            Self::Conversion(_) => "convert_request_failed",
            Self::UpstreamTransport(_) => "do_request_failed",
            Self::UpstreamProtocol { .. } => "bad_response_body",
            Self::ProviderReported { code, .. } => code,
            Self::Configuration(_) => "channel_config_invalid",
        }
    }

    /// Only transport failures are worth retrying; everything else is deterministic.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::UpstreamTransport(_))
    }

    /// Raw upstream body attached to a protocol error, if any.
    pub fn raw_body(&self) -> Option<&str> {
        match self {
            Self::UpstreamProtocol { body, .. } => body.as_deref(),
            _ => None,
        }
    }
}
