//! Type Conversions for RelayError
//!
//! From trait implementations for converting common error types into RelayError.

use super::types::RelayError;

#[cfg(feature = "reqwest")]
impl From<reqwest::Error> for RelayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return Self::UpstreamProtocol {
                message: err.to_string(),
                body: None,
            };
        }
        Self::UpstreamTransport(err.to_string())
    }
}

impl From<serde_json::Error> for RelayError {
    fn from(err: serde_json::Error) -> Self {
        Self::Conversion(err.to_string())
    }
}
