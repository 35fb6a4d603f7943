//! Remote media download and MIME detection
//!
//! Used by response normalizers that must inline a remote image as base64.

use crate::error::RelayError;
use crate::execution::{HttpTransport, HttpTransportRequest, RawResponse};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::header::HeaderMap;
use std::sync::Arc;

/// Guess MIME by inspecting bytes (magic numbers)
pub fn guess_mime_from_bytes(bytes: &[u8]) -> Option<String> {
    infer::get(bytes).map(|k| k.mime_type().to_string())
}

/// Guess an image MIME by URL extension, ignoring any query string.
pub fn guess_image_mime_from_url(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next()?;
    mime_guess::from_path(path)
        .iter()
        .find(|m| m.type_() == mime_guess::mime::IMAGE)
        .map(|m| m.essence_str().to_string())
}

/// `true` for absolute `http://` or `https://` URLs.
pub fn is_remote_url(value: &str) -> bool {
    let lower = value.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// A downloaded image, already base64-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedImage {
    pub mime_type: String,
    pub data: String,
}

/// Download a remote image and return it base64-encoded.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch_base64(&self, url: &str) -> Result<FetchedImage, RelayError>;
}

/// [`ImageFetcher`] that goes through the channel's HTTP transport.
#[derive(Clone)]
pub struct HttpImageFetcher {
    transport: Arc<dyn HttpTransport>,
}

impl HttpImageFetcher {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    fn mime_of(resp: &RawResponse, url: &str) -> String {
        resp.content_type()
            .map(|ct| ct.split(';').next().unwrap_or(ct).trim().to_string())
            .filter(|ct| ct.starts_with("image/"))
            .or_else(|| guess_mime_from_bytes(&resp.body))
            .or_else(|| guess_image_mime_from_url(url))
            .unwrap_or_else(|| "application/octet-stream".to_string())
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch_base64(&self, url: &str) -> Result<FetchedImage, RelayError> {
        let resp = self
            .transport
            .execute(HttpTransportRequest::get(url, HeaderMap::new()))
            .await?;
        if !resp.is_success() {
            return Err(RelayError::UpstreamTransport(format!(
                "image download returned status {}",
                resp.status
            )));
        }
        if resp.body.is_empty() {
            return Err(RelayError::protocol("image download returned empty body", b""));
        }
        Ok(FetchedImage {
            mime_type: Self::mime_of(&resp, url),
            data: STANDARD.encode(&resp.body),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::ReqwestTransport;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PNG_MAGIC: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

    #[test]
    fn remote_url_detection() {
        assert!(is_remote_url("https://cdn/x.png"));
        assert!(is_remote_url("HTTP://cdn/x.png"));
        assert!(!is_remote_url("data:image/png;base64,AAAA"));
        assert!(!is_remote_url("iVBORw0KGgo="));
    }

    #[test]
    fn mime_from_url_ignores_query() {
        assert_eq!(
            guess_image_mime_from_url("https://cdn/a/b.JPG?sig=1").as_deref(),
            Some("image/jpeg")
        );
        assert_eq!(
            guess_image_mime_from_url("https://cdn/a/b.webp#frag").as_deref(),
            Some("image/webp")
        );
        assert_eq!(guess_image_mime_from_url("https://cdn/a/b"), None);
        assert_eq!(guess_image_mime_from_url("https://cdn/a/clip.mp4"), None);
    }

    #[tokio::test]
    async fn downloads_and_sniffs_png() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/img/1"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(PNG_MAGIC.to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = HttpImageFetcher::new(Arc::new(ReqwestTransport::default()));
        let img = fetcher
            .fetch_base64(&format!("{}/img/1", server.uri()))
            .await
            .unwrap();
        assert_eq!(img.mime_type, "image/png");
        assert_eq!(img.data, STANDARD.encode(PNG_MAGIC));
    }

    #[tokio::test]
    async fn non_success_download_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = HttpImageFetcher::new(Arc::new(ReqwestTransport::default()));
        let err = fetcher
            .fetch_base64(&format!("{}/missing.png", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::UpstreamTransport(_)));
    }
}
