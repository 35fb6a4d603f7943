//! HTTP transport abstraction.
//!
//! Adaptors never talk to `reqwest` directly: every outbound call goes
//! through an injectable [`HttpTransport`], so a caller can swap in its own
//! client (proxy, pooling, custom TLS) or a synthetic one in tests.

use crate::error::RelayError;
use crate::execution::response::RawResponse;
use async_trait::async_trait;
use bytes::Bytes;
use once_cell::sync::Lazy;
use reqwest::Method;
use reqwest::header::HeaderMap;

// One connection pool per process; `reqwest::Client` clones share it.
static SHARED_CLIENT: Lazy<reqwest::Client> = Lazy::new(reqwest::Client::new);

/// Transport-level request data.
#[derive(Debug, Clone)]
pub struct HttpTransportRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

impl HttpTransportRequest {
    pub fn get(url: impl Into<String>, headers: HeaderMap) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            headers,
            body: None,
        }
    }

    pub fn post(url: impl Into<String>, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            method: Method::POST,
            url: url.into(),
            headers,
            body: Some(body),
        }
    }
}

/// Custom HTTP transport.
///
/// Implementations must not retry: a failure is surfaced as
/// `RelayError::UpstreamTransport` and the orchestrator decides.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(&self, request: HttpTransportRequest) -> Result<RawResponse, RelayError>;
}

/// Default transport backed by a shared `reqwest::Client`.
///
/// `ReqwestTransport::default()` reuses the process-wide client, so every
/// adaptor built without an explicit transport shares one connection pool.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new(SHARED_CLIENT.clone())
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: HttpTransportRequest) -> Result<RawResponse, RelayError> {
        let mut builder = self
            .client
            .request(request.method, &request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(RelayError::from)?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| RelayError::UpstreamTransport(format!("read response body failed: {e}")))?;

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}
