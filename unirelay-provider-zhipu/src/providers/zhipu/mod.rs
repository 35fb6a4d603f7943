//! Zhipu synchronous channel adaptor

pub mod handlers;
pub mod image;
pub mod spec;
pub mod transformers;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::HeaderMap;
use std::sync::Arc;
use unirelay_core::adaptor::{ChannelAdaptor, RelayOutput};
use unirelay_core::channel::ChannelConfig;
use unirelay_core::error::RelayError;
use unirelay_core::execution::{HttpTransport, RawResponse, ReqwestTransport};
use unirelay_core::media::{HttpImageFetcher, ImageFetcher};
use unirelay_core::{RelayFormat, RelayInfo, RelayMode};

pub const CHANNEL_NAME: &str = "zhipu_4v";

pub const MODEL_LIST: &[&str] = &[
    "glm-4.6",
    "glm-4.5",
    "glm-4.5-air",
    "glm-4.5v",
    "glm-4-plus",
    "glm-4-flash",
    "glm-4v-plus",
    "cogview-4",
    "cogview-3-flash",
    "embedding-3",
    "embedding-2",
    "glm-tts",
];

/// Synchronous Zhipu adaptor. Construct one per request.
pub struct ZhipuAdaptor {
    config: ChannelConfig,
    transport: Arc<dyn HttpTransport>,
    fetcher: Arc<dyn ImageFetcher>,
}

impl ZhipuAdaptor {
    pub fn new(config: ChannelConfig) -> Result<Self, RelayError> {
        config.validate()?;
        let transport: Arc<dyn HttpTransport> = Arc::new(ReqwestTransport::default());
        Ok(Self {
            config,
            fetcher: Arc::new(HttpImageFetcher::new(transport.clone())),
            transport,
        })
    }

    /// Use a caller-supplied transport for upstream calls and image downloads.
    pub fn with_transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.fetcher = Arc::new(HttpImageFetcher::new(transport.clone()));
        self.transport = transport;
        self
    }

    pub fn with_image_fetcher(mut self, fetcher: Arc<dyn ImageFetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }
}

#[async_trait]
impl ChannelAdaptor for ZhipuAdaptor {
    fn channel_name(&self) -> &'static str {
        CHANNEL_NAME
    }

    fn model_list(&self) -> Vec<String> {
        MODEL_LIST.iter().map(|m| m.to_string()).collect()
    }

    fn transport(&self) -> &dyn HttpTransport {
        self.transport.as_ref()
    }

    fn request_url(&self, info: &RelayInfo) -> Result<String, RelayError> {
        spec::request_url(&self.config, info.format, info.mode)
    }

    fn build_headers(&self, _info: &RelayInfo) -> Result<HeaderMap, RelayError> {
        spec::build_headers(&self.config)
    }

    fn convert_request(&self, info: &RelayInfo) -> Result<Bytes, RelayError> {
        transformers::convert_request(info)
    }

    async fn do_response(
        &self,
        info: &mut RelayInfo,
        resp: RawResponse,
    ) -> Result<RelayOutput, RelayError> {
        match info.format {
            RelayFormat::Claude => handlers::handle_claude(info, &resp),
            _ if info.mode.is_passthrough() => Ok(handlers::handle_passthrough(info, &resp)),
            _ if info.mode == RelayMode::ImagesGenerations => {
                image::handle_image_response(info, &resp, self.fetcher.as_ref()).await
            }
            _ => handlers::handle_openai(info, &resp),
        }
    }
}
