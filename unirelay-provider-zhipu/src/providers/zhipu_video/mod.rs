//! Zhipu asynchronous video task adaptor
//!
//! Submit goes to `/api/paas/v4/videos/generations`; the returned id is then
//! polled at `/api/paas/v4/async-result/<id>` until the task is terminal.

pub mod payload;
pub mod pricing;
pub mod status;
pub mod types;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use reqwest::header::HeaderMap;
use std::sync::Arc;
use unirelay_core::adaptor::{SubmitOutcome, TaskAdaptor};
use unirelay_core::channel::ChannelConfig;
use unirelay_core::encoding::to_json_bytes;
use unirelay_core::error::RelayError;
use unirelay_core::execution::{HttpTransport, RawResponse, ReqwestTransport};
use unirelay_core::types::{Task, TaskInfo, VideoObject, VideoRequest};
use unirelay_core::RelayInfo;

use self::types::{ZhipuVideoFetchResponse, ZhipuVideoSubmitResponse};
use super::zhipu::spec::build_headers;

pub const CHANNEL_NAME: &str = "zhipu_video";

pub const MODEL_LIST: &[&str] = &[
    "cogvideox",
    "cogvideox-2",
    "cogvideox-3",
    "sora-2",
    "sora-2-pro",
    "veo-3.0-generate-001",
    "veo-3.0-fast-generate-001",
    "veo-3.1-generate-preview",
    "veo-3.1-fast-generate-preview",
    "doubao-seedance",
    "minimax-hailuo",
];

const SUBMIT_PATH: &str = "/api/paas/v4/videos/generations";
const FETCH_PATH: &str = "/api/paas/v4/async-result";

/// Video task adaptor. Construct one per request.
pub struct ZhipuVideoAdaptor {
    config: ChannelConfig,
    transport: Arc<dyn HttpTransport>,
}

impl ZhipuVideoAdaptor {
    pub fn new(config: ChannelConfig) -> Result<Self, RelayError> {
        config.validate()?;
        Ok(Self {
            config,
            transport: Arc::new(ReqwestTransport::default()),
        })
    }

    pub fn with_transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = transport;
        self
    }

    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }
}

fn video_request(info: &RelayInfo) -> Result<&VideoRequest, RelayError> {
    info.request.as_video().ok_or_else(|| {
        RelayError::RequestValidation(format!(
            "{} requests are not supported by the video channel",
            info.request.modality()
        ))
    })
}

#[async_trait]
impl TaskAdaptor for ZhipuVideoAdaptor {
    fn channel_name(&self) -> &'static str {
        CHANNEL_NAME
    }

    fn model_list(&self) -> Vec<String> {
        MODEL_LIST.iter().map(|m| m.to_string()).collect()
    }

    fn transport(&self) -> &dyn HttpTransport {
        self.transport.as_ref()
    }

    fn validate_and_price(&self, info: &mut RelayInfo) -> Result<(), RelayError> {
        video_request(info)?;
        info.request.validate()?;
        if info.request.model().trim().is_empty() {
            info.request.set_model(payload::DEFAULT_MODEL);
        }
        let req = video_request(info)?;
        let ratios = pricing::pricing_registry().price(&req.model, req);
        info.price_data.other_ratios = ratios;
        Ok(())
    }

    fn submit_url(&self, _info: &RelayInfo) -> String {
        format!("{}{SUBMIT_PATH}", self.config.resolved_base_url())
    }

    fn fetch_url(&self, task_id: &str) -> String {
        format!(
            "{}{FETCH_PATH}/{}",
            self.config.resolved_base_url(),
            urlencoding::encode(task_id)
        )
    }

    fn build_headers(&self) -> Result<HeaderMap, RelayError> {
        build_headers(&self.config)
    }

    fn build_submit_body(&self, info: &RelayInfo) -> Result<Bytes, RelayError> {
        let body = payload::build_payload(video_request(info)?);
        let bytes = to_json_bytes(&body)?;
        tracing::debug!(
            channel = CHANNEL_NAME,
            model = %body.model,
            body = %String::from_utf8_lossy(&bytes),
            "zhipu video submit body"
        );
        Ok(bytes)
    }

    fn handle_submit_response(
        &self,
        info: &RelayInfo,
        resp: &RawResponse,
    ) -> Result<SubmitOutcome, RelayError> {
        let submitted: ZhipuVideoSubmitResponse = resp.json()?;
        if submitted.id.is_empty() {
            return Err(RelayError::protocol(
                "zhipu video api error: empty task id",
                &resp.body,
            ));
        }
        let model = if info.origin_model.is_empty() {
            info.request.model()
        } else {
            info.origin_model.as_str()
        };
        Ok(SubmitOutcome {
            video: VideoObject::new(submitted.id.clone(), model, Utc::now().timestamp()),
            task_id: submitted.id,
            task_data: resp.body.clone(),
        })
    }

    fn parse_task_result(&self, body: &[u8]) -> Result<TaskInfo, RelayError> {
        let resp: ZhipuVideoFetchResponse = serde_json::from_slice(body).map_err(|e| {
            RelayError::protocol(format!("unmarshal zhipu video task result failed: {e}"), body)
        })?;
        Ok(status::map_task_status(&resp))
    }

    fn convert_to_video(&self, task: &Task) -> Result<Bytes, RelayError> {
        // Stored payload is the fetch body once polled, the submit body before.
        let fetched = match serde_json::from_slice::<ZhipuVideoFetchResponse>(&task.raw_payload) {
            Ok(fetched) => Some(fetched),
            Err(e) => {
                serde_json::from_slice::<ZhipuVideoSubmitResponse>(&task.raw_payload).map_err(
                    |_| {
                        RelayError::protocol(
                            format!("unmarshal zhipu task data failed: {e}"),
                            &task.raw_payload,
                        )
                    },
                )?;
                None
            }
        };

        let mut video = task.to_video_object();
        if let Some(first) = fetched.as_ref().and_then(|f| f.video_result.first()) {
            if !first.url.is_empty() {
                video.set_metadata("url", first.url.clone());
            }
            if !first.cover_image_url.is_empty() {
                video.set_metadata("cover_image_url", first.cover_image_url.clone());
            }
        }
        if video.metadata_str("url").is_none()
            && let Some(url) = task.result_url()
        {
            video.set_metadata("url", url);
        }
        to_json_bytes(&video)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unirelay_core::channel::ChannelType;
    use unirelay_core::types::{CanonicalRequest, ImageRequest, TaskStatus};
    use unirelay_core::{RelayFormat, RelayMode};

    fn adaptor() -> ZhipuVideoAdaptor {
        ZhipuVideoAdaptor::new(
            ChannelConfig::new(ChannelType::ZhipuV4, "key").with_base_url("https://zp.example.com/"),
        )
        .unwrap()
    }

    fn video_info(req: VideoRequest) -> RelayInfo {
        RelayInfo::new(
            RelayFormat::OpenAi,
            RelayMode::VideoSubmit,
            CanonicalRequest::Video(req),
        )
    }

    #[test]
    fn urls_use_resolved_base() {
        let a = adaptor();
        let info = video_info(VideoRequest::new("cogvideox-3", "p"));
        assert_eq!(
            a.submit_url(&info),
            "https://zp.example.com/api/paas/v4/videos/generations"
        );
        assert_eq!(
            a.fetch_url("id/with space"),
            "https://zp.example.com/api/paas/v4/async-result/id%2Fwith%20space"
        );
    }

    #[test]
    fn pricing_is_attached_to_relay_info() {
        let mut info = video_info(VideoRequest::new("kling-v2-1", "p").with_mode("pro").with_duration(10));
        adaptor().validate_and_price(&mut info).unwrap();
        let ratios = &info.price_data.other_ratios;
        assert_eq!(ratios.get("seconds"), Some(2.0));
        assert_eq!(ratios.get("mode"), Some(1.75));
    }

    #[test]
    fn empty_model_is_defaulted_before_pricing() {
        let mut info = video_info(VideoRequest::new("", "p"));
        adaptor().validate_and_price(&mut info).unwrap();
        assert_eq!(info.request.model(), "cogvideox-3");
        assert_eq!(info.price_data.other_ratios.get("seconds"), Some(5.0));
    }

    #[test]
    fn missing_input_is_rejected() {
        let mut info = video_info(VideoRequest::new("cogvideox-3", "  "));
        let err = adaptor().validate_and_price(&mut info).unwrap_err();
        assert!(matches!(err, RelayError::RequestValidation(_)));
    }

    #[test]
    fn non_video_request_is_rejected() {
        let mut info = RelayInfo::new(
            RelayFormat::OpenAi,
            RelayMode::VideoSubmit,
            CanonicalRequest::Image(ImageRequest::new("cogview-4", "p")),
        );
        let err = adaptor().validate_and_price(&mut info).unwrap_err();
        assert!(matches!(err, RelayError::RequestValidation(_)));
    }

    #[test]
    fn submit_response_without_id_is_a_protocol_error() {
        let info = video_info(VideoRequest::new("cogvideox-3", "p"));
        let resp = RawResponse::new(200, r#"{"request_id":"r1","task_status":"PROCESSING"}"#);
        let err = adaptor().handle_submit_response(&info, &resp).unwrap_err();
        assert!(matches!(err, RelayError::UpstreamProtocol { .. }));
        assert!(err.raw_body().unwrap().contains("r1"));
    }

    #[test]
    fn submit_response_builds_queued_video() {
        let info = video_info(VideoRequest::new("cogvideox-3", "p"));
        let resp = RawResponse::new(200, r#"{"id":"t-1","task_status":"PROCESSING"}"#);
        let outcome = adaptor().handle_submit_response(&info, &resp).unwrap();
        assert_eq!(outcome.task_id, "t-1");
        assert_eq!(outcome.video.id, "t-1");
        assert_eq!(outcome.video.model, "cogvideox-3");
        assert_eq!(outcome.video.status, "queued");
        assert_eq!(outcome.task_data, resp.body);
    }

    #[test]
    fn convert_reads_fetch_payload_metadata() {
        let mut task = Task::submitted("t-1", "cogvideox-3", b"{\"id\":\"t-1\"}".to_vec(), 10);
        let body = br#"{"id":"t-1","task_status":"SUCCESS","video_result":[{"url":"https://cdn/v.mp4","cover_image_url":"https://cdn/c.png"}]}"#;
        let a = adaptor();
        let info = a.parse_task_result(body).unwrap();
        assert!(task.apply(&info, body.to_vec(), 20));

        let video: VideoObject = serde_json::from_slice(&a.convert_to_video(&task).unwrap()).unwrap();
        assert_eq!(video.status, "completed");
        assert_eq!(video.metadata_str("url"), Some("https://cdn/v.mp4"));
        assert_eq!(video.metadata_str("cover_image_url"), Some("https://cdn/c.png"));
        assert_eq!(task.status, TaskStatus::Success);
    }

    #[test]
    fn convert_accepts_submit_payload() {
        let task = Task::submitted("t-1", "cogvideox-3", br#"{"id":"t-1","task_status":"PROCESSING"}"#.to_vec(), 10);
        let video: VideoObject =
            serde_json::from_slice(&adaptor().convert_to_video(&task).unwrap()).unwrap();
        assert_eq!(video.status, "queued");
        assert!(video.metadata.is_empty());
    }

    #[test]
    fn null_fields_in_fetch_payload_are_tolerated() {
        let body = br#"{"id":"t","model":"cogvideox-3","task_status":"PROCESSING","video_result":null,"created":null,"request_id":null}"#;
        let a = adaptor();
        let info = a.parse_task_result(body).unwrap();
        assert_eq!(info.status, TaskStatus::InProgress);
        assert_eq!(info.progress, "50%");

        let mut task = Task::submitted("t", "cogvideox-3", Vec::new(), 0);
        assert!(task.apply(&info, body.to_vec(), 1));
        let video: VideoObject = serde_json::from_slice(&a.convert_to_video(&task).unwrap()).unwrap();
        assert_eq!(video.status, "in_progress");
        assert!(video.metadata.is_empty());
    }

    #[test]
    fn null_id_in_submit_response_is_a_protocol_error() {
        let info = video_info(VideoRequest::new("cogvideox-3", "p"));
        let resp = RawResponse::new(200, r#"{"id":null,"model":null,"task_status":"PROCESSING"}"#);
        let err = adaptor().handle_submit_response(&info, &resp).unwrap_err();
        assert!(matches!(err, RelayError::UpstreamProtocol { .. }));
    }

    #[test]
    fn convert_rejects_garbage() {
        let task = Task::submitted("t-1", "m", b"not json".to_vec(), 0);
        let err = adaptor().convert_to_video(&task).unwrap_err();
        assert!(matches!(err, RelayError::UpstreamProtocol { .. }));
    }
}
