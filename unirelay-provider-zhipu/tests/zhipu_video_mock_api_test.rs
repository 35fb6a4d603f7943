//! Zhipu video task lifecycle against a mock upstream.

use chrono::Utc;
use serde_json::json;
use tracing_test::traced_test;
use unirelay_core::adaptor::TaskAdaptor;
use unirelay_core::channel::{ChannelConfig, ChannelType};
use unirelay_core::error::RelayError;
use unirelay_core::types::{CanonicalRequest, TaskStatus, VideoObject, VideoRequest};
use unirelay_core::{RelayFormat, RelayInfo, RelayMode};
use unirelay_provider_zhipu::ZhipuVideoAdaptor;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn adaptor(server: &MockServer) -> ZhipuVideoAdaptor {
    ZhipuVideoAdaptor::new(ChannelConfig::new(ChannelType::ZhipuV4, "test-key").with_base_url(server.uri()))
        .expect("valid config")
}

fn submit_info(req: VideoRequest) -> RelayInfo {
    RelayInfo::new(
        RelayFormat::OpenAi,
        RelayMode::VideoSubmit,
        CanonicalRequest::Video(req),
    )
}

async fn mount_fetch(server: &MockServer, task_id: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/api/paas/v4/async-result/{task_id}")))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .up_to_n_times(1)
        .mount(server)
        .await;
}

#[tokio::test]
#[traced_test]
async fn submit_poll_and_convert() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/paas/v4/videos/generations"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "cogvideox-3",
            "prompt": "a cat surfing",
            "image_url": "https://img.example.com/cat.png",
            "duration": 10
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "cogvideox-3",
            "id": "task-123",
            "request_id": "req-1",
            "task_status": "PROCESSING"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let adaptor = adaptor(&server);
    let mut request = VideoRequest::new("cogvideox-3", "a cat surfing").with_duration(10);
    request.images = vec!["https://img.example.com/cat.png".to_string()];
    let mut info = submit_info(request);
    adaptor.validate_and_price(&mut info).expect("valid request");
    assert_eq!(info.price_data.other_ratios.get("seconds"), Some(10.0));

    let outcome = adaptor.submit(&info).await.expect("submit");
    assert_eq!(outcome.task_id, "task-123");
    assert_eq!(outcome.video.status, "queued");
    assert_eq!(outcome.video.model, "cogvideox-3");
    assert!(logs_contain("task submitted"));

    let mut task = outcome.into_task();
    assert_eq!(task.status, TaskStatus::Submitted);

    // Earlier mounts match first; each fetch mock answers once.
    mount_fetch(
        &server,
        "task-123",
        json!({"id": "task-123", "task_status": "PROCESSING"}),
    )
    .await;
    mount_fetch(
        &server,
        "task-123",
        json!({
            "id": "task-123",
            "task_status": "SUCCESS",
            "video_result": [{
                "url": "https://cdn.example.com/v.mp4",
                "cover_image_url": "https://cdn.example.com/c.png"
            }]
        }),
    )
    .await;

    let now = Utc::now().timestamp();
    assert!(adaptor.poll(&mut task, now).await.expect("poll"));
    assert_eq!(task.status, TaskStatus::InProgress);
    assert_eq!(task.progress, "50%");

    assert!(adaptor.poll(&mut task, now + 5).await.expect("poll"));
    assert_eq!(task.status, TaskStatus::Success);
    assert_eq!(task.result_url(), Some("https://cdn.example.com/v.mp4"));
    assert_eq!(task.finished_at, Some(now + 5));

    // Terminal tasks are not fetched again.
    assert!(!adaptor.poll(&mut task, now + 10).await.expect("poll"));

    let video: VideoObject = serde_json::from_slice(&adaptor.convert_to_video(&task).unwrap()).unwrap();
    assert_eq!(video.task_id, "task-123");
    assert_eq!(video.status, "completed");
    assert_eq!(video.progress, 100);
    assert_eq!(video.metadata_str("url"), Some("https://cdn.example.com/v.mp4"));
    assert_eq!(
        video.metadata_str("cover_image_url"),
        Some("https://cdn.example.com/c.png")
    );
}

#[tokio::test]
async fn failed_generation_is_terminal() {
    let server = MockServer::start().await;
    mount_fetch(
        &server,
        "task-9",
        json!({"id": "task-9", "task_status": "FAIL"}),
    )
    .await;

    let adaptor = adaptor(&server);
    let mut task = unirelay_core::types::Task::submitted("task-9", "cogvideox-3", Vec::new(), 0);
    assert!(adaptor.poll(&mut task, 42).await.expect("poll"));

    assert_eq!(task.status, TaskStatus::Failure);
    assert_eq!(task.reason.as_deref(), Some("zhipu video generation failed"));
    let video: VideoObject = serde_json::from_slice(&adaptor.convert_to_video(&task).unwrap()).unwrap();
    assert_eq!(video.status, "failed");
    assert_eq!(video.error.unwrap().message, "zhipu video generation failed");
}

#[tokio::test]
async fn seedance_usage_is_reported_on_success() {
    let server = MockServer::start().await;
    mount_fetch(
        &server,
        "task-s",
        json!({
            "id": "task-s",
            "task_status": "SUCCESS",
            "video_result": [{"url": "https://cdn.example.com/s.mp4"}],
            "usage": {"prompt_tokens": 0, "completion_tokens": 108900, "total_tokens": 108900}
        }),
    )
    .await;

    let adaptor = adaptor(&server);
    let resp = adaptor.fetch_task("task-s").await.expect("fetch");
    let info = adaptor.parse_task_result(&resp.body).expect("parse");
    assert!(info.has_token_usage());
    assert_eq!(info.completion_tokens, 108900);
    assert_eq!(info.url.as_deref(), Some("https://cdn.example.com/s.mp4"));
}

#[tokio::test]
async fn submit_without_task_id_is_a_protocol_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/paas/v4/videos/generations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "request_id": "req-2",
            "task_status": "PROCESSING"
        })))
        .mount(&server)
        .await;

    let adaptor = adaptor(&server);
    let mut info = submit_info(VideoRequest::new("kling-v2-1", "a fox"));
    adaptor.validate_and_price(&mut info).unwrap();
    let err = adaptor.submit(&info).await.unwrap_err();

    assert!(matches!(err, RelayError::UpstreamProtocol { .. }));
    assert!(err.raw_body().unwrap().contains("req-2"));
}

#[tokio::test]
async fn submit_error_status_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/paas/v4/videos/generations"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"code": "1214", "message": "prompt is invalid"}
        })))
        .mount(&server)
        .await;

    let adaptor = adaptor(&server);
    let mut info = submit_info(VideoRequest::new("cogvideox-3", "?"));
    adaptor.validate_and_price(&mut info).unwrap();
    let err = adaptor.submit(&info).await.unwrap_err();

    assert_eq!(err.status_code(), 400);
    assert_eq!(err.error_code(), "1214");
}

#[tokio::test]
async fn empty_task_id_is_rejected_before_any_request() {
    let server = MockServer::start().await;
    let err = adaptor(&server).fetch_task("  ").await.unwrap_err();
    assert!(matches!(err, RelayError::RequestValidation(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}
