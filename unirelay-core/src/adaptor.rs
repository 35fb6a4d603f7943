//! Adaptor capability traits
//!
//! A [`ChannelAdaptor`] relays synchronous calls (chat, image, audio, ...);
//! a [`TaskAdaptor`] drives asynchronous jobs through submit and fetch.
//! Both are built fresh from a `ChannelConfig` for every logical request and
//! only take `&self`, so one value is never shared between concurrent calls.

use crate::error::RelayError;
use crate::execution::{HttpTransport, HttpTransportRequest, RawResponse, error_from_response};
use crate::observability::ChannelTracer;
use crate::relay::RelayInfo;
use crate::types::{Task, TaskInfo, Usage, VideoObject};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::HeaderMap;

/// What a synchronous relay hands back to the orchestrator.
#[derive(Debug, Clone)]
pub struct RelayOutput {
    /// Status to forward to the caller
    pub status: u16,
    pub content_type: Option<String>,
    /// Body to forward to the caller
    pub body: Bytes,
    pub usage: Usage,
}

impl RelayOutput {
    pub fn json(body: Bytes, usage: Usage) -> Self {
        Self {
            status: 200,
            content_type: Some("application/json".to_string()),
            body,
            usage,
        }
    }

    /// Forward an upstream response unchanged.
    pub fn forwarded(resp: &RawResponse, usage: Usage) -> Self {
        Self {
            status: resp.status,
            content_type: resp.content_type().map(str::to_string),
            body: resp.body.clone(),
            usage,
        }
    }
}

/// Result of a successful job submission.
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub task_id: String,
    /// Raw submit response body, to persist with the task
    pub task_data: Bytes,
    /// Canonical object returned to the caller (`status = "queued"`)
    pub video: VideoObject,
}

impl SubmitOutcome {
    /// Task record in `Submitted` state for the task store.
    pub fn into_task(self) -> Task {
        Task::submitted(
            self.task_id,
            self.video.model,
            self.task_data.to_vec(),
            self.video.created_at,
        )
    }
}

async fn send(
    channel: &str,
    model: &str,
    transport: &dyn HttpTransport,
    request: HttpTransportRequest,
) -> Result<RawResponse, RelayError> {
    let tracer = ChannelTracer::new(channel).with_model(model);
    tracer.trace_request_start(request.method.as_str(), &request.url);
    tracer.trace_request_details(&request.headers, request.body.as_deref());
    match transport.execute(request).await {
        Ok(resp) => {
            tracer.trace_response(resp.status, &resp.body);
            Ok(resp)
        }
        Err(e) => {
            tracer.trace_request_error(&e);
            Err(e)
        }
    }
}

/// Synchronous channel adaptor: one upstream round trip per call.
#[async_trait]
pub trait ChannelAdaptor: Send + Sync {
    /// Channel identifier used in logs and error types
    fn channel_name(&self) -> &'static str;

    /// Models this channel serves.
    fn model_list(&self) -> Vec<String>;

    fn transport(&self) -> &dyn HttpTransport;

    /// Resolve the upstream endpoint by (format, mode).
    fn request_url(&self, info: &RelayInfo) -> Result<String, RelayError>;

    fn build_headers(&self, info: &RelayInfo) -> Result<HeaderMap, RelayError>;

    /// Canonical request to provider wire bytes.
    fn convert_request(&self, info: &RelayInfo) -> Result<Bytes, RelayError>;

    /// Issue the outbound call. Mechanical: no interpretation of the response.
    async fn do_request(&self, info: &RelayInfo, body: Bytes) -> Result<RawResponse, RelayError> {
        let url = self.request_url(info)?;
        let headers = self.build_headers(info)?;
        send(
            self.channel_name(),
            info.request.model(),
            self.transport(),
            HttpTransportRequest::post(url, headers, body),
        )
        .await
    }

    /// Interpret a successful upstream response.
    ///
    /// Takes `&mut RelayInfo` because a handler may adjust `price_data`
    /// (fixed-price refund on partial image results).
    async fn do_response(
        &self,
        info: &mut RelayInfo,
        resp: RawResponse,
    ) -> Result<RelayOutput, RelayError>;

    /// Validate, convert, send and interpret in one go.
    async fn relay(&self, info: &mut RelayInfo) -> Result<RelayOutput, RelayError> {
        info.request.validate()?;
        let body = self.convert_request(info)?;
        let resp = self.do_request(info, body).await?;
        if !resp.is_success() {
            return Err(error_from_response(self.channel_name(), &resp));
        }
        self.do_response(info, resp).await
    }
}

/// Asynchronous job adaptor: submit once, then poll until terminal.
#[async_trait]
pub trait TaskAdaptor: Send + Sync {
    fn channel_name(&self) -> &'static str;

    fn model_list(&self) -> Vec<String>;

    fn transport(&self) -> &dyn HttpTransport;

    /// Validate the canonical request and fill `info.price_data.other_ratios`.
    fn validate_and_price(&self, info: &mut RelayInfo) -> Result<(), RelayError>;

    fn submit_url(&self, info: &RelayInfo) -> String;

    fn fetch_url(&self, task_id: &str) -> String;

    fn build_headers(&self) -> Result<HeaderMap, RelayError>;

    fn build_submit_body(&self, info: &RelayInfo) -> Result<Bytes, RelayError>;

    /// Parse the submit response; an absent task id is a protocol error.
    fn handle_submit_response(
        &self,
        info: &RelayInfo,
        resp: &RawResponse,
    ) -> Result<SubmitOutcome, RelayError>;

    /// Pure mapping of a fetch payload to canonical task state.
    fn parse_task_result(&self, body: &[u8]) -> Result<TaskInfo, RelayError>;

    /// Render a stored task as the canonical video object (JSON bytes).
    ///
    /// `task.raw_payload` may hold either the submit or the fetch response.
    fn convert_to_video(&self, task: &Task) -> Result<Bytes, RelayError>;

    /// Submit a job. `validate_and_price` must have run on `info`.
    async fn submit(&self, info: &RelayInfo) -> Result<SubmitOutcome, RelayError> {
        let body = self.build_submit_body(info)?;
        let request =
            HttpTransportRequest::post(self.submit_url(info), self.build_headers()?, body);
        let resp = send(
            self.channel_name(),
            info.request.model(),
            self.transport(),
            request,
        )
        .await?;
        if !resp.is_success() {
            return Err(error_from_response(self.channel_name(), &resp));
        }
        let outcome = self.handle_submit_response(info, &resp)?;
        tracing::info!(
            channel = self.channel_name(),
            task_id = %outcome.task_id,
            model = %outcome.video.model,
            "task submitted"
        );
        Ok(outcome)
    }

    /// Fetch the raw task payload.
    async fn fetch_task(&self, task_id: &str) -> Result<RawResponse, RelayError> {
        if task_id.trim().is_empty() {
            return Err(RelayError::RequestValidation(
                "task_id is required".to_string(),
            ));
        }
        let request = HttpTransportRequest::get(self.fetch_url(task_id), self.build_headers()?);
        let resp = send(self.channel_name(), "", self.transport(), request).await?;
        if !resp.is_success() {
            return Err(error_from_response(self.channel_name(), &resp));
        }
        Ok(resp)
    }

    /// Fetch, map and fold one poll into `task`. Returns whether the task changed.
    async fn poll(&self, task: &mut Task, now: i64) -> Result<bool, RelayError> {
        if task.status.is_terminal() {
            return Ok(false);
        }
        let resp = self.fetch_task(task.id()).await?;
        let info = self.parse_task_result(&resp.body)?;
        Ok(task.apply(&info, resp.body.to_vec(), now))
    }
}
