//! Asynchronous task records
//!
//! A [`Task`] is created on submit and then only moves forward:
//! `Submitted -> InProgress -> {Success | Failure}`. Terminal states are final.

use serde::{Deserialize, Serialize};

use super::{Usage, VideoError, VideoObject};

/// Canonical task lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Submitted,
    InProgress,
    Success,
    Failure,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Failure)
    }

    fn rank(self) -> u8 {
        match self {
            Self::Submitted => 0,
            Self::InProgress => 1,
            Self::Success | Self::Failure => 2,
        }
    }

    /// Forward-only: never leave a terminal state, never go back a stage.
    pub fn can_transition_to(self, next: TaskStatus) -> bool {
        if self.is_terminal() {
            return self == next;
        }
        next.rank() >= self.rank()
    }

    /// Status label used by the canonical video object.
    pub fn as_video_status(self) -> &'static str {
        match self {
            Self::Submitted => "queued",
            Self::InProgress => "in_progress",
            Self::Success => "completed",
            Self::Failure => "failed",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Submitted => "SUBMITTED",
            Self::InProgress => "IN_PROGRESS",
            Self::Success => "SUCCESS",
            Self::Failure => "FAILURE",
        };
        f.write_str(s)
    }
}

/// Result of interpreting one fetch payload. Produced by a provider's status
/// mapper; pure data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskInfo {
    pub task_id: String,
    pub status: TaskStatus,
    /// e.g. "50%"
    pub progress: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default)]
    pub completion_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
}

impl TaskInfo {
    pub fn new(task_id: impl Into<String>, status: TaskStatus, progress: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            status,
            progress: progress.into(),
            url: None,
            reason: None,
            completion_tokens: 0,
            total_tokens: 0,
        }
    }

    /// Token counters are present for token-billed families.
    pub fn has_token_usage(&self) -> bool {
        self.total_tokens > 0
    }

    pub fn progress_percent(&self) -> u8 {
        parse_progress(&self.progress)
    }
}

/// Final output of a successful task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Inline base64 content, for providers that return bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

/// A provider-side job as tracked by the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    id: String,
    pub model: String,
    pub status: TaskStatus,
    pub progress: String,
    /// Last response body received (submit or fetch shape)
    #[serde(default)]
    pub raw_payload: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<TaskResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub submitted_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<i64>,
}

impl Task {
    /// New task in `Submitted`, holding the submit response body.
    pub fn submitted(
        id: impl Into<String>,
        model: impl Into<String>,
        raw_payload: Vec<u8>,
        submitted_at: i64,
    ) -> Self {
        Self {
            id: id.into(),
            model: model.into(),
            status: TaskStatus::Submitted,
            progress: "0%".to_string(),
            raw_payload,
            result: None,
            reason: None,
            submitted_at,
            finished_at: None,
        }
    }

    /// Provider-assigned id; immutable after creation.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Fold one fetch result into the task.
    ///
    /// Returns `false` (and leaves the task untouched) when the update would
    /// move the task backwards or out of a terminal state. Progress never
    /// decreases.
    pub fn apply(&mut self, info: &TaskInfo, raw_payload: Vec<u8>, now: i64) -> bool {
        if !self.status.can_transition_to(info.status) || self.status.is_terminal() {
            tracing::debug!(
                task_id = %self.id,
                current = %self.status,
                incoming = %info.status,
                "ignoring task update"
            );
            return false;
        }

        self.status = info.status;
        self.raw_payload = raw_payload;
        if info.progress_percent() >= parse_progress(&self.progress) {
            self.progress = info.progress.clone();
        }

        match info.status {
            TaskStatus::Success => {
                let usage = info.has_token_usage().then(|| Usage {
                    completion_tokens: info.completion_tokens,
                    total_tokens: info.total_tokens,
                    ..Default::default()
                });
                self.result = Some(TaskResult {
                    url: info.url.clone(),
                    inline: None,
                    usage,
                });
                self.finished_at = Some(now);
            }
            TaskStatus::Failure => {
                self.reason = info.reason.clone();
                self.finished_at = Some(now);
            }
            _ => {}
        }
        true
    }

    pub fn result_url(&self) -> Option<&str> {
        self.result.as_ref().and_then(|r| r.url.as_deref())
    }

    /// Base canonical video object for this task; providers add metadata.
    pub fn to_video_object(&self) -> VideoObject {
        let mut video = VideoObject::new(self.id.clone(), self.model.clone(), self.submitted_at);
        video.status = self.status.as_video_status().to_string();
        video.progress = parse_progress(&self.progress);
        video.completed_at = self.finished_at;
        if self.status == TaskStatus::Failure {
            video.error = Some(VideoError {
                message: self.reason.clone().unwrap_or_default(),
                code: "task_failed".to_string(),
            });
        }
        video
    }
}

fn parse_progress(progress: &str) -> u8 {
    progress
        .trim()
        .trim_end_matches('%')
        .parse::<u8>()
        .map(|p| p.min(100))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(status: TaskStatus, progress: &str) -> TaskInfo {
        TaskInfo::new("t-1", status, progress)
    }

    #[test]
    fn lifecycle_moves_forward_only() {
        let mut task = Task::submitted("t-1", "cogvideox-3", b"{}".to_vec(), 100);
        assert!(task.apply(&info(TaskStatus::InProgress, "50%"), b"a".to_vec(), 110));
        assert!(!task.apply(&info(TaskStatus::Submitted, "0%"), b"b".to_vec(), 120));
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.raw_payload, b"a");

        let mut done = info(TaskStatus::Success, "100%");
        done.url = Some("https://cdn/v.mp4".into());
        assert!(task.apply(&done, b"c".to_vec(), 130));
        assert_eq!(task.result_url(), Some("https://cdn/v.mp4"));
        assert_eq!(task.finished_at, Some(130));

        assert!(!task.apply(&info(TaskStatus::Failure, "100%"), b"d".to_vec(), 140));
        assert_eq!(task.status, TaskStatus::Success);
        assert_eq!(task.raw_payload, b"c");
    }

    #[test]
    fn progress_never_decreases() {
        let mut task = Task::submitted("t-1", "m", Vec::new(), 0);
        task.apply(&info(TaskStatus::InProgress, "50%"), Vec::new(), 1);
        task.apply(&info(TaskStatus::InProgress, "30%"), Vec::new(), 2);
        assert_eq!(task.progress, "50%");
    }

    #[test]
    fn failed_task_renders_error() {
        let mut task = Task::submitted("t-9", "m", Vec::new(), 5);
        let mut failed = info(TaskStatus::Failure, "100%");
        failed.reason = Some("generation failed".into());
        task.apply(&failed, Vec::new(), 9);

        let video = task.to_video_object();
        assert_eq!(video.status, "failed");
        assert_eq!(video.progress, 100);
        assert_eq!(video.error.unwrap().message, "generation failed");
        assert_eq!(video.task_id, "t-9");
    }

    #[test]
    fn token_usage_only_when_reported() {
        let mut task = Task::submitted("t", "doubao-seedance", Vec::new(), 0);
        let mut ok = info(TaskStatus::Success, "100%");
        ok.completion_tokens = 108900;
        ok.total_tokens = 108900;
        task.apply(&ok, Vec::new(), 1);
        let usage = task.result.unwrap().usage.unwrap();
        assert_eq!(usage.total_tokens, 108900);

        let mut plain = Task::submitted("t", "cogvideox", Vec::new(), 0);
        plain.apply(&info(TaskStatus::Success, "100%"), Vec::new(), 1);
        assert!(plain.result.unwrap().usage.is_none());
    }
}
