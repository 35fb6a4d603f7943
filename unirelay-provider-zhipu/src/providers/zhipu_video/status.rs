//! Zhipu task status tokens -> canonical task state

use super::types::ZhipuVideoFetchResponse;
use unirelay_core::types::{TaskInfo, TaskStatus};

pub const FAILURE_REASON: &str = "zhipu video generation failed";

/// Pure mapping; no I/O, safe to call from any number of pollers.
///
/// Unknown tokens are treated as still running so the poller keeps going.
pub fn map_task_status(resp: &ZhipuVideoFetchResponse) -> TaskInfo {
    match resp.task_status.as_str() {
        "PROCESSING" => TaskInfo::new(&resp.id, TaskStatus::InProgress, "50%"),
        "SUCCESS" => {
            let mut info = TaskInfo::new(&resp.id, TaskStatus::Success, "100%");
            info.url = resp
                .video_result
                .first()
                .map(|r| r.url.clone())
                .filter(|u| !u.is_empty());
            if let Some(usage) = resp.usage.as_ref().filter(|u| u.total_tokens > 0) {
                info.completion_tokens = usage.completion_tokens;
                info.total_tokens = usage.total_tokens;
            }
            info
        }
        "FAIL" => {
            let mut info = TaskInfo::new(&resp.id, TaskStatus::Failure, "100%");
            info.reason = Some(FAILURE_REASON.to_string());
            info
        }
        other => {
            tracing::debug!(task_id = %resp.id, status = other, "unrecognized zhipu task status");
            TaskInfo::new(&resp.id, TaskStatus::InProgress, "30%")
        }
    }
}
