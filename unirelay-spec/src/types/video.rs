//! Canonical video task object (OpenAI videos API shape)

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoError {
    pub message: String,
    pub code: String,
}

/// What the orchestrator returns to its caller for submit and fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoObject {
    pub id: String,
    pub task_id: String,
    pub object: String,
    pub model: String,
    /// queued / in_progress / completed / failed
    pub status: String,
    pub progress: u8,
    /// Epoch seconds
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<VideoError>,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub metadata: serde_json::Map<String, Value>,
}

impl VideoObject {
    pub fn new(id: impl Into<String>, model: impl Into<String>, created_at: i64) -> Self {
        let id = id.into();
        Self {
            task_id: id.clone(),
            id,
            object: "video".to_string(),
            model: model.into(),
            status: "queued".to_string(),
            progress: 0,
            created_at,
            completed_at: None,
            error: None,
            metadata: serde_json::Map::new(),
        }
    }

    pub fn set_metadata(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.metadata.insert(key.into(), value.into());
    }

    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(Value::as_str)
    }
}
