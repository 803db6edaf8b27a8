use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;

use crate::error::GenerationError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageSize {
    #[default]
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "16:9")]
    Landscape16x9,
    #[serde(rename = "9:16")]
    Portrait9x16,
    #[serde(rename = "4:3")]
    Landscape4x3,
    #[serde(rename = "3:4")]
    Portrait3x4,
    #[serde(rename = "3:2")]
    Landscape3x2,
    #[serde(rename = "2:3")]
    Portrait2x3,
    #[serde(rename = "21:9")]
    Ultrawide,
    #[serde(rename = "auto")]
    Auto,
}

impl ImageSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageSize::Square => "1:1",
            ImageSize::Landscape16x9 => "16:9",
            ImageSize::Portrait9x16 => "9:16",
            ImageSize::Landscape4x3 => "4:3",
            ImageSize::Portrait3x4 => "3:4",
            ImageSize::Landscape3x2 => "3:2",
            ImageSize::Portrait2x3 => "2:3",
            ImageSize::Ultrawide => "21:9",
            ImageSize::Auto => "auto",
        }
    }

    pub fn all() -> &'static [ImageSize] {
        &[
            ImageSize::Square,
            ImageSize::Landscape16x9,
            ImageSize::Portrait9x16,
            ImageSize::Landscape4x3,
            ImageSize::Portrait3x4,
            ImageSize::Landscape3x2,
            ImageSize::Portrait2x3,
            ImageSize::Ultrawide,
            ImageSize::Auto,
        ]
    }
}

impl FromStr for ImageSize {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        ImageSize::all()
            .iter()
            .find(|size| size.as_str().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| GenerationError::ConfigError(format!("Unknown image size: {}", s)))
    }
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters besides the image and the prompt. Anything in `extra` is sent
/// alongside `size` at the top level of the request body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationParams {
    pub size: ImageSize,
    pub extra: Map<String, Value>,
}

impl GenerationParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_size(mut self, size: ImageSize) -> Self {
        self.size = size;
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub image_url: String,
    pub prompt: String,
    #[serde(default)]
    pub size: ImageSize,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GenerationRequest {
    pub fn new(
        image_url: impl Into<String>,
        prompt: impl Into<String>,
        params: GenerationParams,
    ) -> Self {
        Self {
            image_url: image_url.into(),
            prompt: prompt.into(),
            size: params.size,
            extra: params.extra,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskHandle {
    pub task_id: String,
}

impl TaskHandle {
    pub fn new(task_id: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
        }
    }
}

/// Whatever the status endpoint answered, untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskStatus(pub Value);

impl TaskStatus {
    pub fn as_json(&self) -> &Value {
        &self.0
    }

    pub fn into_json(self) -> Value {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    Pending,
    Completed,
    Failed,
}

impl TaskState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TaskState::Pending)
    }

    /// Best-effort reading of common status payload shapes. The service
    /// contract does not fix one, so callers with a known backend should pass
    /// their own classifier to the poller instead.
    pub fn guess(status: &TaskStatus) -> TaskState {
        let json = status.as_json();

        if let Some(flag) = json.pointer("/data/successFlag").and_then(Value::as_i64) {
            return match flag {
                1 => TaskState::Completed,
                2 | 3 => TaskState::Failed,
                _ => TaskState::Pending,
            };
        }

        let label = ["/data/status", "/data/state", "/status", "/state"]
            .iter()
            .find_map(|pointer| json.pointer(pointer).and_then(Value::as_str));

        match label.map(|s| s.to_ascii_lowercase()).as_deref() {
            Some("completed" | "complete" | "succeeded" | "success" | "done") => {
                TaskState::Completed
            }
            Some("failed" | "failure" | "error" | "cancelled" | "canceled") => TaskState::Failed,
            _ => TaskState::Pending,
        }
    }
}
