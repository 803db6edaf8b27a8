use crate::error::{GenerationError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// URL of an image hosted by the generation service, as returned by an upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UploadedImage(pub String);

impl UploadedImage {
    pub fn url(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UploadedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raw image bytes plus what the multipart part needs to describe them.
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePayload {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub mime_type: String,
}

impl ImagePayload {
    pub fn new(
        bytes: Vec<u8>,
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            bytes,
            file_name: file_name.into(),
            mime_type: mime_type.into(),
        }
    }

    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("image")
            .to_string();
        let mime_type = mime_from_file_name(&file_name).to_string();

        Ok(Self {
            bytes,
            file_name,
            mime_type,
        })
    }

    /// Decode a `data:image/png;base64,...` URL, the form browsers hand over
    /// from a file input.
    pub fn from_data_url(data_url: &str, file_name: impl Into<String>) -> Result<Self> {
        let rest = data_url
            .strip_prefix("data:")
            .ok_or_else(|| GenerationError::ConfigError("Not a data URL".into()))?;
        let (header, encoded) = rest
            .split_once(',')
            .ok_or_else(|| GenerationError::ConfigError("Malformed data URL".into()))?;
        let mime_type = header
            .strip_suffix(";base64")
            .ok_or_else(|| GenerationError::ConfigError("Data URL is not base64".into()))?;

        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| GenerationError::ConfigError(format!("Invalid base64 image: {}", e)))?;

        let mime_type = if mime_type.is_empty() {
            "application/octet-stream"
        } else {
            mime_type
        };

        Ok(Self::new(bytes, file_name, mime_type))
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

fn mime_from_file_name(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "heic" => "image/heic",
        _ => "application/octet-stream",
    }
}
