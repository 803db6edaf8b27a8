mod remote;
#[cfg(test)]
pub(crate) mod testing;
pub mod transport;

use crate::{
    config::{ClientConfig, Endpoints},
    error::{GenerationError, Result},
    models::{
        GenerationParams, GenerationRequest, ImagePayload, TaskHandle, TaskStatus, UploadedImage,
    },
};
use serde_json::Value;
use std::sync::Arc;

pub use transport::{HttpTransport, RemoteRequest, RemoteResponse, Transport, TransportError};

pub const UPLOAD_FAILED: &str = "Failed to upload image";
pub const GENERATION_FAILED: &str = "Failed to start generation";
pub const STATUS_FAILED: &str = "Failed to get task status";
pub const HEALTH_FAILED: &str = "Health check failed";

const IMAGE_FIELD: &str = "image";

/// Stateless client for the upload / generate / status API. Cloning is cheap
/// and clones share the underlying connection pool.
#[derive(Clone)]
pub struct GenerationClient {
    transport: Arc<dyn Transport>,
    endpoints: Endpoints,
}

impl GenerationClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let endpoints = config.endpoints.clone();
        log::debug!("Generation client targeting {}", config.base_url);
        let transport = HttpTransport::new(config)?;

        Ok(Self {
            transport: Arc::new(transport),
            endpoints,
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env())
    }

    pub fn with_transport(transport: Arc<dyn Transport>, endpoints: Endpoints) -> Self {
        Self {
            transport,
            endpoints,
        }
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    async fn call(&self, request: RemoteRequest, fallback: &str) -> Result<Value> {
        log::debug!("{} {}", request.method(), request.path());
        let outcome = self.transport.send(request).await;
        remote::normalize(outcome, fallback)
    }

    /// Upload an image and return the URL the service hosts it at.
    pub async fn submit_image(&self, image: ImagePayload) -> Result<UploadedImage> {
        log::info!(
            "Uploading {} ({} bytes, {})",
            image.file_name,
            image.len(),
            image.mime_type
        );

        let request = RemoteRequest::Multipart {
            path: self.endpoints.upload.clone(),
            field: IMAGE_FIELD.to_string(),
            image,
        };
        let body = self.call(request, UPLOAD_FAILED).await?;
        let url = remote::required_str(&body, "/data/url", UPLOAD_FAILED)?;

        log::info!("Image uploaded: {}", url);
        Ok(UploadedImage(url))
    }

    /// Forward an upload body that is already multipart-encoded.
    pub async fn relay_upload(
        &self,
        content_type: impl Into<String>,
        body: Vec<u8>,
    ) -> Result<UploadedImage> {
        let content_type = content_type.into();
        log::info!("Relaying upload ({} bytes, {})", body.len(), content_type);

        let request = RemoteRequest::Raw {
            path: self.endpoints.upload.clone(),
            content_type,
            body,
        };
        let body = self.call(request, UPLOAD_FAILED).await?;
        let url = remote::required_str(&body, "/data/url", UPLOAD_FAILED)?;

        log::info!("Image uploaded: {}", url);
        Ok(UploadedImage(url))
    }

    pub async fn start_generation(
        &self,
        image: &UploadedImage,
        prompt: &str,
        params: GenerationParams,
    ) -> Result<TaskHandle> {
        self.submit_generation(GenerationRequest::new(image.url(), prompt, params))
            .await
    }

    pub async fn submit_generation(&self, request: GenerationRequest) -> Result<TaskHandle> {
        log::info!("Starting generation (size {})", request.size);

        let body = serde_json::to_value(&request)
            .map_err(|e| GenerationError::ConfigError(e.to_string()))?;
        let request = RemoteRequest::Json {
            path: self.endpoints.generate.clone(),
            body,
        };
        let body = self.call(request, GENERATION_FAILED).await?;
        let task_id = remote::required_str(&body, "/data/taskId", GENERATION_FAILED)?;

        log::info!("Generation task started: {}", task_id);
        Ok(TaskHandle { task_id })
    }

    /// Fetch one status snapshot. Deciding whether the task is finished is up
    /// to the caller, see [`crate::poller`].
    pub async fn poll_status(&self, handle: &TaskHandle) -> Result<TaskStatus> {
        let request = RemoteRequest::Get {
            path: self.endpoints.status_for(&handle.task_id),
        };
        let body = self.call(request, STATUS_FAILED).await?;
        Ok(TaskStatus(body))
    }

    pub async fn health(&self) -> Result<Value> {
        let request = RemoteRequest::Get {
            path: self.endpoints.health.clone(),
        };
        self.call(request, HEALTH_FAILED).await
    }
}

#[cfg(test)]
mod tests {
    use super::testing::FakeTransport;
    use super::*;
    use crate::models::ImageSize;
    use serde_json::json;

    fn client_with(transport: FakeTransport) -> (GenerationClient, Arc<FakeTransport>) {
        let transport = Arc::new(transport);
        let client = GenerationClient::with_transport(transport.clone(), Endpoints::default());
        (client, transport)
    }

    fn png() -> ImagePayload {
        ImagePayload::new(vec![0x89, b'P', b'N', b'G'], "cat.png", "image/png")
    }

    #[tokio::test]
    async fn test_submit_image_returns_url() {
        let (client, transport) = client_with(FakeTransport::new().reply(
            200,
            json!({ "success": true, "data": { "url": "https://cdn/cat.png" } }),
        ));

        let uploaded = client.submit_image(png()).await.unwrap();
        assert_eq!(uploaded.url(), "https://cdn/cat.png");

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        match &requests[0] {
            RemoteRequest::Multipart { path, field, image } => {
                assert_eq!(path, "/api/upload");
                assert_eq!(field, "image");
                assert_eq!(image, &png());
            }
            other => panic!("unexpected request {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_submit_image_missing_url_fails_with_fallback() {
        let (client, _) = client_with(FakeTransport::new().reply(200, json!({ "data": {} })));

        let err = client.submit_image(png()).await.unwrap_err();
        assert_eq!(err.message(), UPLOAD_FAILED);
    }

    #[tokio::test]
    async fn test_submit_image_surfaces_server_error() {
        let (client, _) =
            client_with(FakeTransport::new().reply(429, json!({ "error": "quota exceeded" })));

        let err = client.submit_image(png()).await.unwrap_err();
        assert_eq!(err.to_string(), "quota exceeded");
    }

    #[tokio::test]
    async fn test_submit_image_unparseable_error_uses_fallback() {
        let (client, _) = client_with(FakeTransport::new().reply_raw(502, None));

        let err = client.submit_image(png()).await.unwrap_err();
        assert_eq!(err.message(), UPLOAD_FAILED);
    }

    #[tokio::test]
    async fn test_submit_image_network_failure() {
        let (client, _) = client_with(FakeTransport::new().fail("connection reset"));

        let err = client.submit_image(png()).await.unwrap_err();
        assert!(err.is_remote());
        assert_eq!(err.message(), UPLOAD_FAILED);
    }

    #[tokio::test]
    async fn test_relay_upload_forwards_body_verbatim() {
        let (client, transport) = client_with(
            FakeTransport::new().reply(200, json!({ "data": { "url": "https://cdn/r.png" } })),
        );

        let uploaded = client
            .relay_upload("multipart/form-data; boundary=xyz", b"--xyz".to_vec())
            .await
            .unwrap();
        assert_eq!(uploaded, UploadedImage("https://cdn/r.png".into()));

        assert_eq!(
            transport.requests(),
            vec![RemoteRequest::Raw {
                path: "/api/upload".into(),
                content_type: "multipart/form-data; boundary=xyz".into(),
                body: b"--xyz".to_vec(),
            }]
        );
    }

    #[tokio::test]
    async fn test_start_generation_returns_task_handle() {
        let (client, transport) = client_with(
            FakeTransport::new().reply(200, json!({ "data": { "taskId": "task-42" } })),
        );

        let image = UploadedImage("https://cdn/cat.png".into());
        let params = GenerationParams::new().with_size(ImageSize::Portrait9x16);
        let handle = client
            .start_generation(&image, "turn it into a banana", params)
            .await
            .unwrap();
        assert_eq!(handle, TaskHandle::new("task-42"));

        assert_eq!(
            transport.requests(),
            vec![RemoteRequest::Json {
                path: "/api/generate-with-image".into(),
                body: json!({
                    "imageUrl": "https://cdn/cat.png",
                    "prompt": "turn it into a banana",
                    "size": "9:16"
                }),
            }]
        );
    }

    #[tokio::test]
    async fn test_start_generation_without_task_id_fails() {
        let (client, _) = client_with(FakeTransport::new().reply(200, json!({ "success": true })));

        let image = UploadedImage("u".into());
        let err = client
            .start_generation(&image, "p", GenerationParams::default())
            .await
            .unwrap_err();
        assert_eq!(err.message(), GENERATION_FAILED);
    }

    #[tokio::test]
    async fn test_poll_status_is_one_get_returning_body_verbatim() {
        let status = json!({
            "data": { "status": "running", "progress": 0.4, "extra": [null, true] }
        });
        let (client, transport) = client_with(FakeTransport::new().reply(200, status.clone()));

        let result = client.poll_status(&TaskHandle::new("task-42")).await.unwrap();
        assert_eq!(result.as_json(), &status);
        assert_eq!(
            transport.requests(),
            vec![RemoteRequest::Get {
                path: "/api/status/task-42".into()
            }]
        );
    }

    #[tokio::test]
    async fn test_poll_status_unknown_task_is_error() {
        let (client, _) = client_with(FakeTransport::new().reply(404, json!({})));

        let err = client.poll_status(&TaskHandle::new("expired")).await.unwrap_err();
        assert_eq!(err.message(), STATUS_FAILED);
        assert_eq!(err.upstream_status(), Some(404));
    }

    #[tokio::test]
    async fn test_poll_status_encodes_task_id_segment() {
        let (client, transport) =
            client_with(FakeTransport::new().reply(200, json!({ "data": { "status": "done" } })));

        client
            .poll_status(&TaskHandle::new("job#7/x?y=1"))
            .await
            .unwrap();
        assert_eq!(
            transport.requests(),
            vec![RemoteRequest::Get {
                path: "/api/status/job%237%2Fx%3Fy%3D1".into()
            }]
        );
    }

    #[tokio::test]
    async fn test_health() {
        let (client, transport) =
            client_with(FakeTransport::new().reply(200, json!({ "status": "ok" })));

        assert_eq!(client.health().await.unwrap(), json!({ "status": "ok" }));
        assert_eq!(transport.requests()[0].path(), "/api/health");
    }
}
