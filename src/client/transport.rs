use crate::{
    config::ClientConfig,
    error::{GenerationError, Result},
    models::ImagePayload,
};
use async_trait::async_trait;
use reqwest::{
    header::CONTENT_TYPE,
    multipart::{Form, Part},
    Client,
};
use serde_json::Value;

/// One outbound call, described independently of the HTTP library.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteRequest {
    Multipart {
        path: String,
        field: String,
        image: ImagePayload,
    },
    /// Body that is already encoded, forwarded with its own content type.
    Raw {
        path: String,
        content_type: String,
        body: Vec<u8>,
    },
    Json {
        path: String,
        body: Value,
    },
    Get {
        path: String,
    },
}

impl RemoteRequest {
    pub fn path(&self) -> &str {
        match self {
            RemoteRequest::Multipart { path, .. }
            | RemoteRequest::Raw { path, .. }
            | RemoteRequest::Json { path, .. }
            | RemoteRequest::Get { path } => path,
        }
    }

    pub fn method(&self) -> &'static str {
        match self {
            RemoteRequest::Get { .. } => "GET",
            _ => "POST",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RemoteResponse {
    pub status: u16,
    /// `None` when the body was empty or not JSON.
    pub body: Option<Value>,
}

impl RemoteResponse {
    pub fn new(status: u16, body: Option<Value>) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The request never produced an HTTP response.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct TransportError(pub String);

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: RemoteRequest)
        -> std::result::Result<RemoteResponse, TransportError>;
}

pub struct HttpTransport {
    client: Client,
    config: ClientConfig,
}

impl HttpTransport {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| {
            GenerationError::ConfigError(format!("Failed to build HTTP client: {}", e))
        })?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        request: RemoteRequest,
    ) -> std::result::Result<RemoteResponse, TransportError> {
        let url = self.config.url_for(request.path());

        let builder = match request {
            RemoteRequest::Multipart { field, image, .. } => {
                let part = Part::bytes(image.bytes)
                    .file_name(image.file_name)
                    .mime_str(&image.mime_type)
                    .map_err(|e| TransportError(format!("Invalid image type: {}", e)))?;
                self.client.post(&url).multipart(Form::new().part(field, part))
            }
            RemoteRequest::Raw {
                content_type, body, ..
            } => self
                .client
                .post(&url)
                .header(CONTENT_TYPE, content_type)
                .body(body),
            RemoteRequest::Json { body, .. } => self.client.post(&url).json(&body),
            RemoteRequest::Get { .. } => self.client.get(&url),
        };

        let builder = match &self.config.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        };

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError(format!("Request to {} failed: {}", url, e)))?;

        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| TransportError(format!("Failed to read response body: {}", e)))?;

        Ok(RemoteResponse {
            status,
            body: serde_json::from_slice(&bytes).ok(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_path_and_method() {
        let get = RemoteRequest::Get {
            path: "/api/status/1".into(),
        };
        assert_eq!(get.path(), "/api/status/1");
        assert_eq!(get.method(), "GET");

        let json = RemoteRequest::Json {
            path: "/api/generate-with-image".into(),
            body: Value::Null,
        };
        assert_eq!(json.method(), "POST");
    }

    #[test]
    fn test_success_range() {
        assert!(RemoteResponse::new(200, None).is_success());
        assert!(RemoteResponse::new(204, None).is_success());
        assert!(!RemoteResponse::new(302, None).is_success());
        assert!(!RemoteResponse::new(500, None).is_success());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        // Port 9 (discard) on localhost is closed on any sane test box.
        let transport =
            HttpTransport::new(ClientConfig::new().with_base_url("http://127.0.0.1:9")).unwrap();
        let result = transport
            .send(RemoteRequest::Get {
                path: "/api/health".into(),
            })
            .await;
        assert!(result.is_err());
    }
}
