//! Passthrough API for browser front ends: the same four routes the client
//! speaks, relayed to an upstream generation service.

use crate::{
    client::GenerationClient,
    config::ServerConfig,
    error::GenerationError,
    models::{GenerationRequest, TaskHandle},
};
use actix_web::{
    http::{header::CONTENT_TYPE, StatusCode},
    web, App, HttpRequest, HttpResponse, HttpServer, ResponseError,
};
use serde_json::json;

/// Largest upload body accepted for relaying.
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

impl ResponseError for GenerationError {
    /// Upstream 4xx/5xx answers keep their status; everything else is ours.
    fn status_code(&self) -> StatusCode {
        let upstream = self
            .upstream_status()
            .and_then(|code| StatusCode::from_u16(code).ok())
            .filter(|code| code.is_client_error() || code.is_server_error());

        match (self, upstream) {
            (_, Some(code)) => code,
            (GenerationError::ConfigError(_), None) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "success": false,
            "error": self.message(),
        }))
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health))
            .route("/upload", web::post().to(upload))
            .route("/generate-with-image", web::post().to(generate))
            .route("/status/{task_id}", web::get().to(status)),
    );
}

pub async fn run(config: ServerConfig) -> std::io::Result<()> {
    let client = GenerationClient::new(config.upstream.clone())
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    let client = web::Data::new(client);

    crate::logger::log_startup_info(
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        &config.host,
        config.port,
        &config.upstream.base_url,
    );

    HttpServer::new(move || {
        App::new()
            .app_data(client.clone())
            .app_data(web::PayloadConfig::new(MAX_UPLOAD_BYTES))
            .configure(configure)
    })
    .bind(config.bind_address())?
    .run()
    .await
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn upload(
    client: web::Data<GenerationClient>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse, GenerationError> {
    if body.is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "success": false,
            "error": "No image file provided",
        })));
    }

    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();

    let uploaded = client.relay_upload(content_type, body.to_vec()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": { "url": uploaded.url() },
    })))
}

async fn generate(
    client: web::Data<GenerationClient>,
    request: web::Json<GenerationRequest>,
) -> Result<HttpResponse, GenerationError> {
    let handle = client.submit_generation(request.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": { "taskId": handle.task_id },
    })))
}

async fn status(
    client: web::Data<GenerationClient>,
    task_id: web::Path<String>,
) -> Result<HttpResponse, GenerationError> {
    let status = client
        .poll_status(&TaskHandle::new(task_id.into_inner()))
        .await?;
    Ok(HttpResponse::Ok().json(status.into_json()))
}
