//! Failure normalisation shared by every remote operation.
//!
//! Whatever went wrong (no response, non-2xx, unexpected body) the caller sees
//! one `RemoteCallFailed` whose message is the server's `error` field if it
//! sent one, else the operation's fallback.

use super::transport::{RemoteResponse, TransportError};
use crate::error::{GenerationError, Result};
use serde_json::Value;

pub(crate) fn normalize(
    outcome: std::result::Result<RemoteResponse, TransportError>,
    fallback: &str,
) -> Result<Value> {
    let response = match outcome {
        Ok(response) => response,
        Err(e) => {
            log::error!("{}: {}", fallback, e);
            return Err(GenerationError::remote(fallback));
        }
    };

    let succeeded = response.is_success();
    let status = response.status;

    match response.body {
        Some(body) if succeeded => Ok(body),
        body => {
            let message = body
                .as_ref()
                .and_then(server_message)
                .unwrap_or_else(|| fallback.to_string());
            log::error!("{} (HTTP {}): {}", fallback, status, message);
            if succeeded {
                Err(GenerationError::remote(message))
            } else {
                Err(GenerationError::remote_with_status(message, status))
            }
        }
    }
}

/// Pull a required string out of a successful body.
pub(crate) fn required_str(body: &Value, pointer: &str, fallback: &str) -> Result<String> {
    match body.pointer(pointer).and_then(Value::as_str) {
        Some(value) if !value.is_empty() => Ok(value.to_string()),
        _ => {
            let message = server_message(body).unwrap_or_else(|| fallback.to_string());
            log::error!("{}: response has no {}", fallback, pointer);
            Err(GenerationError::remote(message))
        }
    }
}

fn server_message(body: &Value) -> Option<String> {
    body.get("error")
        .and_then(Value::as_str)
        .filter(|msg| !msg.is_empty())
        .map(String::from)
}
