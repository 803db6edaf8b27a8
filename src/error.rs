use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerationError {
    /// A remote call failed. The message is the server's `error` field when it
    /// sent one, otherwise the operation's fallback text. `status` is the HTTP
    /// status of a non-2xx answer.
    #[error("{message}")]
    RemoteCallFailed {
        message: String,
        status: Option<u16>,
    },
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Task {task_id} did not finish within {waited_secs}s")]
    PollTimeout { task_id: String, waited_secs: u64 },
    #[error("Task {task_id} failed: {status}")]
    TaskFailed {
        task_id: String,
        status: serde_json::Value,
    },
}

impl GenerationError {
    pub fn remote(message: impl Into<String>) -> Self {
        GenerationError::RemoteCallFailed {
            message: message.into(),
            status: None,
        }
    }

    pub fn remote_with_status(message: impl Into<String>, status: u16) -> Self {
        GenerationError::RemoteCallFailed {
            message: message.into(),
            status: Some(status),
        }
    }

    /// HTTP status the remote service answered with, if it answered non-2xx.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            GenerationError::RemoteCallFailed { status, .. } => *status,
            _ => None,
        }
    }

    /// Human readable message, suitable for showing to an end user.
    pub fn message(&self) -> String {
        match self {
            GenerationError::RemoteCallFailed { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, GenerationError::RemoteCallFailed { .. })
    }
}

pub type Result<T> = std::result::Result<T, GenerationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_error_displays_bare_message() {
        let err = GenerationError::remote("quota exceeded");
        assert_eq!(err.to_string(), "quota exceeded");
        assert_eq!(err.message(), "quota exceeded");
        assert!(err.is_remote());
        assert_eq!(err.upstream_status(), None);
    }

    #[test]
    fn test_remote_error_keeps_upstream_status() {
        let err = GenerationError::remote_with_status("task not found", 404);
        assert_eq!(err.to_string(), "task not found");
        assert_eq!(err.upstream_status(), Some(404));
        assert_eq!(
            GenerationError::ConfigError("x".into()).upstream_status(),
            None
        );
    }

    #[test]
    fn test_other_errors_carry_prefix() {
        let err = GenerationError::ConfigError("missing base url".into());
        assert_eq!(err.to_string(), "Configuration error: missing base url");
        assert!(!err.is_remote());

        let err = GenerationError::PollTimeout {
            task_id: "t-1".into(),
            waited_secs: 30,
        };
        assert_eq!(err.message(), "Task t-1 did not finish within 30s");
    }
}
