use std::env;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3001";

/// Paths of the remote generation API, relative to the base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoints {
    pub upload: String,
    pub generate: String,
    /// Prefix the task id is appended to.
    pub status: String,
    pub health: String,
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout: Option<Duration>,
    pub endpoints: Endpoints,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PollConfig {
    pub interval: Duration,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub upstream: ClientConfig,
}

impl Default for Endpoints {
    fn default() -> Self {
        Endpoints {
            upload: "/api/upload".to_string(),
            generate: "/api/generate-with-image".to_string(),
            status: "/api/status".to_string(),
            health: "/api/health".to_string(),
        }
    }
}

impl Endpoints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_upload(mut self, path: impl Into<String>) -> Self {
        self.upload = path.into();
        self
    }

    pub fn with_generate(mut self, path: impl Into<String>) -> Self {
        self.generate = path.into();
        self
    }

    pub fn with_status(mut self, path: impl Into<String>) -> Self {
        self.status = path.into();
        self
    }

    pub fn with_health(mut self, path: impl Into<String>) -> Self {
        self.health = path.into();
        self
    }

    /// Status path for one task. The id is percent-encoded as a single path
    /// segment, so ids holding `/`, `?` or `#` still address that task.
    pub fn status_for(&self, task_id: &str) -> String {
        format!(
            "{}/{}",
            self.status.trim_end_matches('/'),
            urlencoding::encode(task_id)
        )
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            timeout: None,
            endpoints: Endpoints::default(),
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let base_url =
            env::var("NANOGEN_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let api_key = env::var("NANOGEN_API_KEY").ok().filter(|k| !k.is_empty());
        let timeout = env::var("NANOGEN_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs);

        ClientConfig {
            base_url,
            api_key,
            timeout,
            endpoints: Endpoints::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        PollConfig {
            interval: Duration::from_secs(3),
            timeout: Duration::from_secs(300),
        }
    }
}

impl PollConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        let interval = env::var("NANOGEN_POLL_INTERVAL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.interval);
        let timeout = env::var("NANOGEN_POLL_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);

        PollConfig { interval, timeout }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3001,
            upstream: ClientConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .ok()
            .and_then(|port| port.parse().ok())
            .unwrap_or(3001);

        let mut upstream = ClientConfig::from_env();
        if let Ok(url) = env::var("NANOGEN_UPSTREAM_URL") {
            upstream.base_url = url;
        }
        if let Ok(key) = env::var("NANOGEN_UPSTREAM_API_KEY") {
            upstream.api_key = Some(key).filter(|k| !k.is_empty());
        }

        ServerConfig {
            host,
            port,
            upstream,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_upstream(mut self, upstream: ClientConfig) -> Self {
        self.upstream = upstream;
        self
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}
