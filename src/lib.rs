pub mod client;
pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod poller;
#[cfg(feature = "server")]
pub mod server;

pub use client::{GenerationClient, HttpTransport, RemoteRequest, RemoteResponse, Transport};
pub use config::{ClientConfig, Endpoints, PollConfig, ServerConfig};
pub use error::{GenerationError, Result};
pub use models::*;
pub use poller::TaskPoller;
