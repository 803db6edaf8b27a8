//! Scripted in-memory transport for unit tests.

use super::transport::{RemoteRequest, RemoteResponse, Transport, TransportError};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

type Reply = std::result::Result<RemoteResponse, TransportError>;

#[derive(Default)]
pub(crate) struct FakeTransport {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<RemoteRequest>>,
}

impl FakeTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn reply(self, status: u16, body: Value) -> Self {
        self.push(Ok(RemoteResponse::new(status, Some(body))))
    }

    pub(crate) fn reply_raw(self, status: u16, body: Option<Value>) -> Self {
        self.push(Ok(RemoteResponse::new(status, body)))
    }

    pub(crate) fn fail(self, message: &str) -> Self {
        self.push(Err(TransportError(message.to_string())))
    }

    fn push(self, reply: Reply) -> Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    pub(crate) fn requests(&self) -> Vec<RemoteRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: RemoteRequest) -> Reply {
        self.requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError("no scripted reply left".into())))
    }
}
