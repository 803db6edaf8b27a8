//! Caller-side polling on top of [`GenerationClient::poll_status`].
//!
//! The client only ever issues single status requests. Cadence, deadline and
//! deciding what "done" looks like all live here.

use crate::{
    client::GenerationClient,
    config::PollConfig,
    error::{GenerationError, Result},
    models::{TaskHandle, TaskState, TaskStatus},
};
use futures::stream::Stream;
use std::pin::Pin;
use std::sync::Arc;
use tokio::time::Instant;
use tokio_stream::wrappers::ReceiverStream;

pub type Classifier = Arc<dyn Fn(&TaskStatus) -> TaskState + Send + Sync>;

pub type StatusStream = Pin<Box<dyn Stream<Item = Result<TaskStatus>> + Send>>;

#[derive(Clone)]
pub struct TaskPoller {
    client: GenerationClient,
    config: PollConfig,
    classify: Classifier,
}

impl TaskPoller {
    pub fn new(client: GenerationClient, config: PollConfig) -> Self {
        Self {
            client,
            config,
            classify: Arc::new(TaskState::guess),
        }
    }

    pub fn with_classifier<F>(mut self, classify: F) -> Self
    where
        F: Fn(&TaskStatus) -> TaskState + Send + Sync + 'static,
    {
        self.classify = Arc::new(classify);
        self
    }

    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    /// Poll until the task completes, fails or the deadline passes.
    pub async fn wait_for_completion(&self, handle: &TaskHandle) -> Result<TaskStatus> {
        let started = Instant::now();
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            let status = self.client.poll_status(handle).await?;

            match (self.classify)(&status) {
                TaskState::Completed => {
                    log::info!(
                        "Task {} completed after {} polls ({:.1}s)",
                        handle.task_id,
                        attempt,
                        started.elapsed().as_secs_f64()
                    );
                    return Ok(status);
                }
                TaskState::Failed => {
                    log::error!("Task {} failed", handle.task_id);
                    return Err(GenerationError::TaskFailed {
                        task_id: handle.task_id.clone(),
                        status: status.into_json(),
                    });
                }
                TaskState::Pending => {}
            }

            if started.elapsed() >= self.config.timeout {
                log::warn!("Gave up on task {} after {} polls", handle.task_id, attempt);
                return Err(self.timeout_error(handle));
            }

            log::debug!("Task {} still pending (poll {})", handle.task_id, attempt);
            tokio::time::sleep(self.config.interval).await;
        }
    }

    /// Every polled snapshot as a stream. Ends after the first terminal
    /// snapshot or the first error; a passed deadline yields `PollTimeout`.
    ///
    /// Spawns the polling task with `tokio::spawn`, so it must be called from
    /// within a tokio runtime.
    pub fn watch(&self, handle: TaskHandle) -> StatusStream {
        let (tx, rx) = tokio::sync::mpsc::channel(16);
        let poller = self.clone();

        tokio::spawn(async move {
            let started = Instant::now();

            loop {
                let result = poller.client.poll_status(&handle).await;
                let done = match &result {
                    Ok(status) => (poller.classify)(status).is_terminal(),
                    Err(_) => true,
                };

                if tx.send(result).await.is_err() || done {
                    break;
                }

                if started.elapsed() >= poller.config.timeout {
                    let _ = tx.send(Err(poller.timeout_error(&handle))).await;
                    break;
                }

                tokio::time::sleep(poller.config.interval).await;
            }
        });

        Box::pin(ReceiverStream::new(rx))
    }

    fn timeout_error(&self, handle: &TaskHandle) -> GenerationError {
        GenerationError::PollTimeout {
            task_id: handle.task_id.clone(),
            waited_secs: self.config.timeout.as_secs(),
        }
    }
}
