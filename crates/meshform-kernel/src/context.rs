//! Per-read context threaded from the host into every upstream call.
//!
//! Carries cancellation, an optional deadline and a request id used to
//! correlate log lines. No timeouts are applied unless the host sets one.

use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Why an in-flight call was abandoned.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ContextError {
    #[error("context canceled")]
    Cancelled,
    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

#[derive(Debug, Clone)]
pub struct ReadContext {
    cancellation: CancellationToken,
    deadline: Option<Instant>,
    request_id: Uuid,
}

impl Default for ReadContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadContext {
    pub fn new() -> Self {
        Self {
            cancellation: CancellationToken::new(),
            deadline: None,
            request_id: Uuid::new_v4(),
        }
    }

    /// Share cancellation with the host (typically a child token).
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Drive `fut` to completion unless the context is cancelled or its
    /// deadline passes first, in which case `fut` is dropped.
    pub async fn run<T, E, F>(&self, fut: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: From<ContextError>,
    {
        let deadline = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancellation.cancelled() => Err(ContextError::Cancelled.into()),
            _ = deadline => Err(ContextError::DeadlineExceeded.into()),
            result = fut => result,
        }
    }
}
