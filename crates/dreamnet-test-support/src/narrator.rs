//! Test narrators: `NarrativeGenerationService` doubles for tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use dreamnet_core::error::DomainError;
use dreamnet_core::narrative::{NarrativeGenerationService, NarrativePurpose, NarrativeRequest};

/// A narrator that answers from a queue of scripted replies and records
/// every request it receives.
///
/// Replies are consumed in order regardless of purpose. When the queue is
/// empty the narrator answers `ServiceUnavailable`, which keeps a test that
/// scripts too few replies from passing by accident.
#[derive(Debug, Default)]
pub struct ScriptedNarrator {
    replies: Mutex<VecDeque<Result<String, DomainError>>>,
    requests: Mutex<Vec<NarrativeRequest>>,
}

impl ScriptedNarrator {
    /// Creates a narrator that will answer with `replies` in order.
    #[must_use]
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(|r| Ok(r.into())).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queues another successful reply.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn push_reply(&self, reply: impl Into<String>) {
        self.replies.lock().unwrap().push_back(Ok(reply.into()));
    }

    /// Queues a failure.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn push_error(&self, error: DomainError) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    /// Returns a snapshot of all requests received so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn requests(&self) -> Vec<NarrativeRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Returns the purposes of all requests received so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn purposes(&self) -> Vec<NarrativePurpose> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.purpose)
            .collect()
    }
}

#[async_trait]
impl NarrativeGenerationService for ScriptedNarrator {
    async fn generate(&self, request: NarrativeRequest) -> Result<String, DomainError> {
        self.requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(DomainError::ServiceUnavailable("no scripted reply".into())))
    }
}

/// A narrator that always fails with `ServiceUnavailable`.
#[derive(Debug)]
pub struct FailingNarrator;

#[async_trait]
impl NarrativeGenerationService for FailingNarrator {
    async fn generate(&self, _request: NarrativeRequest) -> Result<String, DomainError> {
        Err(DomainError::ServiceUnavailable("connection refused".into()))
    }
}

/// A narrator that sleeps before answering. Pair it with a shorter
/// deadline to exercise timeout paths.
#[derive(Debug)]
pub struct StallingNarrator(pub Duration);

#[async_trait]
impl NarrativeGenerationService for StallingNarrator {
    async fn generate(&self, _request: NarrativeRequest) -> Result<String, DomainError> {
        tokio::time::sleep(self.0).await;
        Ok("too late".to_owned())
    }
}
