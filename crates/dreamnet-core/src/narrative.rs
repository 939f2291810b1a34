//! Narrative generation service abstraction.
//!
//! The narrative service is an opaque text generator. Callers hand it a
//! fully rendered prompt and receive freeform text; all structure is
//! recovered by the caller.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::DomainError;

/// What a narrative request is for. Used for logging and by test doubles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NarrativePurpose {
    /// Naming and framing a freshly drawn quest.
    QuestComposition,
    /// Flavor text for a travel step.
    TravelNarration,
    /// A companion's in-character reply to the player.
    CompanionDialogue,
    /// A companion's reply once the artifact has been found.
    ArtifactDiscussion,
}

/// A single request to the narrative service.
#[derive(Debug, Clone)]
pub struct NarrativeRequest {
    /// What the request is for.
    pub purpose: NarrativePurpose,
    /// The rendered prompt.
    pub prompt: String,
}

impl NarrativeRequest {
    /// Creates a request for the given purpose.
    #[must_use]
    pub fn new(purpose: NarrativePurpose, prompt: impl Into<String>) -> Self {
        Self {
            purpose,
            prompt: prompt.into(),
        }
    }
}

/// External text-generation collaborator.
#[async_trait]
pub trait NarrativeGenerationService: Send + Sync {
    /// Generates freeform text for the request.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ServiceUnavailable` or `DomainError::Timeout`
    /// for transport failures and `DomainError::MalformedNarrative` when the
    /// service answers without usable text.
    async fn generate(&self, request: NarrativeRequest) -> Result<String, DomainError>;
}

/// Bounds a narrative call by a caller-supplied deadline.
///
/// The wrapped future is dropped on expiry, so it must not have side
/// effects that outlive it.
///
/// # Errors
///
/// Returns `DomainError::Timeout` if the deadline passes first, otherwise
/// whatever the future returns.
pub async fn with_deadline<T, F>(deadline: Duration, future: F) -> Result<T, DomainError>
where
    F: Future<Output = Result<T, DomainError>>,
{
    match tokio::time::timeout(deadline, future).await {
        Ok(result) => result,
        Err(_) => Err(DomainError::Timeout(deadline)),
    }
}
