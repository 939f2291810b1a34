//! Domain error types.

use std::time::Duration;

use thiserror::Error;
use uuid::Uuid;

use crate::role::Role;

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// No unused challenge remains for a role after exclusions.
    #[error("no unused {0} challenge remains in the pool")]
    PoolExhausted(Role),

    /// The narrative service replied with text that cannot be parsed into
    /// the required shape.
    #[error("malformed narrative reply: {0}")]
    MalformedNarrative(String),

    /// The narrative service could not be reached or refused the request.
    #[error("narrative service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The narrative service did not answer within the deadline.
    #[error("narrative service timed out after {0:?}")]
    Timeout(Duration),

    /// The quest state machine has no transition for this action.
    #[error("cannot {action} while the quest is {phase}")]
    InvalidTransition {
        /// The phase the session was in.
        phase: String,
        /// The rejected action.
        action: &'static str,
    },

    /// Another operation is already running against the same session.
    #[error("a request is already in flight for session {0}")]
    RequestInFlight(Uuid),

    /// No session exists with the given identifier.
    #[error("session not found: {0}")]
    SessionNotFound(Uuid),

    /// The server already holds as many sessions as it is allowed.
    #[error("session limit of {0} reached")]
    SessionLimitReached(usize),

    /// A validation error in domain logic.
    #[error("validation error: {0}")]
    Validation(String),
}

impl DomainError {
    /// Whether the caller may simply try the same operation again.
    ///
    /// Retryable failures never leave a partial state change behind.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DomainError::MalformedNarrative(_)
                | DomainError::ServiceUnavailable(_)
                | DomainError::Timeout(_)
                | DomainError::RequestInFlight(_)
        )
    }
}
