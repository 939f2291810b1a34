//! Shared application state.

use std::collections::HashMap;
use std::sync::Arc;

use dreamnet_core::error::DomainError;
use dreamnet_interaction::application::router::InteractionRouter;
use dreamnet_interaction::domain::companion::Party;
use dreamnet_session::application::orchestrator::{OrchestratorServices, QuestOrchestrator};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Sessions held at once unless configured otherwise.
pub const DEFAULT_MAX_SESSIONS: usize = 1024;

/// In-memory registry of player sessions.
type SessionRegistry = Arc<RwLock<HashMap<Uuid, Arc<QuestOrchestrator>>>>;

/// Application state shared across all request handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Catalog, narrator, clock and RNG shared by every session.
    pub services: OrchestratorServices,
    /// Router used by the stateless dialogue endpoints.
    pub router: InteractionRouter,
    sessions: SessionRegistry,
    max_sessions: usize,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(services: OrchestratorServices) -> Self {
        Self {
            router: InteractionRouter::new(Arc::clone(&services.narrator)),
            services,
            sessions: Arc::new(RwLock::new(HashMap::new())),
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }

    /// Caps how many sessions the registry holds at once.
    #[must_use]
    pub fn with_session_limit(mut self, max_sessions: usize) -> Self {
        self.max_sessions = max_sessions;
        self
    }

    /// Registers a new idle session for `party`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SessionLimitReached` when the registry is full.
    pub async fn create_session(&self, party: Party) -> Result<Arc<QuestOrchestrator>, DomainError> {
        let mut sessions = self.sessions.write().await;
        if sessions.len() >= self.max_sessions {
            return Err(DomainError::SessionLimitReached(self.max_sessions));
        }

        let session_id = Uuid::new_v4();
        let orchestrator = Arc::new(QuestOrchestrator::new(
            session_id,
            party,
            self.services.clone(),
        ));
        sessions.insert(session_id, Arc::clone(&orchestrator));
        Ok(orchestrator)
    }

    /// Drops a session, freeing its slot. An operation already running
    /// against it finishes on its own handle.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SessionNotFound` for an unknown identifier.
    pub async fn remove_session(&self, session_id: Uuid) -> Result<(), DomainError> {
        self.sessions
            .write()
            .await
            .remove(&session_id)
            .map(|_| ())
            .ok_or(DomainError::SessionNotFound(session_id))
    }

    /// Looks up a session.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SessionNotFound` for an unknown identifier.
    pub async fn session(&self, session_id: Uuid) -> Result<Arc<QuestOrchestrator>, DomainError> {
        self.sessions
            .read()
            .await
            .get(&session_id)
            .cloned()
            .ok_or(DomainError::SessionNotFound(session_id))
    }

    /// Number of registered sessions.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
