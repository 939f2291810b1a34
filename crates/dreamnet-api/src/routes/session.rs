//! Routes for per-player quest sessions.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{
    Json, Router,
    routing::{get, post},
};
use dreamnet_core::role::Role;
use dreamnet_interaction::domain::companion::{CompanionAgent, Party, Persona};
use dreamnet_quest::domain::session::SessionView;
use dreamnet_session::application::orchestrator::{MessageOutcome, TravelOutcome};
use dreamnet_session::domain::commands::{AcceptQuest, AdvanceTravel, RequestNewQuest, SendMessage};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// One companion as described by the client. The role comes from the slot.
#[derive(Debug, Deserialize)]
pub struct CompanionInput {
    /// Display name.
    pub name: String,
    /// Roleplay attributes.
    #[serde(default)]
    pub persona: Persona,
}

/// Request body for POST /.
#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    /// The party's Warden.
    pub warden: CompanionInput,
    /// The party's Scholar.
    pub scholar: CompanionInput,
}

/// Response body for POST /.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionResponse {
    /// Identifier of the new session.
    pub session_id: Uuid,
    /// The session's initial view.
    pub session: SessionView,
}

/// Request body for POST /{id}/message.
#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    /// The companion being addressed.
    pub role: Role,
    /// What the player says.
    pub text: String,
}

/// POST /
#[instrument(skip(state, request))]
async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<CreateSessionResponse>), ApiError> {
    let party = Party::new(
        CompanionAgent::new(request.warden.name, Role::Warden, request.warden.persona),
        CompanionAgent::new(request.scholar.name, Role::Scholar, request.scholar.persona),
    )?;

    let orchestrator = state.create_session(party).await?;
    info!(session_id = %orchestrator.session_id(), "session created");

    Ok((
        StatusCode::CREATED,
        Json(CreateSessionResponse {
            session_id: orchestrator.session_id(),
            session: orchestrator.view().await,
        }),
    ))
}

/// GET /{session_id}
async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    let orchestrator = state.session(session_id).await?;
    Ok(Json(orchestrator.view().await))
}

/// DELETE /{session_id}
#[instrument(skip(state))]
async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.remove_session(session_id).await?;
    info!("session removed");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /{session_id}/quest
#[instrument(skip(state))]
async fn request_new_quest(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    let orchestrator = state.session(session_id).await?;
    let command = RequestNewQuest {
        correlation_id: Uuid::new_v4(),
    };

    info!(correlation_id = %command.correlation_id, "handling request_new_quest command");

    Ok(Json(orchestrator.request_new_quest(&command).await?))
}

/// POST /{session_id}/accept
#[instrument(skip(state))]
async fn accept_quest(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    let orchestrator = state.session(session_id).await?;
    let command = AcceptQuest {
        correlation_id: Uuid::new_v4(),
    };

    info!(correlation_id = %command.correlation_id, "handling accept_quest command");

    Ok(Json(orchestrator.accept_quest(&command).await?))
}

/// POST /{session_id}/travel
#[instrument(skip(state))]
async fn advance_travel(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<TravelOutcome>, ApiError> {
    let orchestrator = state.session(session_id).await?;
    let command = AdvanceTravel {
        correlation_id: Uuid::new_v4(),
    };

    info!(correlation_id = %command.correlation_id, "handling advance_travel command");

    Ok(Json(orchestrator.advance_travel(&command).await?))
}

/// POST /{session_id}/message
#[instrument(skip(state, request), fields(role = %request.role))]
async fn send_message(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<MessageRequest>,
) -> Result<Json<MessageOutcome>, ApiError> {
    let orchestrator = state.session(session_id).await?;
    let command = SendMessage {
        correlation_id: Uuid::new_v4(),
        role: request.role,
        text: request.text,
    };

    info!(correlation_id = %command.correlation_id, "handling send_message command");

    Ok(Json(orchestrator.send_message(&command).await?))
}

/// Returns the router for the session endpoints.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_session))
        .route("/{session_id}", get(get_session).delete(delete_session))
        .route("/{session_id}/quest", post(request_new_quest))
        .route("/{session_id}/accept", post(accept_quest))
        .route("/{session_id}/travel", post(advance_travel))
        .route("/{session_id}/message", post(send_message))
}
