//! Stateless quest endpoints.
//!
//! Each call carries all the context it needs. Nothing here touches the
//! session registry; a client using these endpoints tracks quest progress
//! itself.

use std::collections::BTreeSet;

use axum::extract::State;
use axum::{Json, Router, routing::post};
use dreamnet_catalog::application::quest_composition::select_quest;
use dreamnet_catalog::domain::challenge::{Challenge, ChallengeId};
use dreamnet_catalog::domain::quest::Quest;
use dreamnet_core::error::DomainError;
use dreamnet_core::narrative::with_deadline;
use dreamnet_interaction::domain::companion::CompanionAgent;
use dreamnet_interaction::domain::scene::Scene;
use dreamnet_quest::application::narration::{NarrationRequest, narrate as narrate_leg};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /start-quest.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartQuestRequest {
    /// Challenges the client has already completed.
    #[serde(default)]
    pub excluded_challenge_ids: Vec<ChallengeId>,
}

/// Response body for POST /narrate.
#[derive(Debug, Serialize)]
pub struct NarrationResponse {
    /// Narration with resolution markers removed.
    pub narration: String,
}

/// Request body for POST /interact.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractRequest {
    /// The companion being addressed.
    pub character: CompanionAgent,
    /// What the player says.
    pub message: String,
    /// The active challenge, if the party stands at one.
    #[serde(default)]
    pub challenge: Option<Challenge>,
    /// The quest underway, if any.
    #[serde(default)]
    pub quest_name: Option<String>,
}

/// Request body for POST /discuss-artifact.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscussArtifactRequest {
    /// The companion being addressed.
    pub character: CompanionAgent,
    /// What the player says.
    pub message: String,
    /// The recovered artifact.
    pub artifact_name: String,
}

/// Response body for the dialogue endpoints.
#[derive(Debug, Serialize)]
pub struct DialogueResponse {
    /// The companion's reply with resolution markers removed.
    pub dialogue: String,
    /// Whether the reply resolves the scene.
    pub solution: bool,
}

/// POST /start-quest
#[instrument(skip(state, request), fields(excluded = request.excluded_challenge_ids.len()))]
async fn start_quest(
    State(state): State<AppState>,
    Json(request): Json<StartQuestRequest>,
) -> Result<Json<Quest>, ApiError> {
    info!("handling start_quest request");

    let excluded: BTreeSet<ChallengeId> = request.excluded_challenge_ids.into_iter().collect();
    let services = &state.services;
    let quest = with_deadline(
        services.request_timeout,
        select_quest(
            &services.catalog,
            &excluded,
            &*services.rng,
            &*services.narrator,
        ),
    )
    .await?;

    Ok(Json(quest))
}

/// POST /narrate
#[instrument(skip(state, request), fields(quest_name = %request.quest_name, is_final = request.is_final))]
async fn narrate(
    State(state): State<AppState>,
    Json(request): Json<NarrationRequest>,
) -> Result<Json<NarrationResponse>, ApiError> {
    info!(shape = ?request.shape(), "handling narrate request");

    let narration = with_deadline(
        state.services.request_timeout,
        narrate_leg(&request, &*state.services.narrator),
    )
    .await?;

    Ok(Json(NarrationResponse { narration }))
}

/// POST /interact
#[instrument(skip(state, request), fields(character = %request.character.name, role = %request.character.role))]
async fn interact(
    State(state): State<AppState>,
    Json(request): Json<InteractRequest>,
) -> Result<Json<DialogueResponse>, ApiError> {
    let scene = match (request.challenge, request.quest_name) {
        (Some(challenge), quest_name) => Scene::Challenge {
            quest_name,
            challenge,
        },
        (None, Some(quest_name)) => Scene::Traveling {
            quest_name,
            objective: None,
        },
        (None, None) => Scene::Idle,
    };

    info!(resolution = ?scene.resolution(), "handling interact request");

    let outcome = with_deadline(
        state.services.request_timeout,
        state
            .router
            .route_scene(&request.character, &scene, &request.message),
    )
    .await?;

    Ok(Json(DialogueResponse {
        dialogue: outcome.dialogue,
        solution: outcome.solved,
    }))
}

/// POST /discuss-artifact
#[instrument(skip(state, request), fields(character = %request.character.name, artifact = %request.artifact_name))]
async fn discuss_artifact(
    State(state): State<AppState>,
    Json(request): Json<DiscussArtifactRequest>,
) -> Result<Json<DialogueResponse>, ApiError> {
    if request.artifact_name.trim().is_empty() {
        return Err(DomainError::Validation("artifactName must not be empty".to_owned()).into());
    }

    info!("handling discuss_artifact request");

    let scene = Scene::ArtifactDiscussion {
        artifact_name: request.artifact_name,
    };
    let outcome = with_deadline(
        state.services.request_timeout,
        state
            .router
            .route_scene(&request.character, &scene, &request.message),
    )
    .await?;

    Ok(Json(DialogueResponse {
        dialogue: outcome.dialogue,
        solution: outcome.solved,
    }))
}

/// Returns the router for the stateless quest endpoints.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/start-quest", post(start_quest))
        .route("/narrate", post(narrate))
        .route("/interact", post(interact))
        .route("/discuss-artifact", post(discuss_artifact))
}
