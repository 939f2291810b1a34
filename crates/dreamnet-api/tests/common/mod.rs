//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use dreamnet_catalog::domain::catalog::QuestCatalog;
use dreamnet_core::event::Clock;
use dreamnet_core::narrative::NarrativeGenerationService;
use dreamnet_core::rng::DeterministicRng;
use dreamnet_session::application::orchestrator::OrchestratorServices;
use dreamnet_test_support::{FixedClock, MockRng, ScriptedNarrator};
use http_body_util::BodyExt;
use tower::ServiceExt;

use dreamnet_api::state::AppState;

/// Challenges `MockRng` draws from the built-in catalog, in quest order.
pub const FIRST_CHALLENGE: &str = "Warden_BanditAmbush";
pub const SECOND_CHALLENGE: &str = "Scholar_AncientTome";

/// Build application state around `narrator` with deterministic Clock/RNG.
pub fn build_state(narrator: Arc<dyn NarrativeGenerationService>) -> AppState {
    let clock: Arc<dyn Clock> = Arc::new(FixedClock::default());
    let rng: Arc<Mutex<dyn DeterministicRng + Send>> = Arc::new(Mutex::new(MockRng));
    AppState::new(OrchestratorServices {
        catalog: Arc::new(QuestCatalog::builtin()),
        narrator,
        clock,
        rng,
        request_timeout: Duration::from_secs(5),
    })
}

/// Build the full app router with a scripted narrator. Uses the same route
/// structure as `main.rs`.
pub fn build_test_app() -> (Router, Arc<ScriptedNarrator>) {
    let narrator = Arc::new(ScriptedNarrator::default());
    let app = dreamnet_api::app(build_state(narrator.clone()));
    (app, narrator)
}

/// Like `build_test_app`, but the registry holds at most `max_sessions`.
pub fn build_test_app_with_limit(max_sessions: usize) -> (Router, Arc<ScriptedNarrator>) {
    let narrator = Arc::new(ScriptedNarrator::default());
    let state = build_state(narrator.clone()).with_session_limit(max_sessions);
    (dreamnet_api::app(state), narrator)
}

/// A quest composition reply naming the two challenges `MockRng` draws.
pub fn composition_reply() -> String {
    serde_json::json!({
        "questName": "The Ember Crown",
        "questHook": "A crown smoulders beneath the old keep.",
        "dmNotes": "The keep's lord wants it back.",
        "artifactName": "Ember Crown",
        "objectives": [
            { "id": FIRST_CHALLENGE, "objectiveText": "Drive off the Red Claws." },
            { "id": SECOND_CHALLENGE, "objectiveText": "Read the keeper's tome." }
        ]
    })
    .to_string()
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Send a POST request without a body and return the response.
pub async fn post_empty(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Send a DELETE request and return the status.
pub async fn delete(app: Router, uri: &str) -> StatusCode {
    let request = Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    app.oneshot(request).await.unwrap().status()
}
