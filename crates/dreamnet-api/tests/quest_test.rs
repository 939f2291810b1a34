//! Integration tests for the stateless quest endpoints.

mod common;

use axum::http::StatusCode;
use dreamnet_core::narrative::NarrativePurpose;
use serde_json::json;

#[tokio::test]
async fn test_start_quest_then_narrate_departure() {
    // Arrange
    let (app, narrator) = common::build_test_app();
    narrator.push_reply(common::composition_reply());
    narrator.push_reply("Mist clings to the road out of town.");

    // Act
    let (status, quest) = common::post_json(
        app.clone(),
        "/api/start-quest",
        &json!({ "excludedChallengeIds": [] }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, json) = common::post_json(
        app,
        "/api/narrate",
        &json!({
            "questName": quest["questName"],
            "objective": quest["questOrder"][0]["objectiveText"],
            "isFinal": false,
            "artifactName": quest["artifactName"]
        }),
    )
    .await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["narration"], "Mist clings to the road out of town.");
    assert_eq!(
        narrator.purposes(),
        vec![
            NarrativePurpose::QuestComposition,
            NarrativePurpose::TravelNarration
        ]
    );
}

#[tokio::test]
async fn test_wrong_companion_never_reports_solution() {
    // Arrange
    let (app, narrator) = common::build_test_app();
    narrator.push_reply("I could hit the book, I suppose.\nSOLUTION=TRUE");

    // Act
    let (status, json) = common::post_json(
        app,
        "/api/interact",
        &json!({
            "character": { "name": "Brakka", "role": "Warden" },
            "message": "Brakka, read this.",
            "challenge": {
                "id": common::SECOND_CHALLENGE,
                "role": "Scholar",
                "objectiveText": "Read the keeper's tome."
            },
            "questName": "The Ember Crown"
        }),
    )
    .await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["solution"], false);
    assert_eq!(json["dialogue"], "I could hit the book, I suppose.");
}

#[tokio::test]
async fn test_malformed_composition_returns_502() {
    let (app, narrator) = common::build_test_app();
    narrator.push_reply("Once upon a time there was no JSON.");

    let (status, json) = common::post_json(app, "/api/start-quest", &json!({})).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["error"], "malformed_narrative");
    assert_eq!(json["retryable"], true);
}
