//! The interaction router.
//!
//! Detection only: the router reports what the narrator's reply says and
//! who was allowed to say it. Applying the signal to a session is the
//! orchestrator's job.

use std::sync::Arc;

use dreamnet_core::error::DomainError;
use dreamnet_core::narrative::{NarrativeGenerationService, NarrativePurpose, NarrativeRequest};
use dreamnet_quest::domain::session::QuestSession;
use tracing::debug;

use super::prompts::dialogue_prompt;
use crate::domain::companion::CompanionAgent;
use crate::domain::scene::{ResolutionKind, Scene};

/// What a routed message produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteOutcome {
    /// The companion's reply with resolution markers removed.
    pub dialogue: String,
    /// Whether the reply resolves the scene. Always false for a companion
    /// the scene does not authorize.
    pub solved: bool,
    /// Whether the companion matches the active challenge.
    pub is_correct_companion: bool,
    /// What `solved` would resolve, if the scene is resolvable.
    pub resolution: Option<ResolutionKind>,
}

/// Sends player messages to companions through the narrative service.
#[derive(Clone)]
pub struct InteractionRouter {
    narrator: Arc<dyn NarrativeGenerationService>,
}

impl std::fmt::Debug for InteractionRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InteractionRouter").finish_non_exhaustive()
    }
}

impl InteractionRouter {
    /// Creates a router backed by `narrator`.
    #[must_use]
    pub fn new(narrator: Arc<dyn NarrativeGenerationService>) -> Self {
        Self { narrator }
    }

    /// Routes `message` to `companion` in the scene `session` is in.
    ///
    /// # Errors
    ///
    /// See [`InteractionRouter::route_scene`].
    pub async fn route(
        &self,
        companion: &CompanionAgent,
        session: &QuestSession,
        message: &str,
    ) -> Result<RouteOutcome, DomainError> {
        self.route_scene(companion, &Scene::from_session(session), message)
            .await
    }

    /// Routes `message` to `companion` in an explicit scene.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for a blank message and propagates
    /// narrative service failures.
    pub async fn route_scene(
        &self,
        companion: &CompanionAgent,
        scene: &Scene,
        message: &str,
    ) -> Result<RouteOutcome, DomainError> {
        if message.trim().is_empty() {
            return Err(DomainError::Validation("message must not be empty".to_owned()));
        }

        let resolution = scene.resolution();
        let purpose = match resolution {
            Some(ResolutionKind::Discussion) => NarrativePurpose::ArtifactDiscussion,
            _ => NarrativePurpose::CompanionDialogue,
        };
        let reply = self
            .narrator
            .generate(NarrativeRequest::new(
                purpose,
                dialogue_prompt(companion, scene, message),
            ))
            .await?;

        let extraction = scene.scan_strategy().extract(&reply);
        let authorized = scene.authorizes(companion.role);
        let outcome = RouteOutcome {
            dialogue: extraction.dialogue,
            solved: authorized && extraction.solved,
            is_correct_companion: scene.is_correct_companion(companion.role),
            resolution,
        };

        debug!(
            companion = %companion.name,
            role = %companion.role,
            authorized,
            marker_found = extraction.solved,
            solved = outcome.solved,
            "Message routed"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dreamnet_catalog::domain::challenge::{Challenge, ChallengeId};
    use dreamnet_core::role::Role;
    use dreamnet_test_support::{FailingNarrator, ScriptedNarrator};

    use crate::domain::companion::Persona;

    fn companion(name: &str, role: Role) -> CompanionAgent {
        CompanionAgent::new(name, role, Persona::default())
    }

    fn scholar_challenge() -> Scene {
        Scene::Challenge {
            quest_name: Some("The Salt Bell".into()),
            challenge: Challenge {
                id: ChallengeId::new("Scholar_AncientTome"),
                role: Role::Scholar,
                description: String::new(),
                objective_text: "Translate the tome.".into(),
                content: "A tome rests on a lectern.".into(),
                solution_hint: None,
            },
        }
    }

    #[tokio::test]
    async fn test_correct_companion_solves_and_marker_is_stripped() {
        // Arrange
        let narrator = Arc::new(ScriptedNarrator::new([
            "I trace the glyphs and read them aloud.\nSOLUTION=TRUE",
        ]));
        let router = InteractionRouter::new(narrator.clone());

        // Act
        let outcome = router
            .route_scene(&companion("Iska", Role::Scholar), &scholar_challenge(), "Read it!")
            .await
            .unwrap();

        // Assert
        assert_eq!(outcome.dialogue, "I trace the glyphs and read them aloud.");
        assert!(outcome.solved);
        assert!(outcome.is_correct_companion);
        assert_eq!(outcome.resolution, Some(ResolutionKind::Challenge));
        assert_eq!(narrator.purposes(), vec![NarrativePurpose::CompanionDialogue]);
    }

    #[tokio::test]
    async fn test_wrong_companion_never_solves_even_with_marker() {
        // Arrange
        let narrator = Arc::new(ScriptedNarrator::new([
            "Fine, I smash the tome open.\nSOLUTION=TRUE",
        ]));
        let router = InteractionRouter::new(narrator);

        // Act
        let outcome = router
            .route_scene(&companion("Brakka", Role::Warden), &scholar_challenge(), "Smash it!")
            .await
            .unwrap();

        // Assert
        assert!(!outcome.solved);
        assert!(!outcome.is_correct_companion);
        assert_eq!(outcome.dialogue, "Fine, I smash the tome open.");
    }

    #[tokio::test]
    async fn test_missing_marker_fails_open() {
        let narrator = Arc::new(ScriptedNarrator::new(["What would you have me do?"]));
        let router = InteractionRouter::new(narrator);

        let outcome = router
            .route_scene(&companion("Iska", Role::Scholar), &scholar_challenge(), "Hmm.")
            .await
            .unwrap();

        assert!(!outcome.solved);
        assert_eq!(outcome.dialogue, "What would you have me do?");
    }

    #[tokio::test]
    async fn test_discussion_marker_found_mid_text() {
        let narrator = Arc::new(ScriptedNarrator::new(["Great news! SOLUTION=TRUE Let's go."]));
        let router = InteractionRouter::new(narrator.clone());
        let scene = Scene::ArtifactDiscussion {
            artifact_name: "Salt Bell".into(),
        };

        let outcome = router
            .route_scene(&companion("Brakka", Role::Warden), &scene, "We have the Salt Bell!")
            .await
            .unwrap();

        assert!(outcome.solved);
        assert_eq!(outcome.dialogue, "Great news! Let's go.");
        assert_eq!(outcome.resolution, Some(ResolutionKind::Discussion));
        assert_eq!(narrator.purposes(), vec![NarrativePurpose::ArtifactDiscussion]);
    }

    #[tokio::test]
    async fn test_idle_scene_never_solves() {
        let narrator = Arc::new(ScriptedNarrator::new(["Perhaps a quest?\nSOLUTION=TRUE"]));
        let router = InteractionRouter::new(narrator);

        let outcome = router
            .route_scene(&companion("Iska", Role::Scholar), &Scene::Idle, "I'm bored.")
            .await
            .unwrap();

        assert!(!outcome.solved);
        assert_eq!(outcome.resolution, None);
        assert_eq!(outcome.dialogue, "Perhaps a quest?");
    }

    #[tokio::test]
    async fn test_blank_message_is_rejected_before_calling_narrator() {
        let narrator = Arc::new(ScriptedNarrator::default());
        let router = InteractionRouter::new(narrator.clone());

        let result = router
            .route_scene(&companion("Iska", Role::Scholar), &Scene::Idle, "   ")
            .await;

        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert!(narrator.requests().is_empty());
    }

    #[tokio::test]
    async fn test_narrator_failure_propagates() {
        let router = InteractionRouter::new(Arc::new(FailingNarrator));

        let result = router
            .route_scene(&companion("Iska", Role::Scholar), &scholar_challenge(), "Read!")
            .await;

        assert!(matches!(result, Err(DomainError::ServiceUnavailable(_))));
    }
}
