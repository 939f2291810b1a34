//! The quest orchestrator.
//!
//! Owns one player's [`QuestSession`] and is the only place a session is
//! mutated. Every operation follows the same order: take the in-flight
//! guard, check the transition, await the narrative service under the
//! configured deadline, and only then apply the transition. A failed or
//! timed-out call therefore leaves the session exactly as it was.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use dreamnet_catalog::application::quest_composition::select_quest;
use dreamnet_catalog::domain::catalog::QuestCatalog;
use dreamnet_core::aggregate::AggregateRoot;
use dreamnet_core::command::Command;
use dreamnet_core::error::DomainError;
use dreamnet_core::event::{Clock, DomainEvent};
use dreamnet_core::narrative::{NarrativeGenerationService, with_deadline};
use dreamnet_core::rng::DeterministicRng;
use dreamnet_interaction::application::router::InteractionRouter;
use dreamnet_interaction::domain::companion::Party;
use dreamnet_interaction::domain::scene::ResolutionKind;
use dreamnet_quest::application::narration::{NarrationRequest, narrate};
use dreamnet_quest::domain::phase::QuestAction;
use dreamnet_quest::domain::session::{QuestSession, SessionView};
use serde::Serialize;
use tokio::sync::MutexGuard;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::domain::commands::{AcceptQuest, AdvanceTravel, RequestNewQuest, SendMessage};

/// Shared collaborators every orchestrator needs.
#[derive(Clone)]
pub struct OrchestratorServices {
    /// The read-only challenge catalog.
    pub catalog: Arc<QuestCatalog>,
    /// The narrative generation service.
    pub narrator: Arc<dyn NarrativeGenerationService>,
    /// Time source for event metadata.
    pub clock: Arc<dyn Clock>,
    /// Randomness for quest draws.
    pub rng: Arc<Mutex<dyn DeterministicRng + Send>>,
    /// Deadline applied to every narrative call.
    pub request_timeout: Duration,
}

impl std::fmt::Debug for OrchestratorServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrchestratorServices")
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}

/// Result of a successful travel step.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelOutcome {
    /// Narration of the journey.
    pub narration: String,
    /// The session after arriving.
    pub session: SessionView,
}

/// Result of a message to a companion.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageOutcome {
    /// The companion's reply.
    pub dialogue: String,
    /// Whether the reply resolved the scene.
    pub solution: bool,
    /// Whether the resolution was applied to the session.
    pub applied: bool,
    /// Whether the addressed companion matches the active challenge.
    pub is_correct_companion: bool,
    /// The session after the message.
    pub session: SessionView,
}

/// Sequences catalog, state machine and router against one session.
pub struct QuestOrchestrator {
    session_id: Uuid,
    session: tokio::sync::Mutex<QuestSession>,
    party: Party,
    router: InteractionRouter,
    services: OrchestratorServices,
}

impl std::fmt::Debug for QuestOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuestOrchestrator")
            .field("session_id", &self.session_id)
            .field("party", &self.party)
            .finish_non_exhaustive()
    }
}

impl QuestOrchestrator {
    /// Creates an orchestrator owning a fresh, idle session.
    #[must_use]
    pub fn new(session_id: Uuid, party: Party, services: OrchestratorServices) -> Self {
        Self {
            session_id,
            session: tokio::sync::Mutex::new(QuestSession::new(session_id)),
            party,
            router: InteractionRouter::new(Arc::clone(&services.narrator)),
            services,
        }
    }

    /// The session identifier.
    #[must_use]
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// The player's companions.
    #[must_use]
    pub fn party(&self) -> &Party {
        &self.party
    }

    /// A snapshot of the session. Waits for any running operation.
    pub async fn view(&self) -> SessionView {
        self.session.lock().await.view()
    }

    /// Assembles a new quest and offers it.
    ///
    /// Challenges completed earlier in the cycle are excluded. When that
    /// leaves a role without challenges, the cycle restarts and the draw is
    /// retried once with nothing excluded. Both attempts share one deadline.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::RequestInFlight` if another operation is
    /// running, `DomainError::InvalidTransition` unless the session is idle
    /// or complete, and propagates catalog and narrative failures.
    #[instrument(skip_all, fields(
        session_id = %self.session_id,
        correlation_id = %command.correlation_id(),
        command_type = command.command_type(),
    ))]
    pub async fn request_new_quest(
        &self,
        command: &RequestNewQuest,
    ) -> Result<SessionView, DomainError> {
        let mut session = self.acquire()?;
        session.phase().next(QuestAction::StartQuest)?;

        let services = &self.services;
        let completed = session.completed_challenges().clone();
        let (quest, new_cycle) = with_deadline(services.request_timeout, async {
            let (catalog, rng, narrator) = (&services.catalog, &*services.rng, &*services.narrator);
            match select_quest(catalog, &completed, rng, narrator).await {
                Err(DomainError::PoolExhausted(role)) if !completed.is_empty() => {
                    info!(%role, completed = completed.len(), "Challenge pool exhausted, starting a new cycle");
                    let quest = select_quest(catalog, &BTreeSet::new(), rng, narrator).await?;
                    Ok((quest, true))
                }
                other => other.map(|quest| (quest, false)),
            }
        })
        .await?;

        if new_cycle {
            session.forget_completed_challenges();
        }
        session.start_quest(quest, command.correlation_id, services.clock.as_ref())?;
        Ok(self.publish(&mut session))
    }

    /// Accepts the offered quest.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::RequestInFlight` if another operation is
    /// running and `DomainError::InvalidTransition` unless a quest is on
    /// offer.
    #[instrument(skip_all, fields(
        session_id = %self.session_id,
        correlation_id = %command.correlation_id(),
        command_type = command.command_type(),
    ))]
    pub async fn accept_quest(&self, command: &AcceptQuest) -> Result<SessionView, DomainError> {
        let mut session = self.acquire()?;
        session.accept(command.correlation_id, self.services.clock.as_ref())?;
        Ok(self.publish(&mut session))
    }

    /// Narrates the journey to the next location and arrives there.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::RequestInFlight` if another operation is
    /// running, `DomainError::InvalidTransition` unless the party is
    /// traveling, and propagates narrative failures.
    #[instrument(skip_all, fields(
        session_id = %self.session_id,
        correlation_id = %command.correlation_id(),
        command_type = command.command_type(),
    ))]
    pub async fn advance_travel(&self, command: &AdvanceTravel) -> Result<TravelOutcome, DomainError> {
        let mut session = self.acquire()?;
        let request = NarrationRequest::for_session(&session)?;

        let narration = with_deadline(
            self.services.request_timeout,
            narrate(&request, self.services.narrator.as_ref()),
        )
        .await?;

        session.arrive(command.correlation_id, self.services.clock.as_ref())?;
        Ok(TravelOutcome {
            narration,
            session: self.publish(&mut session),
        })
    }

    /// Sends a message to one companion and applies any resolution it
    /// produces, provided the matching gate is open.
    ///
    /// A resolution signal that arrives while its gate is closed is
    /// discarded without error.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::RequestInFlight` if another operation is
    /// running and propagates router failures.
    #[instrument(skip_all, fields(
        session_id = %self.session_id,
        correlation_id = %command.correlation_id(),
        command_type = command.command_type(),
        role = %command.role,
    ))]
    pub async fn send_message(&self, command: &SendMessage) -> Result<MessageOutcome, DomainError> {
        let mut session = self.acquire()?;
        let companion = self.party.companion(command.role);

        let outcome = with_deadline(
            self.services.request_timeout,
            self.router.route(companion, &session, &command.text),
        )
        .await?;

        let clock = self.services.clock.as_ref();
        let applied = match outcome.resolution {
            Some(kind) if outcome.solved && kind.gate_open(&session) => {
                match kind {
                    ResolutionKind::Challenge => {
                        session.solve_challenge(command.correlation_id, clock)?;
                    }
                    ResolutionKind::Discussion => {
                        session.conclude_discussion(command.correlation_id, clock)?;
                    }
                }
                true
            }
            Some(kind) if outcome.solved => {
                debug!(?kind, phase = %session.phase(), "Resolution signal outside its gate discarded");
                false
            }
            _ => false,
        };

        Ok(MessageOutcome {
            dialogue: outcome.dialogue,
            solution: outcome.solved,
            applied,
            is_correct_companion: outcome.is_correct_companion,
            session: self.publish(&mut session),
        })
    }

    fn acquire(&self) -> Result<MutexGuard<'_, QuestSession>, DomainError> {
        self.session.try_lock().map_err(|_| {
            warn!(session_id = %self.session_id, "Rejected overlapping request");
            DomainError::RequestInFlight(self.session_id)
        })
    }

    /// Logs and drains the session's new events, returning the view.
    fn publish(&self, session: &mut QuestSession) -> SessionView {
        for event in session.take_uncommitted_events() {
            let meta = event.metadata();
            info!(
                session_id = %self.session_id,
                event_type = event.event_type(),
                sequence_number = meta.sequence_number,
                correlation_id = %meta.correlation_id,
                "Quest event applied"
            );
        }
        session.view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dreamnet_core::role::Role;
    use dreamnet_interaction::domain::companion::{CompanionAgent, Persona};
    use dreamnet_quest::domain::phase::{ChallengeSlot, QuestPhase};
    use dreamnet_test_support::{FixedClock, MockRng, ScriptedNarrator, StallingNarrator};

    // MockRng always draws Warden_BanditAmbush then Scholar_AncientTome,
    // Warden first.
    const FIRST: &str = "Warden_BanditAmbush";
    const SECOND: &str = "Scholar_AncientTome";

    fn composition_reply(first: &str, second: &str) -> String {
        serde_json::json!({
            "questName": "The Ember Crown",
            "questHook": "Beneath the ash hills sleeps a crown of living flame.",
            "dmNotes": "Bandits on the road, then the tome in the vault.",
            "artifactName": "Ember Crown",
            "objectives": [
                { "id": first, "objectiveText": "Drive off the Red Claws." },
                { "id": second, "objectiveText": "Read the ash-bound tome." }
            ]
        })
        .to_string()
    }

    fn party() -> Party {
        Party::new(
            CompanionAgent::new("Brakka", Role::Warden, Persona::default()),
            CompanionAgent::new("Iska", Role::Scholar, Persona::default()),
        )
        .unwrap()
    }

    fn services(narrator: Arc<dyn NarrativeGenerationService>, timeout: Duration) -> OrchestratorServices {
        OrchestratorServices {
            catalog: Arc::new(QuestCatalog::builtin()),
            narrator,
            clock: Arc::new(FixedClock::default()),
            rng: Arc::new(Mutex::new(MockRng)),
            request_timeout: timeout,
        }
    }

    fn orchestrator(narrator: Arc<ScriptedNarrator>) -> QuestOrchestrator {
        QuestOrchestrator::new(
            Uuid::new_v4(),
            party(),
            services(narrator, Duration::from_secs(5)),
        )
    }

    fn new_quest() -> RequestNewQuest {
        RequestNewQuest {
            correlation_id: Uuid::new_v4(),
        }
    }

    fn accept() -> AcceptQuest {
        AcceptQuest {
            correlation_id: Uuid::new_v4(),
        }
    }

    fn travel() -> AdvanceTravel {
        AdvanceTravel {
            correlation_id: Uuid::new_v4(),
        }
    }

    fn say(role: Role, text: &str) -> SendMessage {
        SendMessage {
            correlation_id: Uuid::new_v4(),
            role,
            text: text.to_owned(),
        }
    }

    /// Drives a session to the first challenge.
    async fn at_first_challenge(narrator: &Arc<ScriptedNarrator>) -> QuestOrchestrator {
        narrator.push_reply(composition_reply(FIRST, SECOND));
        narrator.push_reply("The road winds into the ash hills.");
        let orchestrator = orchestrator(Arc::clone(narrator));
        orchestrator.request_new_quest(&new_quest()).await.unwrap();
        orchestrator.accept_quest(&accept()).await.unwrap();
        orchestrator.advance_travel(&travel()).await.unwrap();
        orchestrator
    }

    #[tokio::test]
    async fn test_full_quest_end_to_end() {
        // Arrange
        let narrator = Arc::new(ScriptedNarrator::new([
            composition_reply(FIRST, SECOND),
            "You set out at dawn.".to_owned(),
            "I draw my blade and the bandits scatter.\nSOLUTION=TRUE".to_owned(),
            "The road climbs towards the vault.".to_owned(),
            "The glyphs yield to me.\nSOLUTION=TRUE".to_owned(),
            "A sealed chamber glows ahead.".to_owned(),
            "The Ember Crown is ours! SOLUTION=TRUE".to_owned(),
        ]));
        let orchestrator = orchestrator(Arc::clone(&narrator));

        // Act + Assert
        let view = orchestrator.request_new_quest(&new_quest()).await.unwrap();
        assert_eq!(view.phase, QuestPhase::Offered);
        assert_eq!(view.quest.as_ref().unwrap().artifact_name, "Ember Crown");

        let view = orchestrator.accept_quest(&accept()).await.unwrap();
        assert_eq!(view.phase, QuestPhase::Traveling(ChallengeSlot::First));

        let outcome = orchestrator.advance_travel(&travel()).await.unwrap();
        assert_eq!(outcome.narration, "You set out at dawn.");
        assert_eq!(outcome.session.phase, QuestPhase::ChallengeActive(ChallengeSlot::First));
        assert!(outcome.session.can_attempt_challenge);

        let reply = orchestrator
            .send_message(&say(Role::Warden, "Drive them off!"))
            .await
            .unwrap();
        assert!(reply.applied);
        assert_eq!(reply.dialogue, "I draw my blade and the bandits scatter.");
        assert_eq!(reply.session.phase, QuestPhase::Traveling(ChallengeSlot::Second));

        let outcome = orchestrator.advance_travel(&travel()).await.unwrap();
        assert_eq!(outcome.session.phase, QuestPhase::ChallengeActive(ChallengeSlot::Second));

        let reply = orchestrator
            .send_message(&say(Role::Scholar, "Read the tome."))
            .await
            .unwrap();
        assert!(reply.applied);
        assert_eq!(reply.session.phase, QuestPhase::FinalTravel);

        let outcome = orchestrator.advance_travel(&travel()).await.unwrap();
        assert_eq!(outcome.session.phase, QuestPhase::ArtifactDiscussion);
        assert!(outcome.session.awaiting_discussion);

        let reply = orchestrator
            .send_message(&say(Role::Scholar, "We found the Ember Crown!"))
            .await
            .unwrap();
        assert!(reply.applied);
        assert_eq!(reply.dialogue, "The Ember Crown is ours!");
        assert_eq!(reply.session.phase, QuestPhase::Complete);
        assert!(reply.session.quest.is_none());
        assert_eq!(reply.session.challenge_index, 0);
        assert_eq!(narrator.requests().len(), 7);
    }

    #[tokio::test]
    async fn test_solve_before_travel_leaves_index_unchanged() {
        // Arrange
        let narrator = Arc::new(ScriptedNarrator::new([
            composition_reply(FIRST, SECOND),
            "The bandits flee before my blade!\nSOLUTION=TRUE".to_owned(),
        ]));
        let orchestrator = orchestrator(Arc::clone(&narrator));
        orchestrator.request_new_quest(&new_quest()).await.unwrap();
        orchestrator.accept_quest(&accept()).await.unwrap();

        // Act
        let reply = orchestrator
            .send_message(&say(Role::Warden, "Deal with the bandits!"))
            .await
            .unwrap();

        // Assert
        assert!(!reply.applied);
        assert_eq!(reply.session.challenge_index, 0);
        assert_eq!(reply.session.phase, QuestPhase::Traveling(ChallengeSlot::First));
        assert!(!reply.session.can_attempt_challenge);
    }

    #[tokio::test]
    async fn test_wrong_companion_never_advances() {
        let narrator = Arc::new(ScriptedNarrator::default());
        let orchestrator = at_first_challenge(&narrator).await;
        narrator.push_reply("I will read the bandits a sonnet.\nSOLUTION=TRUE");

        let reply = orchestrator
            .send_message(&say(Role::Scholar, "You handle it."))
            .await
            .unwrap();

        assert!(!reply.solution);
        assert!(!reply.applied);
        assert!(!reply.is_correct_companion);
        assert_eq!(reply.session.phase, QuestPhase::ChallengeActive(ChallengeSlot::First));
    }

    #[tokio::test]
    async fn test_second_travel_call_does_not_double_advance() {
        let narrator = Arc::new(ScriptedNarrator::default());
        let orchestrator = at_first_challenge(&narrator).await;
        let requests_before = narrator.requests().len();

        let result = orchestrator.advance_travel(&travel()).await;

        assert!(matches!(result, Err(DomainError::InvalidTransition { .. })));
        let view = orchestrator.view().await;
        assert_eq!(view.phase, QuestPhase::ChallengeActive(ChallengeSlot::First));
        assert_eq!(narrator.requests().len(), requests_before);
    }

    #[tokio::test]
    async fn test_failed_narration_leaves_session_unchanged() {
        // Arrange
        let narrator = Arc::new(ScriptedNarrator::new([composition_reply(FIRST, SECOND)]));
        let orchestrator = orchestrator(Arc::clone(&narrator));
        orchestrator.request_new_quest(&new_quest()).await.unwrap();
        let before = orchestrator.accept_quest(&accept()).await.unwrap();
        narrator.push_error(DomainError::ServiceUnavailable("503".into()));

        // Act
        let result = orchestrator.advance_travel(&travel()).await;

        // Assert
        assert!(matches!(result, Err(ref e) if e.is_retryable()));
        let after = orchestrator.view().await;
        assert_eq!(after.phase, before.phase);
        assert_eq!(after.version, before.version);
    }

    #[tokio::test]
    async fn test_malformed_composition_offers_nothing() {
        let narrator = Arc::new(ScriptedNarrator::new(["Sorry, I cannot help with that."]));
        let orchestrator = orchestrator(narrator);

        let result = orchestrator.request_new_quest(&new_quest()).await;

        assert!(matches!(result, Err(DomainError::MalformedNarrative(_))));
        let view = orchestrator.view().await;
        assert_eq!(view.phase, QuestPhase::Idle);
        assert!(view.quest.is_none());
    }

    #[tokio::test]
    async fn test_slow_narrator_times_out_without_side_effects() {
        // Arrange
        let deadline = Duration::from_millis(20);
        let orchestrator = QuestOrchestrator::new(
            Uuid::new_v4(),
            party(),
            services(Arc::new(StallingNarrator(Duration::from_secs(5))), deadline),
        );

        // Act
        let result = orchestrator.request_new_quest(&new_quest()).await;

        // Assert
        match result {
            Err(DomainError::Timeout(d)) => assert_eq!(d, deadline),
            other => panic!("expected Timeout, got {other:?}"),
        }
        assert_eq!(orchestrator.view().await.phase, QuestPhase::Idle);
    }

    #[tokio::test]
    async fn test_overlapping_request_is_rejected() {
        // Arrange
        let orchestrator = Arc::new(QuestOrchestrator::new(
            Uuid::new_v4(),
            party(),
            services(
                Arc::new(StallingNarrator(Duration::from_millis(300))),
                Duration::from_secs(5),
            ),
        ));
        let running = Arc::clone(&orchestrator);
        let handle = tokio::spawn(async move { running.request_new_quest(&new_quest()).await });
        tokio::time::sleep(Duration::from_millis(50)).await;

        // Act
        let result = orchestrator.accept_quest(&accept()).await;

        // Assert
        match result {
            Err(DomainError::RequestInFlight(id)) => assert_eq!(id, orchestrator.session_id()),
            other => panic!("expected RequestInFlight, got {other:?}"),
        }
        // The stalled narrator answers prose, which cannot be parsed.
        let first = handle.await.unwrap();
        assert!(matches!(first, Err(DomainError::MalformedNarrative(_))));
    }

    /// Answers the first `budget` calls from the script, then stalls.
    struct StallWhenDry {
        script: ScriptedNarrator,
        budget: Mutex<usize>,
    }

    #[async_trait::async_trait]
    impl NarrativeGenerationService for StallWhenDry {
        async fn generate(
            &self,
            request: dreamnet_core::narrative::NarrativeRequest,
        ) -> Result<String, DomainError> {
            let scripted = {
                let mut budget = self.budget.lock().unwrap();
                let scripted = *budget > 0;
                *budget = budget.saturating_sub(1);
                scripted
            };
            if !scripted {
                tokio::time::sleep(Duration::from_secs(5)).await;
            }
            self.script.generate(request).await
        }
    }

    // MockRng takes the first unused challenge of each pool, so three
    // completed quests use up both pools.
    const CYCLE: [(&str, &str); 3] = [
        ("Warden_BanditAmbush", "Scholar_AncientTome"),
        ("Warden_RubbleCollapse", "Scholar_RiddleDoor"),
        ("Warden_SealedDoor", "Scholar_UnendingLabyrinth"),
    ];

    fn script_full_cycle(narrator: &ScriptedNarrator) {
        for (warden, scholar) in CYCLE {
            narrator.push_reply(composition_reply(warden, scholar));
            narrator.push_reply("Departure.");
            narrator.push_reply("Done.\nSOLUTION=TRUE");
            narrator.push_reply("Onward.");
            narrator.push_reply("Done.\nSOLUTION=TRUE");
            narrator.push_reply("The chamber.");
            narrator.push_reply("SOLUTION=TRUE");
        }
    }

    async fn play_full_cycle(orchestrator: &QuestOrchestrator) {
        for _ in CYCLE {
            orchestrator.request_new_quest(&new_quest()).await.unwrap();
            orchestrator.accept_quest(&accept()).await.unwrap();
            orchestrator.advance_travel(&travel()).await.unwrap();
            orchestrator.send_message(&say(Role::Warden, "Go!")).await.unwrap();
            orchestrator.advance_travel(&travel()).await.unwrap();
            orchestrator.send_message(&say(Role::Scholar, "Go!")).await.unwrap();
            orchestrator.advance_travel(&travel()).await.unwrap();
            let done = orchestrator.send_message(&say(Role::Warden, "Hooray!")).await.unwrap();
            assert_eq!(done.session.phase, QuestPhase::Complete);
        }
    }

    #[tokio::test]
    async fn test_exhausted_pools_start_a_new_cycle() {
        // Arrange
        let narrator = Arc::new(ScriptedNarrator::default());
        let orchestrator = orchestrator(Arc::clone(&narrator));
        script_full_cycle(&narrator);
        play_full_cycle(&orchestrator).await;
        narrator.push_reply(composition_reply(FIRST, SECOND));

        // Act
        let view = orchestrator.request_new_quest(&new_quest()).await.unwrap();

        // Assert
        assert_eq!(view.phase, QuestPhase::Offered);
        assert_eq!(view.current_objective.as_deref(), Some("Embark on the quest to find the Ember Crown"));
    }

    #[tokio::test]
    async fn test_new_cycle_retry_stays_within_one_deadline() {
        // Arrange
        let deadline = Duration::from_millis(200);
        let script = ScriptedNarrator::default();
        script_full_cycle(&script);
        let narrator = Arc::new(StallWhenDry {
            script,
            budget: Mutex::new(CYCLE.len() * 7),
        });
        let orchestrator = QuestOrchestrator::new(Uuid::new_v4(), party(), services(narrator, deadline));
        play_full_cycle(&orchestrator).await;

        // Act
        let result = orchestrator.request_new_quest(&new_quest()).await;

        // Assert
        match result {
            Err(DomainError::Timeout(d)) => assert_eq!(d, deadline),
            other => panic!("expected Timeout, got {other:?}"),
        }
        let view = orchestrator.view().await;
        assert_eq!(view.phase, QuestPhase::Complete);
    }
}
