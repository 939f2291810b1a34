//! The quest session aggregate.

use std::collections::BTreeSet;

use dreamnet_catalog::domain::challenge::{Challenge, ChallengeId};
use dreamnet_catalog::domain::quest::{Quest, QuestView};
use dreamnet_core::aggregate::AggregateRoot;
use dreamnet_core::error::DomainError;
use dreamnet_core::event::{Clock, EventMetadata};
use serde::Serialize;
use uuid::Uuid;

use super::events::{
    ArrivedAtArtifact, ArrivedAtChallenge, ChallengeSolved, QuestAccepted, QuestCompleted,
    QuestEvent, QuestEventKind, QuestOffered,
};
use super::phase::{ChallengeSlot, QuestAction, QuestPhase};

/// Index reached once both challenges are behind the party.
const CHALLENGES_DONE: usize = 2;

/// One player's progress through the current quest.
///
/// Every state change goes through a command method that validates the
/// transition, records a [`QuestEvent`] and applies it. A command that
/// fails leaves the session untouched.
#[derive(Debug)]
pub struct QuestSession {
    /// Aggregate identifier.
    pub id: Uuid,
    /// Current version (event count).
    pub(crate) version: i64,
    phase: QuestPhase,
    quest: Option<Quest>,
    challenge_index: usize,
    can_attempt_challenge: bool,
    awaiting_discussion: bool,
    /// Challenges solved in earlier quests of the current cycle.
    completed_challenges: BTreeSet<ChallengeId>,
    /// Uncommitted events pending publication.
    uncommitted_events: Vec<QuestEvent>,
}

impl QuestSession {
    /// Creates an idle session.
    #[must_use]
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            version: 0,
            phase: QuestPhase::Idle,
            quest: None,
            challenge_index: 0,
            can_attempt_challenge: false,
            awaiting_discussion: false,
            completed_challenges: BTreeSet::new(),
            uncommitted_events: Vec::new(),
        }
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> QuestPhase {
        self.phase
    }

    /// The offered or running quest, if any.
    #[must_use]
    pub fn quest(&self) -> Option<&Quest> {
        self.quest.as_ref()
    }

    /// Number of challenges solved in the current quest (0, 1 or 2).
    #[must_use]
    pub fn challenge_index(&self) -> usize {
        self.challenge_index
    }

    /// Whether the party stands at an unsolved challenge.
    #[must_use]
    pub fn can_attempt_challenge(&self) -> bool {
        self.can_attempt_challenge
    }

    /// Whether the artifact discussion is pending.
    #[must_use]
    pub fn awaiting_discussion(&self) -> bool {
        self.awaiting_discussion
    }

    /// Challenge ids solved since the last cycle reset.
    #[must_use]
    pub fn completed_challenges(&self) -> &BTreeSet<ChallengeId> {
        &self.completed_challenges
    }

    /// Starts a new cycle so earlier challenges can be drawn again.
    pub fn forget_completed_challenges(&mut self) {
        self.completed_challenges.clear();
    }

    /// The challenge the party is standing at, only while it is active.
    #[must_use]
    pub fn active_challenge(&self) -> Option<&Challenge> {
        match self.phase {
            QuestPhase::ChallengeActive(slot) => self.challenge_at(slot),
            _ => None,
        }
    }

    /// The challenge the party is traveling towards, if any.
    #[must_use]
    pub fn upcoming_challenge(&self) -> Option<&Challenge> {
        match self.phase {
            QuestPhase::Traveling(slot) => self.challenge_at(slot),
            _ => None,
        }
    }

    /// The most recently solved challenge of the current quest.
    #[must_use]
    pub fn previous_challenge(&self) -> Option<&Challenge> {
        let index = self.challenge_index.checked_sub(1)?;
        self.quest.as_ref()?.quest_order.get(index)
    }

    /// Whether a challenge-resolution signal may be applied now.
    #[must_use]
    pub fn challenge_gate_open(&self) -> bool {
        self.can_attempt_challenge
    }

    /// Whether a discussion-resolution signal may be applied now.
    #[must_use]
    pub fn discussion_gate_open(&self) -> bool {
        self.phase == QuestPhase::ArtifactDiscussion
    }

    /// The player-facing objective for the current phase.
    #[must_use]
    pub fn current_objective(&self) -> Option<String> {
        let quest = self.quest.as_ref()?;
        match self.phase {
            QuestPhase::Offered => Some(format!(
                "Embark on the quest to find the {}",
                quest.artifact_name
            )),
            QuestPhase::Traveling(slot) | QuestPhase::ChallengeActive(slot) => self
                .challenge_at(slot)
                .map(|c| c.objective_text.clone()),
            QuestPhase::FinalTravel => Some("Claim your reward".to_owned()),
            QuestPhase::ArtifactDiscussion => {
                Some("Discuss the artifact with your companions".to_owned())
            }
            QuestPhase::Idle | QuestPhase::Complete => None,
        }
    }

    /// The player-facing projection of this session.
    #[must_use]
    pub fn view(&self) -> SessionView {
        SessionView {
            session_id: self.id,
            phase: self.phase,
            challenge_index: self.challenge_index,
            can_attempt_challenge: self.can_attempt_challenge,
            awaiting_discussion: self.awaiting_discussion,
            quest: self.quest.as_ref().map(Quest::player_view),
            current_objective: self.current_objective(),
            version: self.version,
        }
    }

    /// Offers a newly assembled quest, producing a `QuestOffered` event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` unless the session is idle
    /// or its previous quest is complete.
    pub fn start_quest(
        &mut self,
        quest: Quest,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.phase.next(QuestAction::StartQuest)?;
        self.record(
            QuestEventKind::QuestOffered(QuestOffered { quest }),
            correlation_id,
            clock,
        );
        Ok(())
    }

    /// Accepts the offered quest, producing a `QuestAccepted` event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` unless a quest is on offer.
    pub fn accept(&mut self, correlation_id: Uuid, clock: &dyn Clock) -> Result<(), DomainError> {
        self.phase.next(QuestAction::Accept)?;
        let quest_name = self.quest_for(QuestAction::Accept)?.quest_name.clone();
        self.record(
            QuestEventKind::QuestAccepted(QuestAccepted { quest_name }),
            correlation_id,
            clock,
        );
        Ok(())
    }

    /// Reaches the next location: a challenge or the final chamber.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` unless the party is traveling.
    pub fn arrive(&mut self, correlation_id: Uuid, clock: &dyn Clock) -> Result<(), DomainError> {
        self.phase.next(QuestAction::Arrive)?;
        let quest = self.quest_for(QuestAction::Arrive)?;
        let kind = match self.phase {
            QuestPhase::Traveling(slot) => {
                let challenge = quest
                    .quest_order
                    .get(slot.index())
                    .ok_or_else(|| self.rejected(QuestAction::Arrive))?;
                QuestEventKind::ArrivedAtChallenge(ArrivedAtChallenge {
                    challenge_index: slot.index(),
                    challenge_id: challenge.id.clone(),
                })
            }
            _ => QuestEventKind::ArrivedAtArtifact(ArrivedAtArtifact {
                artifact_name: quest.artifact_name.clone(),
            }),
        };
        self.record(kind, correlation_id, clock);
        Ok(())
    }

    /// Resolves the active challenge, producing a `ChallengeSolved` event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` unless a challenge is active.
    pub fn solve_challenge(
        &mut self,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.phase.next(QuestAction::Solve)?;
        let challenge = self
            .active_challenge()
            .ok_or_else(|| self.rejected(QuestAction::Solve))?;
        let kind = QuestEventKind::ChallengeSolved(ChallengeSolved {
            challenge_index: self.challenge_index,
            challenge_id: challenge.id.clone(),
        });
        self.record(kind, correlation_id, clock);
        Ok(())
    }

    /// Concludes the artifact discussion, producing a `QuestCompleted` event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` unless the discussion is
    /// pending.
    pub fn conclude_discussion(
        &mut self,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.phase.next(QuestAction::DiscussionSolved)?;
        let quest = self.quest_for(QuestAction::DiscussionSolved)?;
        let kind = QuestEventKind::QuestCompleted(QuestCompleted {
            quest_name: quest.quest_name.clone(),
            artifact_name: quest.artifact_name.clone(),
        });
        self.record(kind, correlation_id, clock);
        Ok(())
    }

    /// Whether the session fields agree with its phase.
    #[must_use]
    pub fn invariants_hold(&self) -> bool {
        let expected_index = match self.phase {
            QuestPhase::Traveling(slot) | QuestPhase::ChallengeActive(slot) => slot.index(),
            QuestPhase::FinalTravel | QuestPhase::ArtifactDiscussion => CHALLENGES_DONE,
            QuestPhase::Idle | QuestPhase::Offered | QuestPhase::Complete => 0,
        };
        let has_quest = matches!(self.phase, QuestPhase::Offered) || self.phase.is_underway();

        self.challenge_index == expected_index
            && self.can_attempt_challenge == matches!(self.phase, QuestPhase::ChallengeActive(_))
            && self.awaiting_discussion == (self.phase == QuestPhase::ArtifactDiscussion)
            && self.quest.is_some() == has_quest
    }

    fn challenge_at(&self, slot: ChallengeSlot) -> Option<&Challenge> {
        self.quest.as_ref()?.quest_order.get(slot.index())
    }

    fn quest_for(&self, action: QuestAction) -> Result<&Quest, DomainError> {
        self.quest.as_ref().ok_or_else(|| self.rejected(action))
    }

    fn rejected(&self, action: QuestAction) -> DomainError {
        DomainError::InvalidTransition {
            phase: self.phase.to_string(),
            action: action.describe(),
        }
    }

    fn record(&mut self, kind: QuestEventKind, correlation_id: Uuid, clock: &dyn Clock) {
        let event = QuestEvent {
            metadata: EventMetadata::stamp(
                kind.event_type(),
                self.id,
                self.next_sequence_number(),
                correlation_id,
                clock,
            ),
            kind,
        };
        self.apply(&event);
        self.uncommitted_events.push(event);
        debug_assert!(self.invariants_hold(), "quest session invariants broken");
    }
}

impl AggregateRoot for QuestSession {
    type Event = QuestEvent;

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn apply(&mut self, event: &Self::Event) {
        match &event.kind {
            QuestEventKind::QuestOffered(payload) => {
                self.quest = Some(payload.quest.clone());
                self.phase = QuestPhase::Offered;
                self.challenge_index = 0;
                self.can_attempt_challenge = false;
                self.awaiting_discussion = false;
            }
            QuestEventKind::QuestAccepted(_) => {
                self.phase = QuestPhase::Traveling(ChallengeSlot::First);
                self.challenge_index = 0;
            }
            QuestEventKind::ArrivedAtChallenge(payload) => {
                if let Some(slot) = ChallengeSlot::from_index(payload.challenge_index) {
                    self.phase = QuestPhase::ChallengeActive(slot);
                    self.can_attempt_challenge = true;
                }
            }
            QuestEventKind::ChallengeSolved(payload) => {
                self.can_attempt_challenge = false;
                self.challenge_index = payload.challenge_index + 1;
                self.phase = match ChallengeSlot::from_index(self.challenge_index) {
                    Some(slot) => QuestPhase::Traveling(slot),
                    None => QuestPhase::FinalTravel,
                };
                self.completed_challenges.insert(payload.challenge_id.clone());
            }
            QuestEventKind::ArrivedAtArtifact(_) => {
                self.phase = QuestPhase::ArtifactDiscussion;
                self.awaiting_discussion = true;
            }
            QuestEventKind::QuestCompleted(_) => {
                self.phase = QuestPhase::Complete;
                self.quest = None;
                self.challenge_index = 0;
                self.can_attempt_challenge = false;
                self.awaiting_discussion = false;
            }
        }
        self.version += 1;
    }

    fn uncommitted_events(&self) -> &[Self::Event] {
        &self.uncommitted_events
    }

    fn take_uncommitted_events(&mut self) -> Vec<Self::Event> {
        std::mem::take(&mut self.uncommitted_events)
    }
}

/// What the player is allowed to see of a session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    /// Session identifier.
    pub session_id: Uuid,
    /// Current phase.
    pub phase: QuestPhase,
    /// Challenges solved in the current quest.
    pub challenge_index: usize,
    /// Whether the party stands at an unsolved challenge.
    pub can_attempt_challenge: bool,
    /// Whether the artifact discussion is pending.
    pub awaiting_discussion: bool,
    /// The current quest without its game-master notes.
    pub quest: Option<QuestView>,
    /// What the player should do next.
    pub current_objective: Option<String>,
    /// Number of events applied.
    pub version: i64,
}
