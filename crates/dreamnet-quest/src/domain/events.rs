//! Domain events for the Quest Progression context.

use dreamnet_catalog::domain::challenge::ChallengeId;
use dreamnet_catalog::domain::quest::Quest;
use dreamnet_core::event::{DomainEvent, EventMetadata};
use serde::{Deserialize, Serialize};

/// Emitted when a freshly assembled quest is offered to the player.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestOffered {
    /// The assembled quest.
    pub quest: Quest,
}

/// Emitted when the player accepts the offered quest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestAccepted {
    /// Name of the accepted quest.
    pub quest_name: String,
}

/// Emitted when the party reaches a challenge location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArrivedAtChallenge {
    /// Position of the challenge in the quest order.
    pub challenge_index: usize,
    /// The challenge now active.
    pub challenge_id: ChallengeId,
}

/// Emitted when the active challenge is resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeSolved {
    /// Position of the challenge in the quest order.
    pub challenge_index: usize,
    /// The resolved challenge.
    pub challenge_id: ChallengeId,
}

/// Emitted when the party reaches the final chamber.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArrivedAtArtifact {
    /// The artifact waiting in the chamber.
    pub artifact_name: String,
}

/// Emitted when the artifact discussion concludes the quest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestCompleted {
    /// Name of the finished quest.
    pub quest_name: String,
    /// The artifact claimed.
    pub artifact_name: String,
}

/// Event type identifier for [`QuestOffered`].
pub const QUEST_OFFERED_EVENT_TYPE: &str = "quest.offered";

/// Event type identifier for [`QuestAccepted`].
pub const QUEST_ACCEPTED_EVENT_TYPE: &str = "quest.accepted";

/// Event type identifier for [`ArrivedAtChallenge`].
pub const ARRIVED_AT_CHALLENGE_EVENT_TYPE: &str = "quest.arrived_at_challenge";

/// Event type identifier for [`ChallengeSolved`].
pub const CHALLENGE_SOLVED_EVENT_TYPE: &str = "quest.challenge_solved";

/// Event type identifier for [`ArrivedAtArtifact`].
pub const ARRIVED_AT_ARTIFACT_EVENT_TYPE: &str = "quest.arrived_at_artifact";

/// Event type identifier for [`QuestCompleted`].
pub const QUEST_COMPLETED_EVENT_TYPE: &str = "quest.completed";

/// Event payload variants for the Quest Progression context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum QuestEventKind {
    /// A quest has been offered.
    QuestOffered(QuestOffered),
    /// The offered quest has been accepted.
    QuestAccepted(QuestAccepted),
    /// The party arrived at a challenge.
    ArrivedAtChallenge(ArrivedAtChallenge),
    /// The active challenge was solved.
    ChallengeSolved(ChallengeSolved),
    /// The party arrived in the final chamber.
    ArrivedAtArtifact(ArrivedAtArtifact),
    /// The quest is complete.
    QuestCompleted(QuestCompleted),
}

impl QuestEventKind {
    /// The event type identifier for this payload.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            QuestEventKind::QuestOffered(_) => QUEST_OFFERED_EVENT_TYPE,
            QuestEventKind::QuestAccepted(_) => QUEST_ACCEPTED_EVENT_TYPE,
            QuestEventKind::ArrivedAtChallenge(_) => ARRIVED_AT_CHALLENGE_EVENT_TYPE,
            QuestEventKind::ChallengeSolved(_) => CHALLENGE_SOLVED_EVENT_TYPE,
            QuestEventKind::ArrivedAtArtifact(_) => ARRIVED_AT_ARTIFACT_EVENT_TYPE,
            QuestEventKind::QuestCompleted(_) => QUEST_COMPLETED_EVENT_TYPE,
        }
    }
}

/// Domain event envelope for the Quest Progression context.
#[derive(Debug, Clone)]
pub struct QuestEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: QuestEventKind,
}

impl DomainEvent for QuestEvent {
    fn to_payload(&self) -> serde_json::Value {
        // Serialization of derived Serialize types to Value is infallible.
        serde_json::to_value(&self.kind).expect("QuestEventKind serialization is infallible")
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}
