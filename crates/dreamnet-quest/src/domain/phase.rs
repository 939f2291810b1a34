//! Quest phases and the transition table.

use std::fmt;

use dreamnet_core::error::DomainError;
use serde::{Serialize, Serializer};

/// Position of a challenge within a quest's presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChallengeSlot {
    /// The challenge faced first.
    First,
    /// The challenge faced second.
    Second,
}

impl ChallengeSlot {
    /// Zero-based index into the quest order.
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            ChallengeSlot::First => 0,
            ChallengeSlot::Second => 1,
        }
    }

    /// The slot at a zero-based index, if any.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(ChallengeSlot::First),
            1 => Some(ChallengeSlot::Second),
            _ => None,
        }
    }
}

/// Player-driven actions that move a quest between phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestAction {
    /// Assemble a new quest and offer it.
    StartQuest,
    /// Accept the offered quest.
    Accept,
    /// Reach the next location.
    Arrive,
    /// Resolve the active challenge.
    Solve,
    /// Conclude the artifact discussion.
    DiscussionSolved,
}

impl QuestAction {
    /// Short verb phrase used in error messages.
    #[must_use]
    pub fn describe(self) -> &'static str {
        match self {
            QuestAction::StartQuest => "start a quest",
            QuestAction::Accept => "accept the quest",
            QuestAction::Arrive => "travel",
            QuestAction::Solve => "solve a challenge",
            QuestAction::DiscussionSolved => "conclude the artifact discussion",
        }
    }
}

/// The lifecycle state of one quest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuestPhase {
    /// No quest yet.
    #[default]
    Idle,
    /// A quest has been assembled and its hook shown.
    Offered,
    /// On the road towards a challenge.
    Traveling(ChallengeSlot),
    /// At a challenge; the matching companion may resolve it.
    ChallengeActive(ChallengeSlot),
    /// Both challenges solved, heading to the final chamber.
    FinalTravel,
    /// In the final chamber, discussing the artifact.
    ArtifactDiscussion,
    /// The quest is over.
    Complete,
}

impl QuestPhase {
    /// The phase reached by applying `action`, if the table allows it.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` if `action` is not allowed
    /// from this phase.
    pub fn next(self, action: QuestAction) -> Result<QuestPhase, DomainError> {
        use ChallengeSlot::{First, Second};
        use QuestAction::{Accept, Arrive, DiscussionSolved, Solve, StartQuest};
        use QuestPhase::{
            ArtifactDiscussion, ChallengeActive, Complete, FinalTravel, Idle, Offered, Traveling,
        };

        match (self, action) {
            (Idle | Complete, StartQuest) => Ok(Offered),
            (Offered, Accept) => Ok(Traveling(First)),
            (Traveling(slot), Arrive) => Ok(ChallengeActive(slot)),
            (ChallengeActive(First), Solve) => Ok(Traveling(Second)),
            (ChallengeActive(Second), Solve) => Ok(FinalTravel),
            (FinalTravel, Arrive) => Ok(ArtifactDiscussion),
            (ArtifactDiscussion, DiscussionSolved) => Ok(Complete),
            (phase, action) => Err(DomainError::InvalidTransition {
                phase: phase.to_string(),
                action: action.describe(),
            }),
        }
    }

    /// Whether a quest is underway (accepted and not yet complete).
    #[must_use]
    pub fn is_underway(self) -> bool {
        matches!(
            self,
            QuestPhase::Traveling(_)
                | QuestPhase::ChallengeActive(_)
                | QuestPhase::FinalTravel
                | QuestPhase::ArtifactDiscussion
        )
    }
}

impl fmt::Display for QuestPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestPhase::Idle => f.write_str("Idle"),
            QuestPhase::Offered => f.write_str("Offered"),
            QuestPhase::Traveling(slot) => write!(f, "Traveling({})", slot.index()),
            QuestPhase::ChallengeActive(slot) => write!(f, "ChallengeActive({})", slot.index()),
            QuestPhase::FinalTravel => f.write_str("FinalTravel"),
            QuestPhase::ArtifactDiscussion => f.write_str("ArtifactDiscussion"),
            QuestPhase::Complete => f.write_str("Complete"),
        }
    }
}

impl Serialize for QuestPhase {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
