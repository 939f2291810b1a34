//! Scenes: what the party is doing when the player speaks.
//!
//! Challenge solving and the artifact discussion are two instances of one
//! resolution protocol. They differ only in how the marker is scanned
//! ([`ScanStrategy`]) and in which session gate must be open before the
//! signal may be applied ([`ResolutionKind::gate_open`]).

use dreamnet_catalog::domain::challenge::Challenge;
use dreamnet_core::role::Role;
use dreamnet_quest::domain::phase::QuestPhase;
use dreamnet_quest::domain::session::QuestSession;

use super::sentinel::ScanStrategy;

/// The two kinds of scene a companion can resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionKind {
    /// Solving the active challenge.
    Challenge,
    /// Concluding the artifact discussion.
    Discussion,
}

impl ResolutionKind {
    /// How the narrator reply is scanned for this kind.
    #[must_use]
    pub fn scan_strategy(self) -> ScanStrategy {
        match self {
            ResolutionKind::Challenge => ScanStrategy::LastLine,
            ResolutionKind::Discussion => ScanStrategy::Anywhere,
        }
    }

    /// Whether `session` currently accepts a resolution of this kind.
    #[must_use]
    pub fn gate_open(self, session: &QuestSession) -> bool {
        match self {
            ResolutionKind::Challenge => session.challenge_gate_open(),
            ResolutionKind::Discussion => session.discussion_gate_open(),
        }
    }
}

/// The situation a message is spoken in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scene {
    /// No quest underway.
    Idle,
    /// On the road between locations.
    Traveling {
        /// Name of the quest.
        quest_name: String,
        /// What waits at the destination.
        objective: Option<String>,
    },
    /// Standing at a challenge.
    Challenge {
        /// Name of the quest, when known.
        quest_name: Option<String>,
        /// The active challenge.
        challenge: Challenge,
    },
    /// In the final chamber with the artifact.
    ArtifactDiscussion {
        /// The recovered artifact.
        artifact_name: String,
    },
}

impl Scene {
    /// The scene a session is in.
    #[must_use]
    pub fn from_session(session: &QuestSession) -> Self {
        let Some(quest) = session.quest() else {
            return Scene::Idle;
        };
        match session.phase() {
            QuestPhase::ChallengeActive(_) => match session.active_challenge() {
                Some(challenge) => Scene::Challenge {
                    quest_name: Some(quest.quest_name.clone()),
                    challenge: challenge.clone(),
                },
                None => Scene::Idle,
            },
            QuestPhase::Traveling(_) | QuestPhase::FinalTravel => Scene::Traveling {
                quest_name: quest.quest_name.clone(),
                objective: session.current_objective(),
            },
            QuestPhase::ArtifactDiscussion => Scene::ArtifactDiscussion {
                artifact_name: quest.artifact_name.clone(),
            },
            QuestPhase::Idle | QuestPhase::Offered | QuestPhase::Complete => Scene::Idle,
        }
    }

    /// What a companion could resolve in this scene, if anything.
    #[must_use]
    pub fn resolution(&self) -> Option<ResolutionKind> {
        match self {
            Scene::Challenge { .. } => Some(ResolutionKind::Challenge),
            Scene::ArtifactDiscussion { .. } => Some(ResolutionKind::Discussion),
            Scene::Idle | Scene::Traveling { .. } => None,
        }
    }

    /// Whether `role` matches the active challenge.
    #[must_use]
    pub fn is_correct_companion(&self, role: Role) -> bool {
        matches!(self, Scene::Challenge { challenge, .. } if challenge.role == role)
    }

    /// Whether a companion of `role` may resolve this scene.
    ///
    /// Either companion may conclude the artifact discussion.
    #[must_use]
    pub fn authorizes(&self, role: Role) -> bool {
        match self {
            Scene::Challenge { .. } => self.is_correct_companion(role),
            Scene::ArtifactDiscussion { .. } => true,
            Scene::Idle | Scene::Traveling { .. } => false,
        }
    }

    /// How replies in this scene are cleaned and scanned.
    #[must_use]
    pub fn scan_strategy(&self) -> ScanStrategy {
        self.resolution()
            .map_or(ScanStrategy::LastLine, ResolutionKind::scan_strategy)
    }
}
