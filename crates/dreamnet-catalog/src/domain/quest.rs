//! Quests: two ordered challenges and the artifact at the end.

use dreamnet_core::error::DomainError;
use dreamnet_core::role::Role;
use serde::{Deserialize, Serialize};

use super::challenge::Challenge;

/// Exactly two challenges, one per role, in a fixed presentation order.
///
/// The order is chosen once when the quest is assembled and never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Challenge>", into = "Vec<Challenge>")]
pub struct QuestOrder([Challenge; 2]);

impl QuestOrder {
    /// Number of challenges in every quest.
    pub const LEN: usize = 2;

    /// Pairs two challenges in the given order.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if both challenges share a role.
    pub fn new(first: Challenge, second: Challenge) -> Result<Self, DomainError> {
        if first.role == second.role {
            return Err(DomainError::Validation(format!(
                "a quest needs one Warden and one Scholar challenge, got two {} challenges",
                first.role
            )));
        }
        Ok(Self([first, second]))
    }

    /// The challenge at `index` (0 or 1).
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Challenge> {
        self.0.get(index)
    }

    /// The challenge faced first.
    #[must_use]
    pub fn first(&self) -> &Challenge {
        &self.0[0]
    }

    /// The challenge faced second.
    #[must_use]
    pub fn second(&self) -> &Challenge {
        &self.0[1]
    }

    /// Roles in presentation order.
    #[must_use]
    pub fn roles(&self) -> [Role; 2] {
        [self.0[0].role, self.0[1].role]
    }

    /// Iterates over the challenges in presentation order.
    pub fn iter(&self) -> impl Iterator<Item = &Challenge> {
        self.0.iter()
    }
}

impl TryFrom<Vec<Challenge>> for QuestOrder {
    type Error = DomainError;

    fn try_from(challenges: Vec<Challenge>) -> Result<Self, Self::Error> {
        let count = challenges.len();
        let [first, second]: [Challenge; 2] = challenges.try_into().map_err(|_| {
            DomainError::Validation(format!(
                "a quest has exactly {} challenges, got {count}",
                QuestOrder::LEN
            ))
        })?;
        QuestOrder::new(first, second)
    }
}

impl From<QuestOrder> for Vec<Challenge> {
    fn from(order: QuestOrder) -> Self {
        order.0.into()
    }
}

/// One playthrough unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quest {
    /// Display name of the quest.
    pub quest_name: String,
    /// The reward found in the final chamber.
    pub artifact_name: String,
    /// Player-visible introduction.
    pub quest_hook: String,
    /// Game-master notes. Never shown to the player.
    pub dm_notes: String,
    /// The two challenges in presentation order.
    pub quest_order: QuestOrder,
}

impl Quest {
    /// The player-facing projection of this quest.
    #[must_use]
    pub fn player_view(&self) -> QuestView {
        QuestView {
            quest_name: self.quest_name.clone(),
            artifact_name: self.artifact_name.clone(),
            quest_hook: self.quest_hook.clone(),
        }
    }
}

/// What the player is allowed to see of a quest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestView {
    /// Display name of the quest.
    pub quest_name: String,
    /// The reward found in the final chamber.
    pub artifact_name: String,
    /// Player-visible introduction.
    pub quest_hook: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::challenge::ChallengeId;

    fn challenge(id: &str, role: Role) -> Challenge {
        Challenge {
            id: ChallengeId::new(id),
            role,
            description: String::new(),
            objective_text: format!("Overcome {id}."),
            content: String::new(),
            solution_hint: None,
        }
    }

    #[test]
    fn test_quest_order_rejects_same_role_pair() {
        let result = QuestOrder::new(challenge("a", Role::Warden), challenge("b", Role::Warden));
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_quest_order_keeps_given_order() {
        let order =
            QuestOrder::new(challenge("tome", Role::Scholar), challenge("door", Role::Warden))
                .unwrap();
        assert_eq!(order.roles(), [Role::Scholar, Role::Warden]);
        assert_eq!(order.first().id.as_str(), "tome");
        assert_eq!(order.get(1).unwrap().id.as_str(), "door");
        assert!(order.get(2).is_none());
    }

    #[test]
    fn test_quest_order_deserialization_enforces_length_and_roles() {
        let one = serde_json::json!([{
            "id": "door", "role": "Warden", "description": "", "objectiveText": "", "content": ""
        }]);
        assert!(serde_json::from_value::<QuestOrder>(one).is_err());

        let same_role = serde_json::json!([
            { "id": "a", "role": "Scholar", "description": "", "objectiveText": "", "content": "" },
            { "id": "b", "role": "Scholar", "description": "", "objectiveText": "", "content": "" }
        ]);
        assert!(serde_json::from_value::<QuestOrder>(same_role).is_err());
    }

    #[test]
    fn test_player_view_omits_dm_notes() {
        // Arrange
        let quest = Quest {
            quest_name: "The Drowned Lantern".into(),
            artifact_name: "Lantern of Tides".into(),
            quest_hook: "A light flickers beneath the lake.".into(),
            dm_notes: "Bandits first, then the riddle door.".into(),
            quest_order: QuestOrder::new(
                challenge("door", Role::Warden),
                challenge("riddle", Role::Scholar),
            )
            .unwrap(),
        };

        // Act
        let view = serde_json::to_value(quest.player_view()).unwrap();

        // Assert
        assert_eq!(view["questName"], "The Drowned Lantern");
        assert!(view.get("dmNotes").is_none());
        assert!(view.get("questOrder").is_none());
    }
}
