//! Companion agents and the party they form.

use dreamnet_core::error::DomainError;
use dreamnet_core::role::Role;
use serde::{Deserialize, Serialize};

/// Roleplay attributes handed to the narrator with every message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Persona {
    /// How the companion speaks.
    #[serde(default)]
    pub conversation_style: String,
    /// How the companion looks.
    #[serde(default)]
    pub appearance: String,
    /// Where the companion comes from.
    #[serde(default)]
    pub backstory: String,
}

/// A roleplay persona tied to one role. Stateless with respect to quests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanionAgent {
    /// Display name.
    pub name: String,
    /// The companion's role tag.
    pub role: Role,
    /// Roleplay attributes.
    #[serde(default)]
    pub persona: Persona,
}

impl CompanionAgent {
    /// Creates a companion.
    #[must_use]
    pub fn new(name: impl Into<String>, role: Role, persona: Persona) -> Self {
        Self {
            name: name.into(),
            role,
            persona,
        }
    }

    /// One-line introduction, e.g. "Brakka, the Warden (Protector of the Party)".
    #[must_use]
    pub fn introduction(&self) -> String {
        format!("{}, the {} ({})", self.name, self.role, self.role.title())
    }

    /// The persona attributes that are filled in, as prompt lines.
    #[must_use]
    pub fn persona_lines(&self) -> Vec<String> {
        [
            ("Conversation style", &self.persona.conversation_style),
            ("Appearance", &self.persona.appearance),
            ("Backstory", &self.persona.backstory),
        ]
        .into_iter()
        .filter(|(_, value)| !value.trim().is_empty())
        .map(|(label, value)| format!("{label}: {}", value.trim()))
        .collect()
    }
}

/// The two fixed companions of one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Party {
    warden: CompanionAgent,
    scholar: CompanionAgent,
}

impl Party {
    /// Forms a party from a Warden and a Scholar.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if either companion holds the
    /// wrong role or has no name.
    pub fn new(warden: CompanionAgent, scholar: CompanionAgent) -> Result<Self, DomainError> {
        for (companion, expected) in [(&warden, Role::Warden), (&scholar, Role::Scholar)] {
            if companion.role != expected {
                return Err(DomainError::Validation(format!(
                    "{} is a {} and cannot join as the party's {expected}",
                    companion.name, companion.role
                )));
            }
            if companion.name.trim().is_empty() {
                return Err(DomainError::Validation(format!(
                    "the party's {expected} needs a name"
                )));
            }
        }
        Ok(Self { warden, scholar })
    }

    /// The companion holding `role`.
    #[must_use]
    pub fn companion(&self, role: Role) -> &CompanionAgent {
        match role {
            Role::Warden => &self.warden,
            Role::Scholar => &self.scholar,
        }
    }
}
