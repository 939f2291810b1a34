//! Challenges and per-role challenge pools.

use std::collections::BTreeSet;
use std::fmt;

use dreamnet_core::error::DomainError;
use dreamnet_core::role::Role;
use serde::{Deserialize, Serialize};

/// Stable identifier of a challenge within the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChallengeId(String);

impl ChallengeId {
    /// Wraps a raw identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChallengeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A role-tagged obstacle that only the matching companion can resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    /// Catalog identifier.
    pub id: ChallengeId,
    /// The companion role that can resolve this challenge.
    pub role: Role,
    /// Short summary, shown to the narrative service when composing quests.
    #[serde(default)]
    pub description: String,
    /// Player-facing objective. Quests may carry a rephrased copy.
    pub objective_text: String,
    /// The scene as the party encounters it.
    #[serde(default)]
    pub content: String,
    /// What the player must get the companion to do. Never shown to the player.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solution_hint: Option<String>,
}

impl Challenge {
    /// Returns a copy carrying a different objective text.
    #[must_use]
    pub fn with_objective(&self, objective_text: impl Into<String>) -> Self {
        Self {
            objective_text: objective_text.into(),
            ..self.clone()
        }
    }
}

/// An ordered, read-only collection of challenges sharing one role.
#[derive(Debug, Clone)]
pub struct ChallengePool {
    role: Role,
    challenges: Vec<Challenge>,
}

impl ChallengePool {
    /// Creates a pool, checking that every challenge carries `role`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if a challenge has another role.
    pub fn new(role: Role, challenges: Vec<Challenge>) -> Result<Self, DomainError> {
        if let Some(stray) = challenges.iter().find(|c| c.role != role) {
            return Err(DomainError::Validation(format!(
                "challenge {} is tagged {} but listed in the {role} pool",
                stray.id, stray.role
            )));
        }
        Ok(Self { role, challenges })
    }

    /// Builds a pool from challenges already tagged with `role`.
    pub(crate) fn from_tagged(role: Role, challenges: Vec<Challenge>) -> Self {
        debug_assert!(challenges.iter().all(|c| c.role == role));
        Self { role, challenges }
    }

    /// The role shared by every challenge in this pool.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// All challenges, in catalog order.
    #[must_use]
    pub fn challenges(&self) -> &[Challenge] {
        &self.challenges
    }

    /// Number of challenges in the pool.
    #[must_use]
    pub fn len(&self) -> usize {
        self.challenges.len()
    }

    /// Whether the pool holds no challenges.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.challenges.is_empty()
    }

    /// Challenges whose ids are not in `excluded`, in catalog order.
    #[must_use]
    pub fn available(&self, excluded: &BTreeSet<ChallengeId>) -> Vec<&Challenge> {
        self.challenges
            .iter()
            .filter(|c| !excluded.contains(&c.id))
            .collect()
    }
}
