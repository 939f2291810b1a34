//! The quest catalog: both challenge pools and the drawing rule.
//!
//! A catalog is immutable once built and is shared read-only by every
//! session.

use std::collections::{BTreeSet, HashSet};

use dreamnet_core::error::DomainError;
use dreamnet_core::rng::DeterministicRng;
use dreamnet_core::role::Role;
use serde::Deserialize;

use super::challenge::{Challenge, ChallengeId, ChallengePool};
use super::pools;

/// The pair of challenges picked for a new quest, in presentation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeDraw {
    /// Faced first.
    pub first: Challenge,
    /// Faced second.
    pub second: Challenge,
}

impl ChallengeDraw {
    /// Both challenges in presentation order.
    #[must_use]
    pub fn in_order(&self) -> [&Challenge; 2] {
        [&self.first, &self.second]
    }
}

/// Both role pools.
#[derive(Debug, Clone)]
pub struct QuestCatalog {
    warden: ChallengePool,
    scholar: ChallengePool,
}

/// On-disk shape of a catalog file.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    warden: Vec<CatalogEntry>,
    scholar: Vec<CatalogEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatalogEntry {
    id: String,
    #[serde(default)]
    role: Option<Role>,
    description: String,
    objective_text: String,
    content: String,
    #[serde(default)]
    solution_hint: Option<String>,
}

impl CatalogEntry {
    fn into_challenge(self, pool_role: Role) -> Result<Challenge, DomainError> {
        if let Some(tagged) = self.role {
            if tagged != pool_role {
                return Err(DomainError::Validation(format!(
                    "challenge {} is tagged {tagged} but listed under {pool_role}",
                    self.id
                )));
            }
        }
        Ok(Challenge {
            id: ChallengeId::new(self.id),
            role: pool_role,
            description: self.description,
            objective_text: self.objective_text,
            content: self.content,
            solution_hint: self.solution_hint,
        })
    }
}

impl QuestCatalog {
    /// Builds a catalog from two pools.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if a pool has the wrong role, is
    /// empty, or if any challenge id appears twice.
    pub fn new(warden: ChallengePool, scholar: ChallengePool) -> Result<Self, DomainError> {
        for (pool, expected) in [(&warden, Role::Warden), (&scholar, Role::Scholar)] {
            if pool.role() != expected {
                return Err(DomainError::Validation(format!(
                    "the {expected} pool holds {} challenges",
                    pool.role()
                )));
            }
            if pool.is_empty() {
                return Err(DomainError::Validation(format!(
                    "the {expected} pool is empty"
                )));
            }
        }

        let mut seen = HashSet::new();
        for challenge in warden.challenges().iter().chain(scholar.challenges()) {
            if !seen.insert(&challenge.id) {
                return Err(DomainError::Validation(format!(
                    "challenge id {} appears more than once",
                    challenge.id
                )));
            }
        }

        Ok(Self { warden, scholar })
    }

    /// The catalog shipped with the game.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            warden: pools::warden_pool(),
            scholar: pools::scholar_pool(),
        }
    }

    /// Parses a YAML catalog with `warden` and `scholar` lists.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the document does not parse or
    /// fails the checks of [`QuestCatalog::new`].
    pub fn from_yaml(source: &str) -> Result<Self, DomainError> {
        let file: CatalogFile = serde_yaml::from_str(source)
            .map_err(|e| DomainError::Validation(format!("invalid challenge catalog: {e}")))?;

        let warden = file
            .warden
            .into_iter()
            .map(|e| e.into_challenge(Role::Warden))
            .collect::<Result<Vec<_>, _>>()?;
        let scholar = file
            .scholar
            .into_iter()
            .map(|e| e.into_challenge(Role::Scholar))
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(
            ChallengePool::new(Role::Warden, warden)?,
            ChallengePool::new(Role::Scholar, scholar)?,
        )
    }

    /// The pool for `role`.
    #[must_use]
    pub fn pool(&self, role: Role) -> &ChallengePool {
        match role {
            Role::Warden => &self.warden,
            Role::Scholar => &self.scholar,
        }
    }

    /// Looks up a challenge by id in either pool.
    #[must_use]
    pub fn find(&self, id: &ChallengeId) -> Option<&Challenge> {
        self.warden
            .challenges()
            .iter()
            .chain(self.scholar.challenges())
            .find(|c| &c.id == id)
    }

    /// Picks one unused challenge per role and a presentation order.
    ///
    /// Each pick is uniform over the filtered pool; Warden-first and
    /// Scholar-first are equally likely.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::PoolExhausted` if every challenge of a role is
    /// excluded.
    pub fn draw(
        &self,
        excluded: &BTreeSet<ChallengeId>,
        rng: &mut dyn DeterministicRng,
    ) -> Result<ChallengeDraw, DomainError> {
        let warden = pick(&self.warden, excluded, rng)?;
        let scholar = pick(&self.scholar, excluded, rng)?;

        let (first, second) = if rng.next_u32_range(0, 1) == 0 {
            (warden, scholar)
        } else {
            (scholar, warden)
        };

        Ok(ChallengeDraw {
            first: first.clone(),
            second: second.clone(),
        })
    }
}

fn pick<'a>(
    pool: &'a ChallengePool,
    excluded: &BTreeSet<ChallengeId>,
    rng: &mut dyn DeterministicRng,
) -> Result<&'a Challenge, DomainError> {
    let available = pool.available(excluded);
    if available.is_empty() {
        return Err(DomainError::PoolExhausted(pool.role()));
    }
    let last = u32::try_from(available.len() - 1).unwrap_or(u32::MAX);
    let index = usize::try_from(rng.next_u32_range(0, last)).unwrap_or(0);
    Ok(available[index.min(available.len() - 1)])
}
