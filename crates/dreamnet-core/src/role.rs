//! Companion roles.
//!
//! Every challenge and every companion carries exactly one role tag. Roles
//! are compared by equality; no other part of the system infers a role from
//! an identifier string.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The two companion roles a party is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    /// The party's protector: strength and tactics.
    Warden,
    /// The party's interpreter of the arcane: intellect and lore.
    Scholar,
}

impl Role {
    /// Both roles, Warden first.
    pub const ALL: [Role; 2] = [Role::Warden, Role::Scholar];

    /// Returns the other role of the pair.
    #[must_use]
    pub fn counterpart(self) -> Self {
        match self {
            Role::Warden => Role::Scholar,
            Role::Scholar => Role::Warden,
        }
    }

    /// In-world title of a companion holding this role.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Role::Warden => "Protector of the Party",
            Role::Scholar => "Interpreter of the Arcane",
        }
    }

    /// The kind of aptitude a challenge of this role demands.
    #[must_use]
    pub fn required_skill(self) -> &'static str {
        match self {
            Role::Warden => "strength and tactical prowess",
            Role::Scholar => "intellect and arcane knowledge",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Warden => f.write_str("Warden"),
            Role::Scholar => f.write_str("Scholar"),
        }
    }
}
