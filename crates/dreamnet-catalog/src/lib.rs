//! Dreamnet: Quest Catalog bounded context.
//!
//! Holds the role-tagged challenge pools and assembles new quests from
//! them: one Warden challenge, one Scholar challenge, in a randomized
//! order, framed by the narrative service.

pub mod application;
pub mod domain;
