//! Dreamnet: Companion Interaction bounded context.
//!
//! Routes player messages to a companion, decides whether that companion
//! may resolve the current scene and recovers the resolution signal from
//! the narrator's freeform reply. Nothing here mutates a quest session.

pub mod application;
pub mod domain;
