//! Dreamnet: Quest Progression bounded context.
//!
//! Models the lifecycle of a single quest: offer, travel, two gated
//! challenges, the final chamber and the artifact discussion.

pub mod application;
pub mod domain;
