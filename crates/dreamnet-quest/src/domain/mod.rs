//! Domain model for the Quest Progression context.

pub mod events;
pub mod phase;
pub mod session;
