//! Route modules.

pub mod health;
pub mod quest;
pub mod session;
