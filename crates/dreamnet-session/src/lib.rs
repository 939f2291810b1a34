//! Dreamnet: Session Orchestration bounded context.
//!
//! Owns one player's quest session and sequences the catalog, the state
//! machine and the interaction router against it.

pub mod application;
pub mod domain;
