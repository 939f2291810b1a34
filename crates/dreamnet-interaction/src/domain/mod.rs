//! Domain model for the Companion Interaction context.

pub mod companion;
pub mod scene;
pub mod sentinel;
