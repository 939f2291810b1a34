//! Domain model for the Quest Catalog context.

pub mod catalog;
pub mod challenge;
pub mod pools;
pub mod quest;
