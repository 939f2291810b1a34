//! Application services for the Quest Catalog context.

pub mod quest_composition;
