//! Application services for the Quest Progression context.

pub mod narration;
