//! Application services for the Companion Interaction context.

pub mod prompts;
pub mod router;
