//! Application services for the Session Orchestration context.

pub mod orchestrator;
