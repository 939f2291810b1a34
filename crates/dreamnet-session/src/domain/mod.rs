//! Domain model for the Session Orchestration context.

pub mod commands;
