//! Commands addressed to a player session.

use uuid::Uuid;

/// An instruction an orchestrator carries out against one session.
pub trait Command: Send + Sync + std::fmt::Debug {
    /// Dotted type name recorded on the command's tracing span.
    const COMMAND_TYPE: &'static str;

    /// Ties the command to the events it produces.
    fn correlation_id(&self) -> Uuid;

    /// Returns [`Command::COMMAND_TYPE`].
    fn command_type(&self) -> &'static str {
        Self::COMMAND_TYPE
    }
}
