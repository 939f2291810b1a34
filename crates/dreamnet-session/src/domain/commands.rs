//! Commands accepted by the quest orchestrator.

use dreamnet_core::command::Command;
use dreamnet_core::role::Role;
use uuid::Uuid;

/// Command to assemble and offer a new quest.
#[derive(Debug, Clone)]
pub struct RequestNewQuest {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
}

impl Command for RequestNewQuest {
    const COMMAND_TYPE: &'static str = "session.request_new_quest";

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to accept the offered quest.
#[derive(Debug, Clone)]
pub struct AcceptQuest {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
}

impl Command for AcceptQuest {
    const COMMAND_TYPE: &'static str = "session.accept_quest";

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to travel to the next location.
#[derive(Debug, Clone)]
pub struct AdvanceTravel {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
}

impl Command for AdvanceTravel {
    const COMMAND_TYPE: &'static str = "session.advance_travel";

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to speak to one of the companions.
#[derive(Debug, Clone)]
pub struct SendMessage {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The companion addressed.
    pub role: Role,
    /// What the player says.
    pub text: String,
}

impl Command for SendMessage {
    const COMMAND_TYPE: &'static str = "session.send_message";

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
