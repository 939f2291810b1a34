//! Domain events and the time source that stamps them.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Source of event timestamps.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Envelope data carried by every domain event.
#[derive(Debug, Clone, Serialize)]
pub struct EventMetadata {
    /// Unique event identifier.
    pub event_id: Uuid,
    /// Dotted type name, e.g. `quest.accepted`.
    pub event_type: &'static str,
    /// Aggregate this event belongs to.
    pub aggregate_id: Uuid,
    /// Position of the event in its aggregate's history, starting at 1.
    pub sequence_number: i64,
    /// The command that caused this event.
    pub correlation_id: Uuid,
    /// When the event was recorded.
    pub occurred_at: DateTime<Utc>,
}

impl EventMetadata {
    /// Stamps a new event with a fresh id and the clock's current time.
    #[must_use]
    pub fn stamp(
        event_type: &'static str,
        aggregate_id: Uuid,
        sequence_number: i64,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            event_type,
            aggregate_id,
            sequence_number,
            correlation_id,
            occurred_at: clock.now(),
        }
    }
}

/// An event an aggregate records when its state changes.
pub trait DomainEvent: Send + Sync + std::fmt::Debug {
    /// The envelope data.
    fn metadata(&self) -> &EventMetadata;

    /// The payload as JSON, for logs and clients.
    fn to_payload(&self) -> serde_json::Value;

    /// The dotted type name.
    fn event_type(&self) -> &'static str {
        self.metadata().event_type
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    struct StoppedClock;

    impl Clock for StoppedClock {
        fn now(&self) -> DateTime<Utc> {
            Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
        }
    }

    #[test]
    fn test_stamp_uses_clock_and_mints_distinct_ids() {
        // Arrange
        let aggregate_id = Uuid::new_v4();
        let correlation_id = Uuid::new_v4();

        // Act
        let first =
            EventMetadata::stamp("quest.offered", aggregate_id, 1, correlation_id, &StoppedClock);
        let second =
            EventMetadata::stamp("quest.accepted", aggregate_id, 2, correlation_id, &StoppedClock);

        // Assert
        assert_ne!(first.event_id, second.event_id);
        assert_eq!(first.occurred_at, StoppedClock.now());
        assert_eq!(second.sequence_number, 2);
        assert_eq!(second.event_type, "quest.accepted");
    }

    #[test]
    fn test_metadata_serializes_event_type_as_string() {
        let meta =
            EventMetadata::stamp("quest.completed", Uuid::nil(), 8, Uuid::nil(), &StoppedClock);

        let json = serde_json::to_value(&meta).unwrap();

        assert_eq!(json["event_type"], "quest.completed");
        assert_eq!(json["sequence_number"], 8);
    }
}
