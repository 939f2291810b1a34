//! Event-sourced aggregate roots.

use uuid::Uuid;

use crate::event::DomainEvent;

/// An aggregate whose state only changes by applying its own events.
///
/// Command methods validate, record an event and apply it. The recorded
/// events stay buffered until the owner takes them for publication.
pub trait AggregateRoot: Send + Sync {
    /// The event type this aggregate produces and consumes.
    type Event: DomainEvent;

    /// Returns the aggregate identifier.
    fn aggregate_id(&self) -> Uuid;

    /// Number of events applied so far.
    fn version(&self) -> i64;

    /// Applies `event` to the in-memory state.
    fn apply(&mut self, event: &Self::Event);

    /// Events recorded since the last [`AggregateRoot::take_uncommitted_events`].
    fn uncommitted_events(&self) -> &[Self::Event];

    /// Drains the buffered events.
    fn take_uncommitted_events(&mut self) -> Vec<Self::Event>;

    /// Sequence number the next recorded event receives.
    fn next_sequence_number(&self) -> i64 {
        self.version() + 1
    }
}
