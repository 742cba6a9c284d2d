//! Aggregate root abstraction.

use uuid::Uuid;

use crate::event::DomainEvent;

/// Trait for aggregate roots that reconstitute from their event stream.
pub trait AggregateRoot: Send + Sync {
    /// The event type this aggregate produces and consumes.
    type Event: DomainEvent;

    /// Returns the aggregate identifier.
    fn aggregate_id(&self) -> Uuid;

    /// Returns the number of committed events applied so far.
    ///
    /// This is also the `expected_version` passed to
    /// [`EventRepository::append_events`](crate::repository::EventRepository::append_events).
    fn version(&self) -> i64;

    /// Folds one event into the in-memory state.
    fn apply(&mut self, event: &Self::Event);

    /// Events produced by the current command that are not yet persisted.
    fn uncommitted_events(&self) -> &[Self::Event];

    /// Drops uncommitted events after they have been appended.
    fn clear_uncommitted_events(&mut self);
}
