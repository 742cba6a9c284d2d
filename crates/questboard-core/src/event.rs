//! Domain event abstractions.
//!
//! Every change to an interaction is recorded as an event carrying
//! [`EventMetadata`]. The metadata mirrors the columns of a
//! [`StoredEvent`]; the event body travels as the JSON payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::repository::StoredEvent;

/// Metadata attached to every domain event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetadata {
    /// Unique event identifier.
    pub event_id: Uuid,
    /// Type name for deserialization routing.
    pub event_type: String,
    /// Interaction stream this event belongs to.
    pub aggregate_id: Uuid,
    /// 1-based position in the stream; equals the interaction version after
    /// the event is applied.
    pub sequence_number: i64,
    /// Correlation ID of the command that produced the event.
    pub correlation_id: Uuid,
    /// What caused the event. Commands cause their own events, so this is
    /// the correlation ID unless an event triggers another.
    pub causation_id: Uuid,
    /// Timestamp of event creation.
    pub occurred_at: DateTime<Utc>,
}

impl EventMetadata {
    /// Metadata for a fresh event produced directly by a command.
    #[must_use]
    pub fn new(
        aggregate_id: Uuid,
        event_type: &str,
        sequence_number: i64,
        correlation_id: Uuid,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            event_type: event_type.to_owned(),
            aggregate_id,
            sequence_number,
            correlation_id,
            causation_id: correlation_id,
            occurred_at,
        }
    }
}

impl From<&StoredEvent> for EventMetadata {
    fn from(stored: &StoredEvent) -> Self {
        Self {
            event_id: stored.event_id,
            event_type: stored.event_type.clone(),
            aggregate_id: stored.aggregate_id,
            sequence_number: stored.sequence_number,
            correlation_id: stored.correlation_id,
            causation_id: stored.causation_id,
            occurred_at: stored.occurred_at,
        }
    }
}

/// Trait that all domain events implement.
pub trait DomainEvent: Send + Sync + std::fmt::Debug {
    /// Returns the event type name (used for serialization routing).
    fn event_type(&self) -> &'static str;

    /// Serializes the event payload to JSON.
    fn to_payload(&self) -> serde_json::Value;

    /// Returns the metadata for this event.
    fn metadata(&self) -> &EventMetadata;
}
