//! In-memory `EventRepository`.
//!
//! Used when the server starts without `DATABASE_URL` and by handler tests.
//! Honors the same optimistic concurrency contract as the Postgres adapter.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use uuid::Uuid;

use questboard_core::error::DomainError;
use questboard_core::repository::{EventRepository, StoredEvent};

/// Event streams kept in a process-local map.
#[derive(Debug, Default)]
pub struct InMemoryEventRepository {
    streams: Mutex<HashMap<Uuid, Vec<StoredEvent>>>,
}

impl InMemoryEventRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored events across all streams.
    pub fn event_count(&self) -> usize {
        self.streams
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(Vec::len)
            .sum()
    }
}

#[async_trait]
impl EventRepository for InMemoryEventRepository {
    async fn load_events(&self, aggregate_id: Uuid) -> Result<Vec<StoredEvent>, DomainError> {
        Ok(self
            .streams
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&aggregate_id)
            .cloned()
            .unwrap_or_default())
    }

    #[allow(clippy::cast_possible_wrap)]
    async fn append_events(
        &self,
        aggregate_id: Uuid,
        expected_version: i64,
        events: &[StoredEvent],
    ) -> Result<(), DomainError> {
        if events.is_empty() {
            return Ok(());
        }

        let mut streams = self.streams.lock().unwrap_or_else(PoisonError::into_inner);
        let stream = streams.entry(aggregate_id).or_default();
        let actual = stream.last().map_or(0, |e| e.sequence_number);
        if actual != expected_version {
            return Err(DomainError::ConcurrencyConflict {
                aggregate_id,
                expected: expected_version,
                actual,
            });
        }
        for (offset, event) in events.iter().enumerate() {
            if event.sequence_number != actual + offset as i64 + 1 {
                return Err(DomainError::ConcurrencyConflict {
                    aggregate_id,
                    expected: expected_version,
                    actual,
                });
            }
        }
        stream.extend_from_slice(events);
        Ok(())
    }

    async fn find_aggregate_by_payload(
        &self,
        event_type: &str,
        pointer: &str,
        value: &serde_json::Value,
    ) -> Result<Option<Uuid>, DomainError> {
        let streams = self.streams.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(streams
            .values()
            .flatten()
            .find(|e| e.event_type == event_type && e.payload.pointer(pointer) == Some(value))
            .map(|e| e.aggregate_id))
    }
}
