//! Test repositories — mock `EventRepository` implementations for tests.

use std::sync::Mutex;

use async_trait::async_trait;
use questboard_core::error::DomainError;
use questboard_core::repository::{EventRepository, StoredEvent};
use uuid::Uuid;

/// An appended batch: aggregate id, expected version, events.
pub type AppendedBatch = (Uuid, i64, Vec<StoredEvent>);

/// An event repository that serves a canned stream and records every
/// `append_events` call without persisting it.
///
/// Every `load_events` call returns the canned stream regardless of the
/// aggregate id, and payload lookups search that same stream.
#[derive(Debug)]
pub struct RecordingEventRepository {
    load_result: Vec<StoredEvent>,
    appended: Mutex<Vec<AppendedBatch>>,
}

impl RecordingEventRepository {
    /// Create a new recording repository that will return `load_result` from
    /// every `load_events` call.
    ///
    /// # Panics
    ///
    /// Panics if `load_result` is an `Err`; use `FailingEventRepository` for
    /// error scenarios.
    #[must_use]
    pub fn new(load_result: Result<Vec<StoredEvent>, DomainError>) -> Self {
        Self {
            load_result: load_result.expect(
                "RecordingEventRepository::new does not accept Err; use FailingEventRepository",
            ),
            appended: Mutex::new(Vec::new()),
        }
    }

    /// Returns a snapshot of all batches that were appended.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn appended_events(&self) -> Vec<AppendedBatch> {
        self.appended.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventRepository for RecordingEventRepository {
    async fn load_events(&self, _aggregate_id: Uuid) -> Result<Vec<StoredEvent>, DomainError> {
        Ok(self.load_result.clone())
    }

    async fn append_events(
        &self,
        aggregate_id: Uuid,
        expected_version: i64,
        events: &[StoredEvent],
    ) -> Result<(), DomainError> {
        self.appended
            .lock()
            .unwrap()
            .push((aggregate_id, expected_version, events.to_vec()));
        Ok(())
    }

    async fn find_aggregate_by_payload(
        &self,
        event_type: &str,
        pointer: &str,
        value: &serde_json::Value,
    ) -> Result<Option<Uuid>, DomainError> {
        Ok(self
            .load_result
            .iter()
            .find(|e| e.event_type == event_type && e.payload.pointer(pointer) == Some(value))
            .map(|e| e.aggregate_id))
    }
}

/// An event repository that always returns an empty event list and silently
/// accepts appends. Useful for "interaction not found" scenarios.
#[derive(Debug)]
pub struct EmptyEventRepository;

#[async_trait]
impl EventRepository for EmptyEventRepository {
    async fn load_events(&self, _aggregate_id: Uuid) -> Result<Vec<StoredEvent>, DomainError> {
        Ok(vec![])
    }

    async fn append_events(
        &self,
        _aggregate_id: Uuid,
        _expected_version: i64,
        _events: &[StoredEvent],
    ) -> Result<(), DomainError> {
        Ok(())
    }

    async fn find_aggregate_by_payload(
        &self,
        _event_type: &str,
        _pointer: &str,
        _value: &serde_json::Value,
    ) -> Result<Option<Uuid>, DomainError> {
        Ok(None)
    }
}

/// An event repository that always returns an infrastructure error. Useful for
/// testing error-handling paths.
#[derive(Debug)]
pub struct FailingEventRepository;

#[async_trait]
impl EventRepository for FailingEventRepository {
    async fn load_events(&self, _aggregate_id: Uuid) -> Result<Vec<StoredEvent>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn append_events(
        &self,
        _aggregate_id: Uuid,
        _expected_version: i64,
        _events: &[StoredEvent],
    ) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn find_aggregate_by_payload(
        &self,
        _event_type: &str,
        _pointer: &str,
        _value: &serde_json::Value,
    ) -> Result<Option<Uuid>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }
}
