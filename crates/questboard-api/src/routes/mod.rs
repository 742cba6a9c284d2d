//! Route modules.

pub mod actions;
pub mod campaigns;
pub mod health;
pub mod interactions;
pub mod notifications;

use questboard_core::repository::StoredEvent;
use serde::Serialize;
use uuid::Uuid;

/// Response body returned after a command is successfully handled.
#[derive(Debug, Serialize)]
pub struct CommandResponse {
    /// The interaction the command touched.
    pub aggregate_id: Uuid,
    /// IDs of the domain events produced and persisted.
    pub event_ids: Vec<Uuid>,
}

impl CommandResponse {
    pub(crate) fn new(aggregate_id: Uuid, stored_events: &[StoredEvent]) -> Self {
        Self {
            aggregate_id,
            event_ids: stored_events.iter().map(|e| e.event_id).collect(),
        }
    }
}
