//! Notification types pushed to interaction observers.
//!
//! The wire form uses camelCase field names; `eventType`, `interactionId`
//! and `version` are stable and together identify a notification for
//! de-duplication.

use std::fmt;

use chrono::{DateTime, Utc};
use questboard_core::participant::ParticipantRef;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The three classes of change observers care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    /// The current turn pointer or round moved.
    TurnChanged,
    /// The number of pending actions changed.
    ActionQueueChanged,
    /// The interaction status transitioned.
    StatusChanged,
}

impl NotificationType {
    /// Returns the canonical snake_case name, also used as the SSE event name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TurnChanged => "turn_changed",
            Self::ActionQueueChanged => "action_queue_changed",
            Self::StatusChanged => "status_changed",
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type-specific notification body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NotificationPayload {
    /// Body of a [`NotificationType::TurnChanged`] notification.
    #[serde(rename_all = "camelCase")]
    TurnChanged {
        /// Index into the initiative order of the participant now acting.
        current_index: usize,
        /// The 1-based round counter.
        round: u32,
        /// The participant now acting.
        current_participant: Option<ParticipantRef>,
    },
    /// Body of a [`NotificationType::ActionQueueChanged`] notification.
    #[serde(rename_all = "camelCase")]
    ActionQueueChanged {
        /// Pending actions after the change.
        pending_count: usize,
        /// Pending actions before the change.
        previous_pending_count: usize,
    },
    /// Body of a [`NotificationType::StatusChanged`] notification.
    #[serde(rename_all = "camelCase")]
    StatusChanged {
        /// Status before the transition.
        from: String,
        /// Status after the transition.
        to: String,
    },
}

/// One change notification for one interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionNotification {
    /// Notification class.
    pub event_type: NotificationType,
    /// The interaction that changed.
    pub interaction_id: Uuid,
    /// Interaction version after the committing operation.
    pub version: i64,
    /// Class-specific body.
    pub payload: NotificationPayload,
    /// When the change was committed.
    pub emitted_at: DateTime<Utc>,
}

impl SessionNotification {
    /// Builds a `turn_changed` notification.
    #[must_use]
    pub fn turn_changed(
        interaction_id: Uuid,
        version: i64,
        current_index: usize,
        round: u32,
        current_participant: Option<ParticipantRef>,
        emitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            event_type: NotificationType::TurnChanged,
            interaction_id,
            version,
            payload: NotificationPayload::TurnChanged {
                current_index,
                round,
                current_participant,
            },
            emitted_at,
        }
    }

    /// Builds an `action_queue_changed` notification.
    #[must_use]
    pub fn action_queue_changed(
        interaction_id: Uuid,
        version: i64,
        pending_count: usize,
        previous_pending_count: usize,
        emitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            event_type: NotificationType::ActionQueueChanged,
            interaction_id,
            version,
            payload: NotificationPayload::ActionQueueChanged {
                pending_count,
                previous_pending_count,
            },
            emitted_at,
        }
    }

    /// Builds a `status_changed` notification.
    #[must_use]
    pub fn status_changed(
        interaction_id: Uuid,
        version: i64,
        from: impl Into<String>,
        to: impl Into<String>,
        emitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            event_type: NotificationType::StatusChanged,
            interaction_id,
            version,
            payload: NotificationPayload::StatusChanged {
                from: from.into(),
                to: to.into(),
            },
            emitted_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_wire_form_uses_stable_camel_case_keys() {
        let interaction_id = Uuid::new_v4();
        let at = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();
        let notification = SessionNotification::action_queue_changed(interaction_id, 4, 1, 0, at);

        let json = serde_json::to_value(&notification).unwrap();

        assert_eq!(json["eventType"], "action_queue_changed");
        assert_eq!(json["interactionId"], interaction_id.to_string());
        assert_eq!(json["version"], 4);
        assert_eq!(json["payload"]["pendingCount"], 1);
        assert_eq!(json["payload"]["previousPendingCount"], 0);
    }

    #[test]
    fn test_status_changed_payload_round_trips_from_json() {
        let at = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();
        let notification =
            SessionNotification::status_changed(Uuid::new_v4(), 2, "setup", "awaiting_actions", at);

        let json = serde_json::to_string(&notification).unwrap();
        let parsed: SessionNotification = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, notification);
    }
}
