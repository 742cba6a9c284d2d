//! Derives Session Notifier traffic from a committed state change.

use chrono::{DateTime, Utc};
use questboard_core::participant::ParticipantRef;
use questboard_notifier::{SessionNotification, SessionNotifier};
use tracing::debug;

use crate::domain::aggregates::{Interaction, InteractionStatus};

/// The notifier-relevant slice of an interaction's state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TurnSnapshot {
    status: InteractionStatus,
    current_index: Option<usize>,
    round: u32,
    current_participant: Option<ParticipantRef>,
    pending: usize,
}

impl TurnSnapshot {
    pub(crate) fn capture(interaction: &Interaction) -> Self {
        Self {
            status: interaction.status(),
            current_index: interaction.current_index(),
            round: interaction.round(),
            current_participant: interaction
                .current_participant()
                .map(|entry| entry.participant()),
            pending: interaction.pending_count(),
        }
    }
}

/// Compares two snapshots around a commit and returns the notifications it
/// warrants, all stamped with the post-commit `version`.
///
/// `order_replaced` forces a `turn_changed` even when a reroll lands on the
/// same index and round.
pub(crate) fn derive(
    interaction: &Interaction,
    before: &TurnSnapshot,
    after: &TurnSnapshot,
    order_replaced: bool,
    emitted_at: DateTime<Utc>,
) -> Vec<SessionNotification> {
    let interaction_id = interaction.id;
    let version = interaction.version;
    let mut notifications = Vec::new();

    if let Some(current_index) = after.current_index {
        let moved = before.current_index != after.current_index || before.round != after.round;
        if moved || order_replaced {
            notifications.push(SessionNotification::turn_changed(
                interaction_id,
                version,
                current_index,
                after.round,
                after.current_participant,
                emitted_at,
            ));
        }
    }

    if before.pending != after.pending {
        notifications.push(SessionNotification::action_queue_changed(
            interaction_id,
            version,
            after.pending,
            before.pending,
            emitted_at,
        ));
    }

    if before.status != after.status {
        notifications.push(SessionNotification::status_changed(
            interaction_id,
            version,
            before.status.as_str(),
            after.status.as_str(),
            emitted_at,
        ));
    }

    notifications
}

/// Publishes everything [`derive`] returns.
pub(crate) fn publish_changes(
    notifier: &dyn SessionNotifier,
    interaction: &Interaction,
    before: &TurnSnapshot,
    order_replaced: bool,
    emitted_at: DateTime<Utc>,
) {
    let after = TurnSnapshot::capture(interaction);
    for notification in derive(interaction, before, &after, order_replaced, emitted_at) {
        debug!(
            interaction_id = %interaction.id,
            event_type = %notification.event_type,
            version = notification.version,
            "publishing notification"
        );
        notifier.publish(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use questboard_notifier::{NotificationPayload, NotificationType};
    use uuid::Uuid;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
    }

    fn snapshot(status: InteractionStatus, current_index: Option<usize>, round: u32, pending: usize) -> TurnSnapshot {
        TurnSnapshot {
            status,
            current_index,
            round,
            current_participant: None,
            pending,
        }
    }

    #[test]
    fn test_submission_emits_queue_and_status_changes() {
        let interaction = Interaction::new(Uuid::new_v4());
        let before = snapshot(InteractionStatus::AwaitingActions, Some(0), 1, 0);
        let after = snapshot(InteractionStatus::ActionsPending, Some(0), 1, 1);

        let notifications = derive(&interaction, &before, &after, false, at());

        let types: Vec<NotificationType> = notifications.iter().map(|n| n.event_type).collect();
        assert_eq!(
            types,
            vec![NotificationType::ActionQueueChanged, NotificationType::StatusChanged]
        );
        match &notifications[0].payload {
            NotificationPayload::ActionQueueChanged {
                pending_count,
                previous_pending_count,
            } => {
                assert_eq!(*pending_count, 1);
                assert_eq!(*previous_pending_count, 0);
            }
            other => panic!("unexpected payload {other:?}"),
        }
    }

    #[test]
    fn test_advance_emits_only_turn_change() {
        let interaction = Interaction::new(Uuid::new_v4());
        let before = snapshot(InteractionStatus::AwaitingActions, Some(2), 1, 0);
        let after = snapshot(InteractionStatus::AwaitingActions, Some(0), 2, 0);

        let notifications = derive(&interaction, &before, &after, false, at());

        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].event_type, NotificationType::TurnChanged);
    }

    #[test]
    fn test_reroll_to_same_pointer_still_emits_turn_change() {
        let interaction = Interaction::new(Uuid::new_v4());
        let state = snapshot(InteractionStatus::AwaitingActions, Some(0), 1, 0);

        let notifications = derive(&interaction, &state, &state, true, at());

        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].event_type, NotificationType::TurnChanged);
    }

    #[test]
    fn test_completion_emits_status_change_without_turn() {
        let interaction = Interaction::new(Uuid::new_v4());
        let before = snapshot(InteractionStatus::AwaitingActions, Some(1), 3, 0);
        let after = snapshot(InteractionStatus::Completed, None, 3, 0);

        let notifications = derive(&interaction, &before, &after, false, at());

        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].event_type, NotificationType::StatusChanged);
    }
}
