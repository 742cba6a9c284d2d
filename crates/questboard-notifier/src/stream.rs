//! Subscriber side of the Session Notifier.

use std::collections::HashMap;
use std::sync::{PoisonError, Weak};

use futures::Stream;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::hub::Channels;
use crate::notification::{NotificationType, SessionNotification};

/// Drops notifications already delivered for the same
/// (interaction, type, version).
///
/// Versions only grow within one interaction, so remembering the highest
/// version seen per notification type is enough.
#[derive(Debug, Default, Clone)]
pub struct Deduplicator {
    last_seen: HashMap<(Uuid, NotificationType), i64>,
}

impl Deduplicator {
    /// Creates an empty deduplicator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` the first time a notification is seen, `false` for any
    /// duplicate or stale redelivery.
    pub fn accept(&mut self, notification: &SessionNotification) -> bool {
        let key = (notification.interaction_id, notification.event_type);
        match self.last_seen.get(&key) {
            Some(&seen) if seen >= notification.version => false,
            _ => {
                self.last_seen.insert(key, notification.version);
                true
            }
        }
    }
}

/// A de-duplicated stream of notifications for one interaction.
///
/// Dropping the last stream of an interaction removes its channel from the
/// hub.
#[derive(Debug)]
pub struct NotificationStream {
    interaction_id: Uuid,
    receiver: broadcast::Receiver<SessionNotification>,
    dedup: Deduplicator,
    channels: Weak<Channels>,
}

impl NotificationStream {
    pub(crate) fn new(
        interaction_id: Uuid,
        receiver: broadcast::Receiver<SessionNotification>,
        channels: Weak<Channels>,
    ) -> Self {
        Self {
            interaction_id,
            receiver,
            dedup: Deduplicator::new(),
            channels,
        }
    }

    /// The interaction this stream observes.
    #[must_use]
    pub fn interaction_id(&self) -> Uuid {
        self.interaction_id
    }

    /// Waits for the next notification not yet delivered on this stream.
    ///
    /// Returns `None` once the hub has been dropped.
    pub async fn next(&mut self) -> Option<SessionNotification> {
        loop {
            match self.receiver.recv().await {
                Ok(notification) => {
                    if self.dedup.accept(&notification) {
                        return Some(notification);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(
                        interaction_id = %self.interaction_id,
                        skipped,
                        "notification subscriber lagged"
                    );
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Adapts the subscription into a [`Stream`].
    pub fn into_stream(self) -> impl Stream<Item = SessionNotification> + Send {
        futures::stream::unfold(self, |mut stream| async move {
            stream.next().await.map(|notification| (notification, stream))
        })
    }
}

impl Drop for NotificationStream {
    fn drop(&mut self) {
        let Some(channels) = self.channels.upgrade() else {
            return;
        };
        let mut channels = channels.lock().unwrap_or_else(PoisonError::into_inner);
        // Our own receiver is still alive here.
        let last = channels
            .get(&self.interaction_id)
            .is_some_and(|sender| sender.receiver_count() <= 1);
        if last {
            channels.remove(&self.interaction_id);
            debug!(interaction_id = %self.interaction_id, "dropped channel with no subscribers");
        }
    }
}
