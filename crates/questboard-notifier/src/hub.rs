//! Per-interaction fan-out hub backed by `tokio::sync::broadcast`.
//!
//! [`NotificationHub`] keeps one broadcast channel per interaction id, so
//! observers of one table never see traffic from another. Channels are
//! created on first subscription and removed when their last subscriber
//! drops its stream.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::broadcast;
use tracing::{debug, trace};
use uuid::Uuid;

use crate::notification::SessionNotification;
use crate::stream::NotificationStream;

/// Default buffer capacity for each interaction's broadcast channel.
pub const DEFAULT_CAPACITY: usize = 256;

/// Publishing side of the Session Notifier.
pub trait SessionNotifier: Send + Sync {
    /// Publishes a notification to the observers of its interaction.
    ///
    /// Publishing never blocks and never fails the calling operation; a
    /// notification with no subscribers is dropped.
    fn publish(&self, notification: SessionNotification);
}

pub(crate) type Channels = Mutex<HashMap<Uuid, broadcast::Sender<SessionNotification>>>;

/// In-process notification hub, shared as `Arc<NotificationHub>`.
#[derive(Debug)]
pub struct NotificationHub {
    capacity: usize,
    channels: Arc<Channels>,
}

impl NotificationHub {
    /// Creates a hub whose per-interaction channels buffer `capacity`
    /// notifications.
    ///
    /// When a buffer is full the oldest notifications are dropped and slow
    /// subscribers skip ahead.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            channels: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Subscribes to the notifications of one interaction.
    pub fn subscribe(&self, interaction_id: Uuid) -> NotificationStream {
        let mut channels = self.channels.lock().unwrap_or_else(PoisonError::into_inner);
        let sender = channels
            .entry(interaction_id)
            .or_insert_with(|| broadcast::channel(self.capacity).0);
        debug!(%interaction_id, subscribers = sender.receiver_count() + 1, "subscribing to interaction");
        NotificationStream::new(interaction_id, sender.subscribe(), Arc::downgrade(&self.channels))
    }

    /// Returns the number of interactions with at least one live channel.
    pub fn channel_count(&self) -> usize {
        self.channels.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns the number of live subscriptions for an interaction.
    pub fn subscriber_count(&self, interaction_id: Uuid) -> usize {
        self.channels
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&interaction_id)
            .map_or(0, broadcast::Sender::receiver_count)
    }
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl SessionNotifier for NotificationHub {
    fn publish(&self, notification: SessionNotification) {
        let interaction_id = notification.interaction_id;
        let mut channels = self.channels.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(sender) = channels.get(&interaction_id) else {
            trace!(%interaction_id, event_type = %notification.event_type, "no subscribers");
            return;
        };

        match sender.send(notification) {
            Ok(delivered) => {
                trace!(%interaction_id, delivered, "notification published");
            }
            Err(_) => {
                // Every receiver is gone.
                channels.remove(&interaction_id);
                debug!(%interaction_id, "dropped channel with no subscribers");
            }
        }
    }
}
