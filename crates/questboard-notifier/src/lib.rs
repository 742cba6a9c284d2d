//! Questboard — Session Notifier.
//!
//! Fans out turn, queue and status changes of live interactions to every
//! subscribed client. Each mutating engine operation publishes explicitly
//! after its commit; subscribers receive a de-duplicated, per-interaction
//! stream.

pub mod hub;
pub mod notification;
pub mod stream;

pub use hub::{NotificationHub, SessionNotifier};
pub use notification::{NotificationPayload, NotificationType, SessionNotification};
pub use stream::{Deduplicator, NotificationStream};
