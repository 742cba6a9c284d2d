//! Test notifier — records published notifications.

use std::sync::Mutex;

use questboard_notifier::{SessionNotification, SessionNotifier};

/// A `SessionNotifier` that keeps every published notification in order.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    published: Mutex<Vec<SessionNotification>>,
}

impl RecordingNotifier {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of everything published so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn published(&self) -> Vec<SessionNotification> {
        self.published.lock().unwrap().clone()
    }

    /// Forgets everything published so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn clear(&self) {
        self.published.lock().unwrap().clear();
    }
}

impl SessionNotifier for RecordingNotifier {
    fn publish(&self, notification: SessionNotification) {
        self.published.lock().unwrap().push(notification);
    }
}
