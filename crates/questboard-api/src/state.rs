//! Shared application state.

use std::sync::{Arc, Mutex};

use questboard_core::clock::Clock;
use questboard_core::participant::ParticipantDirectory;
use questboard_core::repository::EventRepository;
use questboard_core::rng::DeterministicRng;
use questboard_interaction::application::locks::InteractionLocks;
use questboard_notifier::NotificationHub;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Clock for timestamps.
    pub clock: Arc<dyn Clock + Send + Sync>,
    /// Random number generator for initiative rolls.
    pub rng: Arc<Mutex<dyn DeterministicRng + Send>>,
    /// Event repository for persistence.
    pub event_repository: Arc<dyn EventRepository>,
    /// Read-only campaign records.
    pub directory: Arc<dyn ParticipantDirectory>,
    /// Per-interaction operation locks.
    pub locks: Arc<InteractionLocks>,
    /// Fan-out of change notifications to SSE observers.
    pub notifications: Arc<NotificationHub>,
}

impl AppState {
    /// Create new application state with a fresh lock registry.
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock + Send + Sync>,
        rng: Arc<Mutex<dyn DeterministicRng + Send>>,
        event_repository: Arc<dyn EventRepository>,
        directory: Arc<dyn ParticipantDirectory>,
        notifications: Arc<NotificationHub>,
    ) -> Self {
        Self {
            clock,
            rng,
            event_repository,
            directory,
            locks: Arc::new(InteractionLocks::new()),
            notifications,
        }
    }
}
