//! Per-interaction lock registry.
//!
//! Every mutating handler holds the lock of its interaction from the moment
//! it loads the event stream until its notifications are published. Locks of
//! different interactions never contend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

/// Idle entries are swept once the registry grows past this size.
const PRUNE_THRESHOLD: usize = 1024;

/// Hands out one async mutex per interaction id.
#[derive(Debug, Default)]
pub struct InteractionLocks {
    locks: Mutex<HashMap<Uuid, Arc<AsyncMutex<()>>>>,
}

/// Exclusive access to one interaction. Released on drop.
#[derive(Debug)]
pub struct InteractionGuard {
    interaction_id: Uuid,
    _guard: OwnedMutexGuard<()>,
}

impl InteractionGuard {
    /// The interaction this guard protects.
    #[must_use]
    pub fn interaction_id(&self) -> Uuid {
        self.interaction_id
    }
}

impl InteractionLocks {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `interaction_id`.
    pub async fn acquire(&self, interaction_id: Uuid) -> InteractionGuard {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            if locks.len() > PRUNE_THRESHOLD {
                // Only the map holds an idle lock.
                locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            }
            Arc::clone(locks.entry(interaction_id).or_default())
        };
        InteractionGuard {
            interaction_id,
            _guard: lock.lock_owned().await,
        }
    }

    /// Number of interactions with a registered lock.
    #[must_use]
    pub fn len(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no lock is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
