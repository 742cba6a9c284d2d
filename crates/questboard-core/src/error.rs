//! Domain error types.
//!
//! Every operation of the engine either commits all of its events or returns
//! one of these errors with the stored state untouched.

use thiserror::Error;
use uuid::Uuid;

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A referenced interaction, action, or participant does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Human-readable kind of the missing entity.
        entity: &'static str,
        /// The identifier that was looked up.
        id: Uuid,
    },

    /// Malformed or incomplete input. The caller is expected to re-prompt.
    #[error("validation error: {0}")]
    Validation(String),

    /// The operation is not legal in the entity's current state.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// A turn advance was attempted while actions still await GM review.
    #[error("turn blocked on interaction {interaction_id}: {pending} pending action(s)")]
    TurnBlocked {
        /// The interaction whose turn could not advance.
        interaction_id: Uuid,
        /// Number of actions still pending.
        pending: usize,
    },

    /// Optimistic concurrency conflict.
    #[error(
        "concurrency conflict on aggregate {aggregate_id}: expected version {expected}, found {actual}"
    )]
    ConcurrencyConflict {
        /// The aggregate that had the conflict.
        aggregate_id: Uuid,
        /// The expected version.
        expected: i64,
        /// The actual version found.
        actual: i64,
    },

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

impl DomainError {
    /// Shorthand for [`DomainError::NotFound`].
    #[must_use]
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }
}
