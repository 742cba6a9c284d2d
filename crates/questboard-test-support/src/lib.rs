//! Shared test mocks and utilities for the Questboard engine.

mod clock;
mod notifier;
mod repository;
mod rng;

pub use clock::FixedClock;
pub use notifier::RecordingNotifier;
pub use questboard_storage::{InMemoryEventRepository, InMemoryParticipantDirectory};
pub use repository::{EmptyEventRepository, FailingEventRepository, RecordingEventRepository};
pub use rng::{MockRng, SequenceRng};
